use seg_types::{palette_color, Category, Rgb, UNNAMED_CATEGORY};
use serde::{Deserialize, Serialize};

/// Ordered list of categories. Never empty.
///
/// Replaced wholesale on reconfiguration; there is no in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTaxonomy {
    categories: Vec<Category>,
}

/// Names and colors of a taxonomy as parallel arrays.
///
/// This is the form stored in history records and mapping files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyInfo {
    pub names: Vec<String>,
    pub colors: Vec<Rgb>,
}

impl LabelTaxonomy {
    /// Number of categories in a fresh session.
    pub const DEFAULT_SIZE: usize = 2;

    /// Two placeholder categories with the first two palette colors.
    pub fn load_default() -> Self {
        Self::placeholders(Self::DEFAULT_SIZE)
    }

    /// `count` placeholder categories, at least one.
    pub fn placeholders(count: usize) -> Self {
        Self {
            categories: (0..count.max(1)).map(Category::placeholder).collect(),
        }
    }

    /// Wrap a category list; an empty list becomes a single placeholder.
    pub fn from_categories(categories: Vec<Category>) -> Self {
        if categories.is_empty() {
            return Self::placeholders(1);
        }
        Self { categories }
    }

    /// Normalize operator-supplied names and colors into a taxonomy.
    ///
    /// Blank names become [`UNNAMED_CATEGORY`]. A color that is missing or does
    /// not have exactly three channels takes the palette color of its row.
    /// Channels are clamped to [0, 255]. Colors past the last name are dropped.
    pub fn normalized(names: &[String], colors: &[Vec<i64>]) -> Self {
        let categories = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let name = match name.trim() {
                    "" => UNNAMED_CATEGORY.to_string(),
                    trimmed => trimmed.to_string(),
                };
                let color = colors
                    .get(i)
                    .and_then(|c| Rgb::from_channels(c))
                    .unwrap_or_else(|| palette_color(i));
                Category::new(name, color)
            })
            .collect();
        Self::from_categories(categories)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    pub fn colors(&self) -> Vec<Rgb> {
        self.categories.iter().map(|c| c.color).collect()
    }

    pub fn info(&self) -> TaxonomyInfo {
        TaxonomyInfo {
            names: self.names(),
            colors: self.colors(),
        }
    }

    /// Clamp a raw label into `[0, len - 1]`.
    pub fn clamp_label(&self, raw: i64) -> usize {
        let max = self.len() - 1;
        if raw <= 0 {
            0
        } else {
            (raw as u64).min(max as u64) as usize
        }
    }

    /// Clamp every raw label into range.
    pub fn clamp_labels(&self, raw: &[i64]) -> Vec<usize> {
        raw.iter().map(|&l| self.clamp_label(l)).collect()
    }

    /// Clamp already-accepted labels after a resize.
    pub fn reclamp(&self, labels: &mut [usize]) {
        let max = self.len() - 1;
        for label in labels {
            *label = (*label).min(max);
        }
    }
}

impl Default for LabelTaxonomy {
    fn default() -> Self {
        Self::load_default()
    }
}

impl From<TaxonomyInfo> for LabelTaxonomy {
    /// Pairs names with colors; missing colors come from the palette.
    fn from(info: TaxonomyInfo) -> Self {
        let categories = info
            .names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let color = info.colors.get(i).copied().unwrap_or_else(|| palette_color(i));
                Category::new(name, color)
            })
            .collect();
        Self::from_categories(categories)
    }
}
