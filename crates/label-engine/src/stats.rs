use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Per-category face counts for one label vector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryStatistics {
    pub counts: Vec<usize>,
    pub total_faces: usize,
}

impl CategoryStatistics {
    /// All-zero statistics for a taxonomy of `size` categories.
    pub fn zeroed(size: usize) -> Self {
        Self {
            counts: vec![0; size],
            total_faces: 0,
        }
    }

    /// Count labels in one pass. Fails on the first label outside `0..size`.
    pub fn compute(labels: &[usize], size: usize) -> Result<Self, EngineError> {
        let mut counts = vec![0; size];
        for &label in labels {
            let slot = counts
                .get_mut(label)
                .ok_or(EngineError::OutOfRangeLabel { label, size })?;
            *slot += 1;
        }
        Ok(Self {
            counts,
            total_faces: labels.len(),
        })
    }

    /// Share of faces per category in percent. All zero when there are no faces.
    pub fn percentages(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|&c| percent(c, self.total_faces))
            .collect()
    }

    /// `name: count (xx.x%)` for every category with at least one face.
    pub fn summary_lines(&self, names: &[String]) -> Vec<String> {
        self.counts
            .iter()
            .zip(names)
            .filter(|(&count, _)| count > 0)
            .map(|(&count, name)| {
                format!("{}: {} ({:.1}%)", name, count, percent(count, self.total_faces))
            })
            .collect()
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn counts_and_percentages() {
        let stats = CategoryStatistics::compute(&[0, 0, 1, 1, 1], 2).unwrap();
        assert_eq!(stats.counts, vec![2, 3]);
        assert_eq!(stats.total_faces, 5);
        let pct = stats.percentages();
        assert_relative_eq!(pct[0], 40.0);
        assert_relative_eq!(pct[1], 60.0);
    }

    #[test]
    fn out_of_range_label_is_reported() {
        let err = CategoryStatistics::compute(&[0, 3], 2).unwrap_err();
        assert!(matches!(err, EngineError::OutOfRangeLabel { label: 3, size: 2 }));
    }

    #[test]
    fn summary_skips_empty_categories() {
        let stats = CategoryStatistics::compute(&[0, 2, 2], 3).unwrap();
        let names: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(stats.summary_lines(&names), vec!["a: 1 (33.3%)", "c: 2 (66.7%)"]);
    }

    #[test]
    fn empty_labels_have_zero_percentages() {
        let stats = CategoryStatistics::zeroed(3);
        assert_eq!(stats.percentages(), vec![0.0; 3]);
        assert!(stats.summary_lines(&[]).is_empty());
    }
}
