use serde::{Deserialize, Serialize};

/// Display color of a category, one byte per channel.
///
/// Serialized as a bare `[r, g, b]` array so mapping files and history
/// snapshots stay readable by other tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Build a color from untrusted channel values, clamping each to [0, 255].
    ///
    /// Returns `None` unless exactly three channels are given.
    pub fn from_channels(channels: &[i64]) -> Option<Self> {
        match channels {
            [r, g, b] => Some(Self([clamp_channel(*r), clamp_channel(*g), clamp_channel(*b)])),
            _ => None,
        }
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }
}

fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

/// Seed palette used whenever a category has no explicit color.
pub const DEFAULT_PALETTE: [Rgb; 16] = [
    Rgb::new(78, 101, 148),
    Rgb::new(191, 87, 0),
    Rgb::new(169, 169, 169),
    Rgb::new(218, 165, 32),
    Rgb::new(112, 128, 105),
    Rgb::new(61, 158, 211),
    Rgb::new(150, 0, 24),
    Rgb::new(200, 160, 100),
    Rgb::new(70, 70, 80),
    Rgb::new(0, 180, 180),
    Rgb::new(180, 100, 60),
    Rgb::new(100, 120, 140),
    Rgb::new(255, 126, 0),
    Rgb::new(83, 107, 83),
    Rgb::new(150, 150, 200),
    Rgb::new(194, 178, 128),
];

/// Palette color for a category index, cycling past the end of the palette.
pub fn palette_color(index: usize) -> Rgb {
    DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()]
}

/// Name given to a category created without one.
pub fn default_category_name(index: usize) -> String {
    format!("Category {}", index + 1)
}

/// Name substituted for a blank name during reconfiguration.
pub const UNNAMED_CATEGORY: &str = "Unnamed category";

/// One class in the label taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// User-visible category name.
    pub name: String,
    /// Display color.
    pub color: Rgb,
}

impl Category {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }

    /// The default category for position `index`: numbered name, palette color.
    pub fn placeholder(index: usize) -> Self {
        Self::new(default_category_name(index), palette_color(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles_past_sixteen() {
        assert_eq!(palette_color(0), palette_color(16));
        assert_eq!(palette_color(5), palette_color(37));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn channels_are_clamped() {
        let c = Rgb::from_channels(&[-20, 128, 900]).unwrap();
        assert_eq!(c, Rgb::new(0, 128, 255));
        assert!(Rgb::from_channels(&[1, 2]).is_none());
        assert!(Rgb::from_channels(&[1, 2, 3, 4]).is_none());
    }

    #[test]
    fn rgb_serializes_as_bare_array() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(json, "[1,2,3]");
    }
}
