use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Qualitative 20-entry palette (tab20 ordering).
const TAB20: [u32; 20] = [
    0x1f77b4, 0xaec7e8, 0xff7f0e, 0xffbb78, 0x2ca02c, 0x98df8a, 0xd62728, 0xff9896, 0x9467bd,
    0xc5b0d5, 0x8c564b, 0xc49c94, 0xe377c2, 0xf7b6d2, 0x7f7f7f, 0xc7c7c7, 0xbcbd22, 0xdbdb8d,
    0x17becf, 0x9edae5,
];

/// Index into a [`Palette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(usize);

impl ColorToken {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Fixed, ordered set of series colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> ChartResult<Self> {
        if colors.is_empty() {
            return Err(ChartError::InvalidData(
                "palette must contain at least one color".to_owned(),
            ));
        }
        for color in &colors {
            color.validate()?;
        }
        Ok(Self { colors })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn color(&self, token: ColorToken) -> Option<Color> {
        self.colors.get(token.index()).copied()
    }

    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: TAB20.iter().map(|&packed| Color::from_rgb_hex(packed)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_has_twenty_distinct_entries() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 20);
        let mut hexes: Vec<String> = palette.colors().iter().map(|c| c.to_hex()).collect();
        assert_eq!(hexes[0], "#1f77b4");
        hexes.sort();
        hexes.dedup();
        assert_eq!(hexes.len(), 20);
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(Palette::new(Vec::new()).is_err());
    }
}
