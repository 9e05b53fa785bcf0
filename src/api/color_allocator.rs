use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::render::{Color, ColorToken, Palette};

/// Assigns palette colors to series keys and keeps them stable across
/// selection changes.
///
/// Colors are best effort: once every palette slot is taken the next new key
/// triggers a full reset, after which two keys may end up sharing a color.
#[derive(Debug, Clone)]
pub struct ColorAllocator {
    palette: Palette,
    assignments: IndexMap<String, ColorToken>,
    in_use: Vec<bool>,
    resets: u64,
}

impl ColorAllocator {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        let in_use = vec![false; palette.len()];
        Self {
            palette,
            assignments: IndexMap::new(),
            in_use,
            resets: 0,
        }
    }

    /// Returns the color of `key`, allocating the first free slot if needed.
    pub fn color_for(&mut self, key: &str) -> ColorToken {
        if let Some(token) = self.assignments.get(key) {
            return *token;
        }

        if self.in_use.iter().all(|used| *used) {
            self.reset();
            self.resets = self.resets.saturating_add(1);
            debug!(
                palette_len = self.palette.len(),
                resets = self.resets,
                "color palette exhausted, assignments reset"
            );
        }

        // The palette is non-empty and a reset leaves every slot free.
        let index = self.in_use.iter().position(|used| !*used).unwrap_or(0);
        self.in_use[index] = true;
        let token = ColorToken::new(index);
        self.assignments.insert(key.to_owned(), token);
        trace!(key, index, "assigned series color");
        token
    }

    /// Forgets `key` and frees its palette slot. Unknown keys are ignored.
    pub fn release(&mut self, key: &str) {
        if let Some(token) = self.assignments.shift_remove(key) {
            if let Some(slot) = self.in_use.get_mut(token.index()) {
                *slot = false;
            }
            trace!(key, index = token.index(), "released series color");
        }
    }

    /// Drops every assignment and frees all slots.
    pub fn reset(&mut self) {
        self.assignments.clear();
        self.in_use.iter_mut().for_each(|used| *used = false);
    }

    #[must_use]
    pub fn assigned(&self, key: &str) -> Option<ColorToken> {
        self.assignments.get(key).copied()
    }

    /// Resolves a token against this allocator's palette.
    #[must_use]
    pub fn resolve(&self, token: ColorToken) -> Option<Color> {
        self.palette.color(token)
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Number of keys currently holding a color.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// How many times palette exhaustion forced a full reset.
    #[must_use]
    pub fn reset_count(&self) -> u64 {
        self.resets
    }
}

impl Default for ColorAllocator {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}
