//! Render layer masks.

use serde::{Deserialize, Serialize};

/// Number of distinct render layers a mask can address.
pub const MAX_LAYERS: u32 = 32;

/// A bit mask selecting which render layers a camera may see.
///
/// Bit `i` set means layer `i` is visible. The default mask sees everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Mask that sees every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// Mask that sees nothing.
    pub const NONE: Self = Self(0);

    /// Creates a mask containing a single layer.
    ///
    /// Layers outside `0..MAX_LAYERS` produce an empty mask.
    #[must_use]
    pub fn from_layer(layer: u32) -> Self {
        if layer < MAX_LAYERS {
            Self(1 << layer)
        } else {
            Self::NONE
        }
    }

    /// Returns the raw bit value.
    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns whether the given layer is visible through this mask.
    #[must_use]
    pub fn contains(self, layer: u32) -> bool {
        layer < MAX_LAYERS && self.0 & (1 << layer) != 0
    }

    /// Returns a copy with the given layer added.
    #[must_use]
    pub fn with_layer(self, layer: u32) -> Self {
        Self(self.0 | Self::from_layer(layer).0)
    }

    /// Returns a copy with the given layer removed.
    #[must_use]
    pub fn without_layer(self, layer: u32) -> Self {
        Self(self.0 & !Self::from_layer(layer).0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sees_everything() {
        let mask = LayerMask::default();
        assert!(mask.contains(0));
        assert!(mask.contains(31));
        assert!(!mask.contains(32));
    }

    #[test]
    fn test_with_and_without_layer() {
        let mask = LayerMask::NONE.with_layer(3).with_layer(5);
        assert!(mask.contains(3));
        assert!(mask.contains(5));
        assert!(!mask.contains(4));

        let mask = mask.without_layer(3);
        assert!(!mask.contains(3));
        assert_eq!(mask.bits(), 1 << 5);
    }

    #[test]
    fn test_out_of_range_layer_is_ignored() {
        assert_eq!(LayerMask::from_layer(40), LayerMask::NONE);
        assert_eq!(LayerMask::ALL.without_layer(40), LayerMask::ALL);
    }
}
