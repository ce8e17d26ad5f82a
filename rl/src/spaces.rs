//! Observation- and action-space shapes.
//!
//! Minimal gym-style space descriptions, enough for an external RL loop
//! to size its networks. No sampling or clipping logic lives here.

/// An unbounded (or bounded) box of f32 features.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSpace {
    /// Lower bound for every feature.
    pub low: f32,
    /// Upper bound for every feature.
    pub high: f32,
    /// Feature dimensions.
    pub shape: Vec<usize>,
}

impl BoxSpace {
    /// Unbounded 1-D vector space of `len` features.
    pub fn vector(len: usize) -> Self {
        Self {
            low: f32::NEG_INFINITY,
            high: f32::INFINITY,
            shape: vec![len],
        }
    }

    /// Bounded 1-D vector space of `len` features in `[low, high]`.
    pub fn bounded_vector(len: usize, low: f32, high: f32) -> Self {
        Self {
            low,
            high,
            shape: vec![len],
        }
    }

    /// Total number of features.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether the space has no features.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
