//! Core data types shared by every bin store.
//!
//! The aliases mirror the widths used by the persisted format: row indices are
//! 32-bit signed integers, gradients are single precision and histogram slots
//! accumulate in double precision.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use std::fmt;

/// Data indexing type, equivalent to `data_size_t` in LightGBM.
/// 32-bit integer supporting up to 2 billion rows.
pub type DataSize = i32;

/// Gradient and hessian value type, equivalent to `score_t` in LightGBM.
pub type Score = f32;

/// Histogram accumulation type, equivalent to `hist_t` in LightGBM.
/// 64-bit float providing numerical stability for histogram sums.
pub type Hist = f64;

// The persisted layout stores row counts and offsets with this exact width.
const_assert_eq!(std::mem::size_of::<DataSize>(), 4);
const_assert_eq!(std::mem::size_of::<Hist>(), 8);

/// Policy for routing absent, NaN or zero-valued features at split time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissingType {
    /// The feature has no missing values
    None,
    /// Missing values are represented by the zero (default) bin
    Zero,
    /// Missing values are represented by the reserved last bin of the window
    NaN,
}

impl Default for MissingType {
    fn default() -> Self {
        MissingType::None
    }
}

impl fmt::Display for MissingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingType::None => write!(f, "none"),
            MissingType::Zero => write!(f, "zero"),
            MissingType::NaN => write!(f, "nan"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_type_display() {
        assert_eq!(MissingType::None.to_string(), "none");
        assert_eq!(MissingType::Zero.to_string(), "zero");
        assert_eq!(MissingType::NaN.to_string(), "nan");
        assert_eq!(MissingType::default(), MissingType::None);
    }

    #[test]
    fn test_missing_type_serde() {
        let json = serde_json::to_string(&MissingType::NaN).unwrap();
        let back: MissingType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MissingType::NaN);
    }
}
