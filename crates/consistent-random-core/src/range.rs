//! Mapping a unit value onto a bounded range.

use std::ops::Bound;

use crate::error::ConsistentRandomError;

/// A numeric type a unit value in `[0, 1)` can be mapped onto.
///
/// Integer ranges are widened by one when the end is inclusive, so `2..=4`
/// and `2..5` produce the same values. Float ranges map linearly and never
/// widen. An unbounded endpoint fails with `InvalidRange`.
pub trait RangeValue: Copy {
    /// Maps `unit` into the range described by `start` and `end`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if either endpoint is unbounded.
    fn map_unit(unit: f64, start: Bound<&Self>, end: Bound<&Self>)
    -> Result<Self, ConsistentRandomError>;
}

macro_rules! integer_range_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RangeValue for $ty {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_possible_wrap,
                    clippy::cast_precision_loss,
                    clippy::cast_sign_loss,
                    clippy::cast_lossless
                )]
                fn map_unit(
                    unit: f64,
                    start: Bound<&Self>,
                    end: Bound<&Self>,
                ) -> Result<Self, ConsistentRandomError> {
                    let min = match start {
                        Bound::Included(&v) => v as i128,
                        Bound::Excluded(&v) => v as i128 + 1,
                        Bound::Unbounded => return Err(ConsistentRandomError::InvalidRange),
                    };
                    let max = match end {
                        Bound::Included(&v) => v as i128 + 1,
                        Bound::Excluded(&v) => v as i128,
                        Bound::Unbounded => return Err(ConsistentRandomError::InvalidRange),
                    };
                    let span = max - min;
                    if span <= 0 {
                        return Ok(min as Self);
                    }
                    // Rounding can push the offset up to `span`; keep it exclusive.
                    let offset = ((unit * span as f64).floor() as i128).clamp(0, span - 1);
                    Ok((min + offset) as Self)
                }
            }
        )*
    };
}

integer_range_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_range_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RangeValue for $ty {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_lossless,
                    clippy::unnecessary_cast
                )]
                fn map_unit(
                    unit: f64,
                    start: Bound<&Self>,
                    end: Bound<&Self>,
                ) -> Result<Self, ConsistentRandomError> {
                    let min = match start {
                        Bound::Included(&v) | Bound::Excluded(&v) => v as f64,
                        Bound::Unbounded => return Err(ConsistentRandomError::InvalidRange),
                    };
                    let max = match end {
                        Bound::Included(&v) | Bound::Excluded(&v) => v as f64,
                        Bound::Unbounded => return Err(ConsistentRandomError::InvalidRange),
                    };
                    Ok((unit * (max - min) + min) as Self)
                }
            }
        )*
    };
}

float_range_value!(f32, f64);
