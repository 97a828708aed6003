use fixed::types::I32F32;
use std::fmt;

/// CSS pixel length stored as fixed point so emitted values stay stable
/// across platforms (`40.5px`, never `40.500001px`). Rendered to at most
/// three decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Px(I32F32);

impl Px {
    pub const ZERO: Px = Px(I32F32::ZERO);

    /// Non-finite or out-of-range input collapses to zero.
    pub fn from_f32(value: f32) -> Px {
        if !value.is_finite() {
            return Px::ZERO;
        }
        I32F32::checked_from_num(value).map_or(Px::ZERO, Px)
    }

    pub fn from_i32(value: i32) -> Px {
        Px(I32F32::from_num(value))
    }

    pub fn is_negative(self) -> bool {
        self.0.is_negative()
    }

    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let milli: i64 = self.0.saturating_mul_int(1000).saturating_round().to_num();
        let sign = if milli < 0 { "-" } else { "" };
        let abs = milli.unsigned_abs();
        let (whole, frac) = (abs / 1000, abs % 1000);
        if frac == 0 {
            return write!(f, "{sign}{whole}px");
        }
        let digits = format!("{frac:03}");
        write!(f, "{sign}{whole}.{}px", digits.trim_end_matches('0'))
    }
}
