//! Remaining-duration value type

use serde::{Deserialize, Serialize};

use super::TimeParts;

/// Whole seconds left on a countdown.
///
/// The count is never negative: external inputs clamp to zero on the way
/// in, and every mutation saturates at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemainingSeconds(u64);

impl RemainingSeconds {
    pub const ZERO: Self = Self(0);

    /// Build from an untrusted signed input, clamping negatives to zero.
    pub fn clamped(seconds: i64) -> Self {
        Self(seconds.max(0) as u64)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// One tick worth of countdown.
    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Deduct a wall-clock gap measured in (possibly fractional) seconds.
    ///
    /// Only whole elapsed seconds are charged, so a sub-second
    /// background/active blip deducts nothing. Negative gaps (clock skew)
    /// deduct nothing either.
    pub fn deduct_elapsed(self, elapsed_seconds: f64) -> Self {
        let whole = elapsed_seconds.max(0.0).floor() as u64;
        Self(self.0.saturating_sub(whole))
    }

    pub fn time_parts(self) -> TimeParts {
        TimeParts::from_seconds(self.0)
    }
}

impl From<u64> for RemainingSeconds {
    fn from(seconds: u64) -> Self {
        Self(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_input_clamps_to_zero() {
        assert_eq!(RemainingSeconds::clamped(-5), RemainingSeconds::ZERO);
        assert_eq!(RemainingSeconds::clamped(0), RemainingSeconds::ZERO);
        assert_eq!(RemainingSeconds::clamped(90).get(), 90);
    }

    #[test]
    fn decrement_saturates_at_zero() {
        assert_eq!(RemainingSeconds::from(2).decrement().get(), 1);
        assert_eq!(RemainingSeconds::ZERO.decrement(), RemainingSeconds::ZERO);
    }

    #[test]
    fn deduct_charges_whole_seconds_only() {
        let remaining = RemainingSeconds::from(100);
        assert_eq!(remaining.deduct_elapsed(37.4).get(), 63);
        assert_eq!(remaining.deduct_elapsed(0.9).get(), 100);
        assert_eq!(remaining.deduct_elapsed(100.0), RemainingSeconds::ZERO);
        assert_eq!(remaining.deduct_elapsed(500.0), RemainingSeconds::ZERO);
    }

    #[test]
    fn deduct_ignores_negative_gaps() {
        let remaining = RemainingSeconds::from(10);
        assert_eq!(remaining.deduct_elapsed(-3.0).get(), 10);
    }
}
