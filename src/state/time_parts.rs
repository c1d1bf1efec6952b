//! Display decomposition of a remaining duration

use std::fmt;

use serde::{Deserialize, Serialize};

/// A remaining duration broken into days/hours/minutes/seconds.
///
/// Derived on demand from a seconds count; never stored alongside it.
/// Seconds and minutes are modulo 60, hours modulo 24, days unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeParts {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeParts {
    pub fn from_seconds(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        }
    }

    /// Recompose the total seconds count this decomposition came from.
    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }

    /// Compact humanized form, e.g. `1d2h30m5s`, used for uptime reporting.
    pub fn humanize(&self) -> String {
        use std::fmt::Write;

        if self.total_seconds() == 0 {
            return "0s".to_string();
        }

        let mut acc = String::new();
        for (value, unit) in [
            (self.days, "d"),
            (self.hours, "h"),
            (self.minutes, "m"),
            (self.seconds, "s"),
        ] {
            if value > 0 {
                write!(acc, "{}{}", value, unit).expect("writing to a String cannot fail");
            }
        }
        acc
    }
}

/// Zero-padded `DD:HH:MM:SS` rendering; days grow past two digits.
impl fmt::Display for TimeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_with_natural_periods() {
        let parts = TimeParts::from_seconds(90_061);
        assert_eq!(parts.days, 1);
        assert_eq!(parts.hours, 1);
        assert_eq!(parts.minutes, 1);
        assert_eq!(parts.seconds, 1);

        let parts = TimeParts::from_seconds(86_399);
        assert_eq!(parts.days, 0);
        assert_eq!(parts.hours, 23);
        assert_eq!(parts.minutes, 59);
        assert_eq!(parts.seconds, 59);
    }

    #[test]
    fn round_trips_total_seconds() {
        for total in [0, 1, 59, 60, 3_599, 3_600, 86_399, 86_400, 950_399] {
            assert_eq!(TimeParts::from_seconds(total).total_seconds(), total);
        }
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(TimeParts::from_seconds(0).to_string(), "00:00:00:00");
        assert_eq!(TimeParts::from_seconds(3_723).to_string(), "00:01:02:03");
        // days are unbounded and may exceed two digits
        assert_eq!(
            TimeParts::from_seconds(123 * 86_400).to_string(),
            "123:00:00:00"
        );
    }

    #[test]
    fn humanizes_nonzero_fields() {
        assert_eq!(TimeParts::from_seconds(0).humanize(), "0s");
        assert_eq!(TimeParts::from_seconds(65).humanize(), "1m5s");
        assert_eq!(TimeParts::from_seconds(90_000).humanize(), "1d1h");
    }
}
