use std::fmt;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// An instant, as seconds since the Unix epoch
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Time(f64);

impl Time {
    pub fn seconds_since_epoch(secs: f64) -> Self {
        Self(secs)
    }

    pub fn inner_seconds(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let micros = (self.0 * 1_000_000.0).round();
        if micros.is_finite() && micros.abs() < i64::MAX as f64 {
            if let Some(datetime) = Utc.timestamp_micros(micros as i64).single() {
                return write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S%.3f"));
            }
        }
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Time::seconds_since_epoch(1_714_557_600.25).to_string(),
            "2024-05-01 10:00:00.250"
        );
        assert_eq!(Time::seconds_since_epoch(0.0).to_string(), "1970-01-01 00:00:00.000");
        assert_eq!(Time::seconds_since_epoch(f64::INFINITY).to_string(), "infs");
    }
}
