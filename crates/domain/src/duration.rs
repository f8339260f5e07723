//! Timer duration — a non-negative time span.
//!
//! Service calls may express a span as a number of seconds, as an
//! `HH:MM[:SS[.fff]]` string (optionally signed), or as an object with any of
//! `days`, `hours`, `minutes`, `seconds`, `milliseconds`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::value::display;

const PART_KEYS: [(&str, f64); 5] = [
    ("days", 86_400_000.0),
    ("hours", 3_600_000.0),
    ("minutes", 60_000.0),
    ("seconds", 1_000.0),
    ("milliseconds", 1.0),
];

/// Validated, non-negative timer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "TimeSpan")]
pub struct TimerDuration(Duration);

/// Hours/minutes/seconds rendering of a [`TimerDuration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimerDuration {
    /// Value calling UIs pre-fill: 30 minutes.
    pub const DEFAULT: TimerDuration = TimerDuration(Duration::from_secs(30 * 60));

    /// Build from signed hour/minute/second components.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDuration`] if the total is negative.
    pub fn from_hms(hours: i64, minutes: i64, seconds: i64) -> Result<Self, ValidationError> {
        let total = hours
            .checked_mul(3600)
            .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(seconds))
            .ok_or_else(|| {
                ValidationError::InvalidDuration(format!("{hours}:{minutes}:{seconds}"))
            })?;
        let total = u64::try_from(total)
            .map_err(|_| ValidationError::InvalidDuration(format!("{total}s")))?;
        Ok(Self(Duration::from_secs(total)))
    }

    /// Build from a (possibly fractional) number of seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDuration`] if negative or not finite.
    pub fn from_secs_f64(seconds: f64) -> Result<Self, ValidationError> {
        Duration::try_from_secs_f64(seconds)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDuration(seconds.to_string()))
    }

    /// Parse an `HH:MM`, `HH:MM:SS` or `HH:MM:SS.fff` string, or a bare
    /// number of seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDuration`] if the string is
    /// malformed or describes a negative span.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDuration(input.to_string());
        let trimmed = input.trim();

        if !trimmed.contains(':') {
            let secs: f64 = trimmed.parse().map_err(|_| invalid())?;
            return Self::from_secs_f64(secs).map_err(|_| invalid());
        }

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let parts: Vec<&str> = body.split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid());
        }
        let hours: u64 = parts[0].parse().map_err(|_| invalid())?;
        let minutes: u64 = parts[1].parse().map_err(|_| invalid())?;
        let seconds: f64 = match parts.get(2) {
            Some(s) => s.parse().map_err(|_| invalid())?,
            None => 0.0,
        };
        let fractional = Duration::try_from_secs_f64(seconds).map_err(|_| invalid())?;
        let whole = hours
            .checked_mul(3600)
            .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .ok_or_else(invalid)?;
        let span = Duration::from_secs(whole)
            .checked_add(fractional)
            .ok_or_else(invalid)?;

        if negative && !span.is_zero() {
            return Err(invalid());
        }
        Ok(Self(span))
    }

    /// Parse a required service-call field in any accepted encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for `null` and
    /// [`ValidationError::InvalidDuration`] for anything negative or
    /// unparseable.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Null => Err(ValidationError::MissingField("duration")),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| ValidationError::InvalidDuration(n.to_string()))
                .and_then(Self::from_secs_f64),
            Value::String(s) => Self::parse(s),
            Value::Object(map) => {
                let invalid = || ValidationError::InvalidDuration(display(value));
                let known = |key: &String| PART_KEYS.iter().any(|(part, _)| *part == key.as_str());
                if map.is_empty() || !map.keys().all(known) {
                    return Err(invalid());
                }
                let mut millis = 0.0;
                for (key, factor) in PART_KEYS {
                    if let Some(part) = map.get(key) {
                        millis += part.as_f64().ok_or_else(invalid)? * factor;
                    }
                }
                Self::from_secs_f64(millis / 1000.0).map_err(|_| invalid())
            }
            other => Err(ValidationError::InvalidDuration(display(other))),
        }
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        self.0
    }

    /// Whole seconds, fractional part dropped.
    #[must_use]
    pub fn as_secs(self) -> u64 {
        self.0.as_secs()
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn span(self) -> TimeSpan {
        let secs = self.as_secs();
        TimeSpan {
            hours: secs / 3600,
            minutes: secs % 3600 / 60,
            seconds: secs % 60,
        }
    }
}

impl Default for TimerDuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Duration> for TimerDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl TryFrom<Value> for TimerDuration {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<TimerDuration> for TimeSpan {
    fn from(duration: TimerDuration) -> Self {
        duration.span()
    }
}

impl fmt::Display for TimerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let TimeSpan {
            hours,
            minutes,
            seconds,
        } = self.span();
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}
