use crate::date::WallClock;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// How a recurring `Reminder` repeats. The fields of the
/// anchor are compared against the target wall clock, the
/// `Reminder` never carries an explicit rule.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrencePattern {
    /// Whether the pattern anchored at `anchor` fires at `target`.
    ///
    /// Monthly anchors on the 29th, 30th or 31st do not fire in months
    /// lacking that date, there is no clamping to the last day of month.
    pub fn matches(&self, anchor: &WallClock, target: &WallClock) -> bool {
        let same_time = anchor.hour == target.hour && anchor.minute == target.minute;
        match self {
            Self::Daily => same_time,
            Self::Weekly => same_time && anchor.weekday == target.weekday,
            Self::Monthly => same_time && anchor.day_of_month == target.day_of_month,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl Display for RecurrencePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidRecurrencePatternError {
    #[error("Recurrence pattern: `{0}` is not recognized")]
    Unknown(String),
}

impl FromStr for RecurrencePattern {
    type Err = InvalidRecurrencePatternError;

    /// Accepts the canonical labels as well as the localized labels
    /// stored by the mobile clients
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "hằng ngày" => Ok(Self::Daily),
            "weekly" | "hằng tuần" => Ok(Self::Weekly),
            "monthly" | "hằng tháng" => Ok(Self::Monthly),
            _ => Err(InvalidRecurrencePatternError::Unknown(s.to_string())),
        }
    }
}
