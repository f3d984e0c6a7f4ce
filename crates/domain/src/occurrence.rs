use crate::{
    due_window::{WallClockTarget, MINUTE_MILLIS},
    shared::entity::ID,
    Reminder,
};
use std::{fmt::Display, str::FromStr};

/// One occurrence of a `Reminder` for one lead time. At most one
/// notification is ever delivered per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceSlot {
    pub reminder_id: ID,
    pub lead_time_minutes: i64,
    /// Minutes since the unix epoch of the matched moment. For non-recurring
    /// `Reminder`s this is the minute of `remind_at`, for recurring ones the
    /// minute of the wall clock target the pattern matched.
    pub slot_key: i64,
}

impl OccurrenceSlot {
    pub fn new(reminder: &Reminder, lead_time_minutes: i64, target: &WallClockTarget) -> Self {
        let matched_at = if reminder.is_recurring {
            target.instant
        } else {
            reminder.remind_at
        };
        Self {
            reminder_id: reminder.id.clone(),
            lead_time_minutes,
            slot_key: matched_at.div_euclid(MINUTE_MILLIS),
        }
    }
}

impl Display for OccurrenceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.reminder_id, self.lead_time_minutes, self.slot_key
        )
    }
}

/// Delivery state of an admitted `OccurrenceSlot`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Admitted,
    Delivered,
    Failed,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admitted => "admitted",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admitted" => Ok(Self::Admitted),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            _ => Err(s.to_string()),
        }
    }
}

/// How long admitted slots must be kept before they can be purged.
/// Older slots can never be matched again.
///
/// A non-recurring slot stays matchable for the whole due window after it
/// is admitted, which is `2 * tolerance` minutes plus the tick it was seen in.
pub fn occurrence_retention_millis(max_lead_time_minutes: i64, tolerance_minutes: i64) -> i64 {
    let lead_retention = 2 * max_lead_time_minutes + tolerance_minutes;
    let window_retention = 2 * tolerance_minutes + 1;
    lead_retention.max(window_retention) * MINUTE_MILLIS
}
