use crate::{
    date::{format_date, format_time, WallClock},
    shared::{
        entity::{Entity, ID},
        recurrence::RecurrencePattern,
    },
};
use chrono_tz::Tz;

/// A `Reminder` is a user authored moment at which the owner `User`
/// should receive a push notification on their device.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    /// The `User` which owns this `Reminder` and whose device is notified
    pub user_id: ID,
    pub title: String,
    pub description: String,
    /// The timestamp in millis at which a non-recurring `Reminder` fires.
    /// For recurring `Reminder`s this is the template from which the hour,
    /// minute, weekday and day of month are extracted.
    pub remind_at: i64,
    pub is_recurring: bool,
    /// Required when `is_recurring` is set. `None` on a recurring `Reminder`
    /// means the stored pattern was missing or unrecognized.
    pub recurrence_pattern: Option<RecurrencePattern>,
}

impl Reminder {
    pub fn new(user_id: ID, remind_at: i64) -> Self {
        Self {
            id: Default::default(),
            user_id,
            title: Default::default(),
            description: Default::default(),
            remind_at,
            is_recurring: false,
            recurrence_pattern: None,
        }
    }

    pub fn recurring(user_id: ID, remind_at: i64, pattern: RecurrencePattern) -> Self {
        Self {
            is_recurring: true,
            recurrence_pattern: Some(pattern),
            ..Self::new(user_id, remind_at)
        }
    }

    pub fn anchor(&self, tz: &Tz) -> WallClock {
        WallClock::from_timestamp_millis(self.remind_at, tz)
    }

    /// Checks if this recurring `Reminder` fires at the given wall clock.
    /// Without a known pattern it never fires.
    pub fn recurrence_matches(&self, target: &WallClock, tz: &Tz) -> bool {
        match &self.recurrence_pattern {
            Some(pattern) => pattern.matches(&self.anchor(tz), target),
            None => false,
        }
    }

    /// Human readable description of when this `Reminder` is scheduled,
    /// e.g. "09:00:00 - 01/01/2024" or "09:00:00 - weekly"
    pub fn occasion_description(&self, tz: &Tz) -> String {
        let time = format_time(self.remind_at, tz);
        match (self.is_recurring, &self.recurrence_pattern) {
            (true, Some(pattern)) => format!("{} - {}", time, pattern),
            (true, None) => time,
            (false, _) => format!("{} - {}", time, format_date(self.remind_at, tz)),
        }
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Weekday;

    // Mon Jan 01 2024 09:00:00 UTC
    const MONDAY_9AM: i64 = 1704099600000;

    #[test]
    fn it_describes_the_occasion() {
        let mut reminder = Reminder::new(ID::default(), MONDAY_9AM);
        assert_eq!(reminder.occasion_description(&Tz::UTC), "09:00:00 - 01/01/2024");

        reminder.is_recurring = true;
        reminder.recurrence_pattern = Some(RecurrencePattern::Weekly);
        assert_eq!(reminder.occasion_description(&Tz::UTC), "09:00:00 - weekly");
    }

    #[test]
    fn recurring_reminder_without_pattern_never_matches() {
        let mut reminder = Reminder::recurring(ID::default(), MONDAY_9AM, RecurrencePattern::Daily);
        let target = WallClock {
            hour: 9,
            minute: 0,
            weekday: Weekday::Tue,
            day_of_month: 2,
        };
        assert!(reminder.recurrence_matches(&target, &Tz::UTC));

        reminder.recurrence_pattern = None;
        assert!(!reminder.recurrence_matches(&target, &Tz::UTC));
    }
}
