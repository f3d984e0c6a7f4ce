use crate::date::WallClock;
use chrono_tz::Tz;

pub const MINUTE_MILLIS: i64 = 1000 * 60;

/// Floors the timestamp to the start of its minute
pub fn floor_to_minute(timestamp: i64) -> i64 {
    timestamp.div_euclid(MINUTE_MILLIS) * MINUTE_MILLIS
}

/// Inclusive range of timestamps in millis at which non-recurring
/// `Reminder`s are considered due for a given lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    pub start: i64,
    pub end: i64,
}

impl DueWindow {
    /// `[now + (lead - tolerance), now + (lead + tolerance)]`.
    /// The tolerance compensates for ticks drifting from the minute boundary.
    pub fn new(now: i64, lead_minutes: i64, tolerance_minutes: i64) -> Self {
        Self {
            start: now + (lead_minutes - tolerance_minutes) * MINUTE_MILLIS,
            end: now + (lead_minutes + tolerance_minutes) * MINUTE_MILLIS,
        }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// The minute recurring `Reminder`s are matched against for a given lead time.
/// Not widened by the tolerance as the recurring check runs at every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClockTarget {
    /// Start of the targeted minute
    pub instant: i64,
    pub wall_clock: WallClock,
}

impl WallClockTarget {
    pub fn new(now: i64, lead_minutes: i64, tz: &Tz) -> Self {
        let instant = floor_to_minute(now + lead_minutes * MINUTE_MILLIS);
        Self {
            instant,
            wall_clock: WallClock::from_timestamp_millis(instant, tz),
        }
    }
}
