mod date;
mod due_window;
mod notification;
mod occurrence;
mod reminder;
mod shared;
mod user;

pub use date::{format_date, format_time, WallClock};
pub use due_window::{floor_to_minute, DueWindow, WallClockTarget, MINUTE_MILLIS};
pub use notification::{NotificationRecord, REMINDER_CATEGORY, REMINDER_DUE_TYPE};
pub use occurrence::{occurrence_retention_millis, OccurrenceSlot, SlotStatus};
pub use reminder::Reminder;
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::recurrence::{InvalidRecurrencePatternError, RecurrencePattern};
pub use user::User;
