use crate::{
    shared::entity::{Entity, ID},
    Reminder,
};
use serde::Serialize;

pub const REMINDER_CATEGORY: &str = "reminder";
pub const REMINDER_DUE_TYPE: &str = "reminder_due";

/// Audit record of a push notification that was delivered to a `User`
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRecord {
    pub id: ID,
    pub user_id: ID,
    pub category: String,
    pub notification_type: String,
    /// The `Reminder` this notification was sent for
    pub reference_id: ID,
    pub title: String,
    pub is_read: bool,
    pub created_at: i64,
}

#[derive(Serialize)]
struct ReminderDueTitle<'a> {
    time: &'a str,
    description: &'a str,
}

impl NotificationRecord {
    /// The title is stored as a json object with the occasion and the
    /// `Reminder` description, which is what the clients render.
    pub fn reminder_due(reminder: &Reminder, occasion: &str, created_at: i64) -> Self {
        let title = serde_json::to_string(&ReminderDueTitle {
            time: occasion,
            description: &reminder.description,
        })
        .unwrap_or_default();

        Self {
            id: Default::default(),
            user_id: reminder.user_id.clone(),
            category: REMINDER_CATEGORY.into(),
            notification_type: REMINDER_DUE_TYPE.into(),
            reference_id: reminder.id.clone(),
            title,
            is_read: false,
            created_at,
        }
    }
}

impl Entity for NotificationRecord {
    fn id(&self) -> &ID {
        &self.id
    }
}
