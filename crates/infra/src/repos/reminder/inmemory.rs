use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use reminder_notifier_domain::Reminder;

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find_non_recurring_in_window(
        &self,
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<Reminder>> {
        Ok(find_by(&self.reminders, |r| {
            !r.is_recurring && start <= r.remind_at && r.remind_at <= end
        }))
    }

    async fn find_all_recurring(&self) -> anyhow::Result<Vec<Reminder>> {
        Ok(find_by(&self.reminders, |r| r.is_recurring))
    }
}
