mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
pub use postgres::PostgresReminderRepo;
use reminder_notifier_domain::Reminder;

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    /// Non-recurring `Reminder`s with `remind_at` in `[start, end]`
    async fn find_non_recurring_in_window(&self, start: i64, end: i64)
        -> anyhow::Result<Vec<Reminder>>;
    async fn find_all_recurring(&self) -> anyhow::Result<Vec<Reminder>>;
}

#[cfg(test)]
mod tests {
    use crate::repos::create_test_repos;
    use reminder_notifier_domain::{RecurrencePattern, Reminder, User, ID};

    fn contains(reminders: &[Reminder], id: &ID) -> bool {
        reminders.iter().any(|r| r.id == *id)
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn finds_non_recurring_reminders_in_window() {
        for repos in create_test_repos().await {
            let user = User::new();
            repos.users.insert(&user).await.expect("To insert user");

            let base = 1704101340000;
            let before = Reminder::new(user.id.clone(), base - 1);
            let at_start = Reminder::new(user.id.clone(), base);
            let at_end = Reminder::new(user.id.clone(), base + 1000);
            let after = Reminder::new(user.id.clone(), base + 1001);
            let recurring = Reminder::recurring(user.id.clone(), base, RecurrencePattern::Daily);
            for reminder in [&before, &at_start, &at_end, &after, &recurring] {
                repos
                    .reminders
                    .insert(reminder)
                    .await
                    .expect("To insert reminder");
            }

            let found = repos
                .reminders
                .find_non_recurring_in_window(base, base + 1000)
                .await
                .expect("To query reminders");
            assert!(!contains(&found, &before.id));
            assert!(contains(&found, &at_start.id));
            assert!(contains(&found, &at_end.id));
            assert!(!contains(&found, &after.id));
            assert!(!contains(&found, &recurring.id));

            let found = repos
                .reminders
                .find_all_recurring()
                .await
                .expect("To query reminders");
            assert!(contains(&found, &recurring.id));
            assert!(!contains(&found, &at_start.id));
            let stored = found.into_iter().find(|r| r.id == recurring.id).unwrap();
            assert_eq!(stored, recurring);
        }
    }
}
