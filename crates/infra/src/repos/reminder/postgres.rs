use super::IReminderRepo;
use reminder_notifier_domain::{RecurrencePattern, Reminder};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::warn;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    user_uid: Uuid,
    title: String,
    description: String,
    remind_at: i64,
    is_recurring: bool,
    recurrence_pattern: Option<String>,
}

impl From<ReminderRaw> for Reminder {
    fn from(raw: ReminderRaw) -> Self {
        let recurrence_pattern = raw.recurrence_pattern.and_then(|pattern| {
            match pattern.parse::<RecurrencePattern>() {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Reminder {} has invalid data: {}", raw.reminder_uid, e);
                    None
                }
            }
        });
        Reminder {
            id: raw.reminder_uid.into(),
            user_id: raw.user_uid.into(),
            title: raw.title,
            description: raw.description,
            remind_at: raw.remind_at,
            is_recurring: raw.is_recurring,
            recurrence_pattern,
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders
            (reminder_uid, user_uid, title, description, remind_at, is_recurring, recurrence_pattern)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.user_id.inner_ref())
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.remind_at)
        .bind(reminder.is_recurring)
        .bind(reminder.recurrence_pattern.map(|p| p.as_str()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_non_recurring_in_window(
        &self,
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.is_recurring = false AND
            r.remind_at >= $1 AND
            r.remind_at <= $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders.into_iter().map(|r| r.into()).collect())
    }

    async fn find_all_recurring(&self) -> anyhow::Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.is_recurring = true
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders.into_iter().map(|r| r.into()).collect())
    }
}
