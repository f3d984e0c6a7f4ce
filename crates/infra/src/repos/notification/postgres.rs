use super::INotificationRepo;
use reminder_notifier_domain::{NotificationRecord, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRaw {
    notification_uid: Uuid,
    user_uid: Uuid,
    category: String,
    notification_type: String,
    reference_uid: Uuid,
    title: String,
    is_read: bool,
    created_at: i64,
}

impl From<NotificationRaw> for NotificationRecord {
    fn from(raw: NotificationRaw) -> Self {
        NotificationRecord {
            id: raw.notification_uid.into(),
            user_id: raw.user_uid.into(),
            category: raw.category,
            notification_type: raw.notification_type,
            reference_id: raw.reference_uid.into(),
            title: raw.title,
            is_read: raw.is_read,
            created_at: raw.created_at,
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn insert(&self, notification: &NotificationRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications
            (notification_uid, user_uid, category, notification_type, reference_uid, title, is_read, created_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(notification.user_id.inner_ref())
        .bind(&notification.category)
        .bind(&notification.notification_type)
        .bind(notification.reference_id.inner_ref())
        .bind(&notification.title)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<NotificationRecord>> {
        let notifications = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.user_uid = $1
            ORDER BY n.created_at
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications.into_iter().map(|n| n.into()).collect())
    }
}
