use super::IOccurrenceLedgerRepo;
use reminder_notifier_domain::{OccurrenceSlot, SlotStatus};
use sqlx::{FromRow, PgPool};
use tracing::warn;

pub struct PostgresOccurrenceLedgerRepo {
    pool: PgPool,
}

impl PostgresOccurrenceLedgerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OccurrenceStatusRaw {
    status: String,
}

#[async_trait::async_trait]
impl IOccurrenceLedgerRepo for PostgresOccurrenceLedgerRepo {
    async fn try_admit(&self, slot: &OccurrenceSlot, admitted_at: i64) -> anyhow::Result<bool> {
        // The primary key makes concurrent inserts of the same slot race
        // on the unique index, only one of them affects a row
        let res = sqlx::query(
            r#"
            INSERT INTO reminder_occurrences
            (reminder_uid, lead_time_minutes, slot_key, status, admitted_at)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(slot.reminder_id.inner_ref())
        .bind(slot.lead_time_minutes)
        .bind(slot.slot_key)
        .bind(SlotStatus::Admitted.as_str())
        .bind(admitted_at)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn set_status(&self, slot: &OccurrenceSlot, status: SlotStatus) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminder_occurrences
            SET status = $4
            WHERE reminder_uid = $1 AND
            lead_time_minutes = $2 AND
            slot_key = $3
            "#,
        )
        .bind(slot.reminder_id.inner_ref())
        .bind(slot.lead_time_minutes)
        .bind(slot.slot_key)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_status(&self, slot: &OccurrenceSlot) -> anyhow::Result<Option<SlotStatus>> {
        let raw = sqlx::query_as::<_, OccurrenceStatusRaw>(
            r#"
            SELECT status FROM reminder_occurrences
            WHERE reminder_uid = $1 AND
            lead_time_minutes = $2 AND
            slot_key = $3
            "#,
        )
        .bind(slot.reminder_id.inner_ref())
        .bind(slot.lead_time_minutes)
        .bind(slot.slot_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw.and_then(|raw| match raw.status.parse::<SlotStatus>() {
            Ok(status) => Some(status),
            Err(status) => {
                warn!("Occurrence {} has unknown status: {}", slot, status);
                None
            }
        }))
    }

    async fn release(&self, slot: &OccurrenceSlot) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM reminder_occurrences
            WHERE reminder_uid = $1 AND
            lead_time_minutes = $2 AND
            slot_key = $3
            "#,
        )
        .bind(slot.reminder_id.inner_ref())
        .bind(slot.lead_time_minutes)
        .bind(slot.slot_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_all_before(&self, before: i64) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            DELETE FROM reminder_occurrences AS o
            WHERE o.admitted_at < $1
            "#,
        )
        .bind(before)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }
}
