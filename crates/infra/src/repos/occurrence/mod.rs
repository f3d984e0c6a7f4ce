mod inmemory;
mod postgres;

pub use inmemory::InMemoryOccurrenceLedgerRepo;
pub use postgres::PostgresOccurrenceLedgerRepo;
use reminder_notifier_domain::{OccurrenceSlot, SlotStatus};

/// Durable record of which `OccurrenceSlot`s have been admitted for
/// notification. Admission of a slot is linearizable, concurrent
/// `try_admit` calls for the same slot admit exactly one caller.
#[async_trait::async_trait]
pub trait IOccurrenceLedgerRepo: Send + Sync {
    /// Records the slot with status `Admitted` unless it is already recorded.
    /// Returns `true` if this call recorded it.
    async fn try_admit(&self, slot: &OccurrenceSlot, admitted_at: i64) -> anyhow::Result<bool>;
    async fn set_status(&self, slot: &OccurrenceSlot, status: SlotStatus) -> anyhow::Result<()>;
    async fn find_status(&self, slot: &OccurrenceSlot) -> anyhow::Result<Option<SlotStatus>>;
    /// Forgets the slot so that it can be admitted again
    async fn release(&self, slot: &OccurrenceSlot) -> anyhow::Result<()>;
    /// Deletes slots admitted before the given timestamp and returns how many were deleted
    async fn delete_all_before(&self, before: i64) -> anyhow::Result<u64>;
}
