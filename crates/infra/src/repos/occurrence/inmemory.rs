use super::IOccurrenceLedgerRepo;
use crate::repos::shared::inmemory_repo::lock;
use reminder_notifier_domain::{OccurrenceSlot, SlotStatus};
use std::collections::{hash_map::Entry, HashMap};
use std::sync::Mutex;

struct LedgerEntry {
    status: SlotStatus,
    admitted_at: i64,
}

pub struct InMemoryOccurrenceLedgerRepo {
    slots: Mutex<HashMap<OccurrenceSlot, LedgerEntry>>,
}

impl InMemoryOccurrenceLedgerRepo {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl IOccurrenceLedgerRepo for InMemoryOccurrenceLedgerRepo {
    async fn try_admit(&self, slot: &OccurrenceSlot, admitted_at: i64) -> anyhow::Result<bool> {
        let mut slots = lock(&self.slots);
        match slots.entry(slot.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(LedgerEntry {
                    status: SlotStatus::Admitted,
                    admitted_at,
                });
                Ok(true)
            }
        }
    }

    async fn set_status(&self, slot: &OccurrenceSlot, status: SlotStatus) -> anyhow::Result<()> {
        if let Some(entry) = lock(&self.slots).get_mut(slot) {
            entry.status = status;
        }
        Ok(())
    }

    async fn find_status(&self, slot: &OccurrenceSlot) -> anyhow::Result<Option<SlotStatus>> {
        Ok(lock(&self.slots).get(slot).map(|entry| entry.status))
    }

    async fn release(&self, slot: &OccurrenceSlot) -> anyhow::Result<()> {
        lock(&self.slots).remove(slot);
        Ok(())
    }

    async fn delete_all_before(&self, before: i64) -> anyhow::Result<u64> {
        let mut slots = lock(&self.slots);
        let count_before = slots.len();
        slots.retain(|_, entry| entry.admitted_at >= before);
        Ok((count_before - slots.len()) as u64)
    }
}
