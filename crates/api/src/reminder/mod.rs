pub mod detect_due_reminders;
pub mod dispatch_reminder;
pub mod purge_occurrence_ledger;
