use super::dispatch_reminder::DispatchReminderUseCase;
use crate::{
    error::NotifierError,
    shared::usecase::{execute, UseCase},
};
use futures::stream::{self, StreamExt};
use reminder_notifier_domain::{DueWindow, OccurrenceSlot, Reminder, SlotStatus, WallClockTarget};
use reminder_notifier_infra::NotifierContext;
use tracing::{debug, error, info, warn};

/// One detection pass for a single lead time. Finds the `Reminder`s which are due
/// `lead_time_minutes` from now, admits their `OccurrenceSlot`s in the ledger and
/// dispatches a notification for every slot admitted by this pass.
#[derive(Debug)]
pub struct DetectDueRemindersUseCase {
    pub lead_time_minutes: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub lead_time_minutes: i64,
    /// Candidates found by the non-recurring and recurring checks
    pub matched: usize,
    /// Candidates whose slot was admitted by this pass
    pub admitted: usize,
    pub delivered: usize,
    /// Owner missing or without a push token
    pub skipped: usize,
    pub failed: usize,
    /// Sub-checks aborted because the repository was unavailable
    pub failed_checks: usize,
}

enum Outcome {
    Delivered,
    Skipped,
    Failed,
}

impl DetectDueRemindersUseCase {
    async fn find_non_recurring(
        &self,
        now: i64,
        ctx: &NotifierContext,
    ) -> Result<Vec<Reminder>, NotifierError> {
        let window = DueWindow::new(now, self.lead_time_minutes, ctx.config.tolerance_minutes);
        let reminders = ctx
            .repos
            .reminders
            .find_non_recurring_in_window(window.start, window.end)
            .await
            .map_err(|e| NotifierError::RepositoryUnavailable(e.to_string()))?;

        Ok(reminders
            .into_iter()
            .filter(|r| !r.is_recurring && window.contains(r.remind_at))
            .collect())
    }

    async fn find_recurring(
        &self,
        target: &WallClockTarget,
        ctx: &NotifierContext,
    ) -> Result<Vec<Reminder>, NotifierError> {
        let tz = ctx.config.timezone;
        let reminders = ctx
            .repos
            .reminders
            .find_all_recurring()
            .await
            .map_err(|e| NotifierError::RepositoryUnavailable(e.to_string()))?;

        Ok(reminders
            .into_iter()
            .filter(|r| {
                if r.recurrence_pattern.is_none() {
                    warn!(
                        "Recurring reminder {} has no valid recurrence pattern and is never notified",
                        r.id
                    );
                    return false;
                }
                r.recurrence_matches(&target.wall_clock, &tz)
            })
            .collect())
    }

    async fn admit(
        &self,
        candidates: Vec<Reminder>,
        target: &WallClockTarget,
        now: i64,
        report: &mut PassReport,
        ctx: &NotifierContext,
    ) -> Vec<(Reminder, OccurrenceSlot)> {
        let mut admitted = Vec::new();
        for reminder in candidates {
            let slot = OccurrenceSlot::new(&reminder, self.lead_time_minutes, target);
            match ctx.repos.occurrences.try_admit(&slot, now).await {
                Ok(true) => admitted.push((reminder, slot)),
                Ok(false) => debug!("Occurrence {} is already admitted", slot),
                Err(e) => {
                    // Not dispatched as the slot could not be recorded. Matched again next tick
                    // while still due.
                    error!(
                        "Unable to admit occurrence of reminder {} for lead time {} with slot key {}. Err: {:?}",
                        reminder.id, slot.lead_time_minutes, slot.slot_key, e
                    );
                    report.failed += 1;
                }
            }
        }
        admitted
    }
}

/// Records the outcome of a dispatch in the ledger
async fn settle(
    reminder: &Reminder,
    slot: &OccurrenceSlot,
    res: Result<(), NotifierError>,
    ctx: &NotifierContext,
) -> Outcome {
    let (outcome, status) = match res {
        Ok(_) => (Outcome::Delivered, Some(SlotStatus::Delivered)),
        Err(e) => {
            warn!(
                "Dropped occurrence of reminder {} for lead time {} with slot key {}. Err: {}",
                reminder.id, slot.lead_time_minutes, slot.slot_key, e
            );
            let outcome = if e.is_skip() {
                Outcome::Skipped
            } else {
                Outcome::Failed
            };
            // The push provider may have accepted the message, so the slot is kept
            let status = if e.maybe_sent() {
                Some(SlotStatus::Failed)
            } else {
                None
            };
            (outcome, status)
        }
    };

    let res = match status {
        Some(status) => ctx.repos.occurrences.set_status(slot, status).await,
        None => ctx.repos.occurrences.release(slot).await,
    };
    if let Err(e) = res {
        error!("Unable to update occurrence {} in the ledger. Err: {:?}", slot, e);
    }

    outcome
}

#[async_trait::async_trait(?Send)]
impl UseCase for DetectDueRemindersUseCase {
    type Response = PassReport;

    type Error = NotifierError;

    const NAME: &'static str = "DetectDueReminders";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let tz = ctx.config.timezone;
        let target = WallClockTarget::new(now, self.lead_time_minutes, &tz);
        let mut report = PassReport {
            lead_time_minutes: self.lead_time_minutes,
            ..Default::default()
        };

        let mut candidates = Vec::new();
        for check in [
            self.find_non_recurring(now, ctx).await,
            self.find_recurring(&target, ctx).await,
        ] {
            match check {
                Ok(reminders) => candidates.extend(reminders),
                Err(e) => {
                    error!(
                        "Due check for lead time {} aborted. Err: {}",
                        self.lead_time_minutes, e
                    );
                    report.failed_checks += 1;
                }
            }
        }
        report.matched = candidates.len();

        let admitted = self
            .admit(candidates, &target, now, &mut report, ctx)
            .await;
        report.admitted = admitted.len();

        let outcomes = stream::iter(admitted.iter())
            .map(|(reminder, slot)| async move {
                let usecase = DispatchReminderUseCase {
                    reminder,
                    occasion: reminder.occasion_description(&tz),
                };
                let res = execute(usecase, ctx).await.map(|_| ());
                settle(reminder, slot, res, ctx).await
            })
            .buffer_unordered(ctx.config.dispatch_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        for outcome in outcomes {
            match outcome {
                Outcome::Delivered => report.delivered += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed => report.failed += 1,
            }
        }

        info!(
            "Detection pass for lead time {} done. Matched: {}, admitted: {}, delivered: {}, skipped: {}, failed: {}, failed checks: {}",
            report.lead_time_minutes,
            report.matched,
            report.admitted,
            report.delivered,
            report.skipped,
            report.failed,
            report.failed_checks
        );

        Ok(report)
    }
}
