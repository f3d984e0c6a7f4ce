use crate::{error::NotifierError, shared::usecase::UseCase};
use reminder_notifier_infra::NotifierContext;
use tracing::info;

/// Deletes ledger entries that are too old to ever be matched again
#[derive(Debug)]
pub struct PurgeOccurrenceLedgerUseCase {
    pub retention_millis: i64,
}

#[async_trait::async_trait(?Send)]
impl UseCase for PurgeOccurrenceLedgerUseCase {
    type Response = u64;

    type Error = NotifierError;

    const NAME: &'static str = "PurgeOccurrenceLedger";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let before = ctx.sys.get_timestamp_millis() - self.retention_millis;
        let deleted = ctx
            .repos
            .occurrences
            .delete_all_before(before)
            .await
            .map_err(|e| NotifierError::RepositoryUnavailable(e.to_string()))?;
        info!("Purged {} occurrences admitted before {}", deleted, before);

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        reminder::detect_due_reminders::DetectDueRemindersUseCase, shared::usecase::execute,
    };
    use reminder_notifier_domain::{
        occurrence_retention_millis, OccurrenceSlot, Reminder, User, MINUTE_MILLIS,
    };
    use reminder_notifier_infra::{FakeSys, InMemoryPushGateway};
    use std::sync::Arc;

    #[actix_web::test]
    async fn purges_only_expired_occurrences() {
        let now = 1704101340000;
        let sys = Arc::new(FakeSys::new(now));
        let mut ctx = NotifierContext::create_inmemory();
        ctx.sys = sys;

        let retention_millis = occurrence_retention_millis(30, 1);
        let expired = OccurrenceSlot {
            reminder_id: Default::default(),
            lead_time_minutes: 30,
            slot_key: 1,
        };
        let recent = OccurrenceSlot {
            slot_key: 2,
            ..expired.clone()
        };
        let occurrences = &ctx.repos.occurrences;
        assert!(occurrences
            .try_admit(&expired, now - retention_millis - MINUTE_MILLIS)
            .await
            .unwrap());
        assert!(occurrences
            .try_admit(&recent, now - retention_millis + MINUTE_MILLIS)
            .await
            .unwrap());

        let usecase = PurgeOccurrenceLedgerUseCase { retention_millis };
        assert_eq!(execute(usecase, &ctx).await.unwrap(), 1);
        assert!(occurrences.find_status(&expired).await.unwrap().is_none());
        assert!(occurrences.find_status(&recent).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn keeps_occurrences_matchable_inside_the_due_window() {
        let now = 1704101340000;
        let sys = Arc::new(FakeSys::new(now));
        let push = Arc::new(InMemoryPushGateway::new());
        let mut ctx = NotifierContext::create_inmemory();
        ctx.sys = sys.clone();
        ctx.push = push.clone();
        ctx.config.lead_times = vec![0];
        ctx.config.tolerance_minutes = 1;

        let mut user = User::new();
        user.push_token = Some("tok123".into());
        ctx.repos.users.insert(&user).await.unwrap();
        let reminder = Reminder::new(user.id.clone(), now + MINUTE_MILLIS);
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let retention_millis =
            occurrence_retention_millis(ctx.config.max_lead_time(), ctx.config.tolerance_minutes);
        let detect = || DetectDueRemindersUseCase {
            lead_time_minutes: 0,
        };

        let report = execute(detect(), &ctx).await.unwrap();
        assert_eq!(report.delivered, 1);

        sys.advance(90 * 1000);
        let usecase = PurgeOccurrenceLedgerUseCase { retention_millis };
        assert_eq!(execute(usecase, &ctx).await.unwrap(), 0);

        // The reminder is still inside the due window
        sys.set(now + 2 * MINUTE_MILLIS);
        let report = execute(detect(), &ctx).await.unwrap();
        assert_eq!(report.matched, 1);
        assert_eq!(report.admitted, 0);

        // Once the window has passed the slot can go
        sys.set(now + 4 * MINUTE_MILLIS);
        let usecase = PurgeOccurrenceLedgerUseCase { retention_millis };
        assert_eq!(execute(usecase, &ctx).await.unwrap(), 1);
        let report = execute(detect(), &ctx).await.unwrap();
        assert_eq!(report.matched, 0);
        assert_eq!(push.sent_messages().len(), 1);
    }
}
