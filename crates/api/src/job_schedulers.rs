use crate::{
    reminder::{
        detect_due_reminders::DetectDueRemindersUseCase,
        purge_occurrence_ledger::PurgeOccurrenceLedgerUseCase,
    },
    shared::{single_flight::SingleFlight, usecase::execute},
};
use actix_web::rt::time::{interval, interval_at, Instant};
use reminder_notifier_domain::occurrence_retention_millis;
use reminder_notifier_infra::NotifierContext;
use std::time::Duration;
use tracing::{info, warn};

/// Time until the next multiple of `interval` since the unix epoch
pub fn get_start_delay(now_millis: i64, interval: Duration) -> Duration {
    let interval_millis = (interval.as_millis() as i64).max(1);
    let millis_to_next_run = interval_millis - now_millis.rem_euclid(interval_millis);
    Duration::from_millis(millis_to_next_run as u64)
}

pub fn start_due_reminders_job(ctx: NotifierContext) {
    actix_web::rt::spawn(async move {
        let guards = detection_guards(&ctx.config.lead_times);
        info!(
            "Starting due reminders job for lead times: {:?}",
            ctx.config.lead_times
        );

        let now = ctx.sys.get_timestamp_millis();
        let start = Instant::now() + get_start_delay(now, ctx.config.tick_interval);
        let mut ticker = interval_at(start, ctx.config.tick_interval);
        loop {
            ticker.tick().await;
            run_tick(&guards, &ctx);
        }
    });
}

/// One single flight guard per lead time
fn detection_guards(lead_times: &[i64]) -> Vec<(i64, SingleFlight)> {
    lead_times
        .iter()
        .map(|lead_time| (*lead_time, SingleFlight::new()))
        .collect()
}

/// Starts a detection pass for every lead time whose previous pass has finished.
/// Returns how many passes were started.
fn run_tick(guards: &[(i64, SingleFlight)], ctx: &NotifierContext) -> usize {
    guards
        .iter()
        .filter(|(lead_time_minutes, guard)| run_detection_pass(*lead_time_minutes, guard, ctx))
        .count()
}

/// Spawns a detection pass unless the previous one for the same lead time
/// is still running. Returns whether a pass was spawned.
fn run_detection_pass(lead_time_minutes: i64, guard: &SingleFlight, ctx: &NotifierContext) -> bool {
    let permit = match guard.try_acquire() {
        Some(permit) => permit,
        None => {
            warn!(
                "Previous detection pass for lead time {} is still running, skipping this tick",
                lead_time_minutes
            );
            return false;
        }
    };

    let ctx = ctx.clone();
    actix_web::rt::spawn(async move {
        let usecase = DetectDueRemindersUseCase { lead_time_minutes };
        let _ = execute(usecase, &ctx).await;
        drop(permit);
    });
    true
}

pub fn start_occurrence_ledger_purge_job(ctx: NotifierContext) {
    actix_web::rt::spawn(async move {
        let retention_millis =
            occurrence_retention_millis(ctx.config.max_lead_time(), ctx.config.tolerance_minutes);
        let mut ticker = interval(ctx.config.ledger_purge_interval);
        loop {
            ticker.tick().await;

            let usecase = PurgeOccurrenceLedgerUseCase { retention_millis };
            let _ = execute(usecase, &ctx).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::rt::time::sleep;
    use reminder_notifier_domain::{Reminder, User, MINUTE_MILLIS};
    use reminder_notifier_infra::{FakeSys, InMemoryPushGateway};
    use std::sync::Arc;

    #[test]
    fn start_delay_works() {
        let minute = Duration::from_secs(60);
        assert_eq!(get_start_delay(50 * 1000, minute), Duration::from_secs(10));
        assert_eq!(get_start_delay(60 * 1000, minute), Duration::from_secs(60));
        assert_eq!(get_start_delay(59 * 1000, minute), Duration::from_secs(1));
        assert_eq!(
            get_start_delay(1704101340500, minute),
            Duration::from_millis(59_500)
        );
        assert_eq!(
            get_start_delay(50 * 1000, Duration::from_secs(30)),
            Duration::from_secs(10)
        );
    }

    #[actix_web::test]
    async fn skips_pass_while_previous_is_in_flight() {
        let now = 1704101340000;
        let push = Arc::new(InMemoryPushGateway::new());
        let mut ctx = NotifierContext::create_inmemory();
        ctx.sys = Arc::new(FakeSys::new(now));
        ctx.push = push.clone();

        let mut user = User::new();
        user.push_token = Some("tok123".into());
        ctx.repos.users.insert(&user).await.unwrap();
        let reminder = Reminder::new(user.id.clone(), now + 30 * MINUTE_MILLIS);
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let guard = SingleFlight::new();
        let permit = guard.try_acquire().unwrap();
        assert!(!run_detection_pass(30, &guard, &ctx));
        drop(permit);

        assert!(run_detection_pass(30, &guard, &ctx));
        assert!(!run_detection_pass(30, &guard, &ctx));
        while guard.is_in_flight() {
            sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(push.sent_messages().len(), 1);
    }

    #[actix_web::test]
    async fn tick_starts_a_pass_per_lead_time() {
        let now = 1704101340000;
        let push = Arc::new(InMemoryPushGateway::new());
        let mut ctx = NotifierContext::create_inmemory();
        ctx.sys = Arc::new(FakeSys::new(now));
        ctx.push = push.clone();
        ctx.config.lead_times = vec![0, 30];

        let mut user = User::new();
        user.push_token = Some("tok123".into());
        ctx.repos.users.insert(&user).await.unwrap();
        let due_now = Reminder::new(user.id.clone(), now);
        let due_later = Reminder::new(user.id.clone(), now + 30 * MINUTE_MILLIS);
        for reminder in [&due_now, &due_later] {
            ctx.repos.reminders.insert(reminder).await.unwrap();
        }

        let guards = detection_guards(&ctx.config.lead_times);
        assert_eq!(guards.len(), 2);

        // The pass for lead time 30 is still running, lead time 0 is unaffected
        let permit = guards[1].1.try_acquire().unwrap();
        assert_eq!(run_tick(&guards, &ctx), 1);
        while guards[0].1.is_in_flight() {
            sleep(Duration::from_millis(5)).await;
        }
        let sent = push.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].data["reminder_id"], due_now.id.as_string());

        drop(permit);
        assert_eq!(run_tick(&guards, &ctx), 2);
        while guards.iter().any(|(_, guard)| guard.is_in_flight()) {
            sleep(Duration::from_millis(5)).await;
        }
        let sent = push.sent_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].data["reminder_id"], due_later.id.as_string());
    }
}
