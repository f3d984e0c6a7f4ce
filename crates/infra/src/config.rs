use chrono_tz::Tz;
use std::{fmt::Display, str::FromStr, time::Duration};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the liveness server to run on
    pub port: usize,
    /// Minutes before `remind_at` at which notifications are sent.
    /// Each lead time is detected independently, so a `Reminder` is
    /// notified once per lead time.
    pub lead_times: Vec<i64>,
    /// How often the due detection job ticks
    pub tick_interval: Duration,
    /// Tolerance in minutes on each side of the due window of
    /// non-recurring `Reminder`s, compensating for tick drift.
    pub tolerance_minutes: i64,
    /// Timeout for acquiring access tokens and calling the push gateway
    pub request_timeout: Duration,
    /// Maximum number of notifications dispatched concurrently in one pass
    pub dispatch_concurrency: usize,
    /// Retries of a dispatch failing with a transient error
    pub dispatch_max_retries: usize,
    /// Base backoff between dispatch retries, doubled for every retry
    pub dispatch_retry_backoff: Duration,
    /// How often old admitted occurrences are purged
    pub ledger_purge_interval: Duration,
    /// Timezone in which the wall clock of recurring `Reminder`s is read
    pub timezone: Tz,
}

/// Upper bound of `DISPATCH_MAX_RETRIES`
const MAX_DISPATCH_RETRIES: usize = 10;

fn env_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match std::env::var(key) {
        Ok(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

/// Parses a comma separated list of non-negative minutes, e.g. "0,30"
fn parse_lead_times(value: &str) -> Option<Vec<i64>> {
    let mut lead_times = Vec::new();
    for part in value.split(',') {
        match part.trim().parse::<i64>() {
            Ok(minutes) if minutes >= 0 => lead_times.push(minutes),
            _ => return None,
        }
    }
    lead_times.sort_unstable();
    lead_times.dedup();
    Some(lead_times)
}

fn lead_times_from_env() -> Vec<i64> {
    if let Ok(value) = std::env::var("LEAD_TIMES") {
        match parse_lead_times(&value) {
            Some(lead_times) => return lead_times,
            None => warn!(
                "The given LEAD_TIMES: {} is not valid, falling back to NOTIFY_BEFORE_MINUTES.",
                value
            ),
        }
    }
    let mut notify_before = env_or_default("NOTIFY_BEFORE_MINUTES", 30);
    if notify_before < 0 {
        warn!(
            "The given NOTIFY_BEFORE_MINUTES: {} is negative, falling back to 30.",
            notify_before
        );
        notify_before = 30;
    }
    parse_lead_times(&format!("0,{}", notify_before)).unwrap_or_else(|| vec![0, 30])
}

impl Config {
    pub fn new() -> Self {
        let tolerance_minutes = env_or_default::<i64>("TOLERANCE_MINUTES", 1).max(0);
        let tick_interval_secs = env_or_default::<u64>("TICK_INTERVAL_SECS", 60).clamp(1, 60);

        Self {
            port: env_or_default("PORT", 3000),
            lead_times: lead_times_from_env(),
            tick_interval: Duration::from_secs(tick_interval_secs),
            tolerance_minutes,
            request_timeout: Duration::from_secs(env_or_default("REQUEST_TIMEOUT_SECS", 10)),
            dispatch_concurrency: env_or_default::<usize>("DISPATCH_CONCURRENCY", 8).max(1),
            dispatch_max_retries: env_or_default::<usize>("DISPATCH_MAX_RETRIES", 2)
                .min(MAX_DISPATCH_RETRIES),
            dispatch_retry_backoff: Duration::from_millis(env_or_default(
                "DISPATCH_RETRY_BACKOFF_MILLIS",
                500,
            )),
            ledger_purge_interval: Duration::from_secs(env_or_default(
                "LEDGER_PURGE_INTERVAL_SECS",
                30 * 60,
            )),
            timezone: env_or_default("REMINDER_TIMEZONE", Tz::UTC),
        }
    }

    pub fn max_lead_time(&self) -> i64 {
        self.lead_times.iter().copied().max().unwrap_or(0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
