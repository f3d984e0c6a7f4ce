mod notification;
mod occurrence;
mod reminder;
mod shared;
mod user;

pub use notification::INotificationRepo;
use notification::{InMemoryNotificationRepo, PostgresNotificationRepo};
pub use occurrence::IOccurrenceLedgerRepo;
use occurrence::{InMemoryOccurrenceLedgerRepo, PostgresOccurrenceLedgerRepo};
pub use reminder::IReminderRepo;
use reminder::{InMemoryReminderRepo, PostgresReminderRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
pub use user::IUserRepo;
use user::{InMemoryUserRepo, PostgresUserRepo};

pub(crate) use shared::inmemory_repo::lock;

#[derive(Clone)]
pub struct Repos {
    pub reminders: Arc<dyn IReminderRepo>,
    pub users: Arc<dyn IUserRepo>,
    pub notifications: Arc<dyn INotificationRepo>,
    pub occurrences: Arc<dyn IOccurrenceLedgerRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        info!("DB EXECUTING MIGRATION ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB EXECUTING MIGRATION ... [done]");

        Ok(Self {
            reminders: Arc::new(PostgresReminderRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            occurrences: Arc::new(PostgresOccurrenceLedgerRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            reminders: Arc::new(InMemoryReminderRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
            notifications: Arc::new(InMemoryNotificationRepo::new()),
            occurrences: Arc::new(InMemoryOccurrenceLedgerRepo::new()),
        }
    }
}

/// Creates inmemory repos and also postgres repos when `DATABASE_URL` is set
#[cfg(test)]
pub(crate) async fn create_test_repos() -> Vec<Repos> {
    let mut repos = vec![Repos::create_inmemory()];
    if let Ok(connection_string) = std::env::var("DATABASE_URL") {
        repos.push(
            Repos::create_postgres(&connection_string)
                .await
                .expect("Postgres credentials to be valid"),
        );
    }
    repos
}
