mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{INotificationRepo, IOccurrenceLedgerRepo, IReminderRepo, IUserRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::{FakeSys, ISys, RealSys};

/// Every collaborator the notifier needs, constructed once at startup
/// and handed to the job schedulers and use cases.
#[derive(Clone)]
pub struct NotifierContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub push: Arc<dyn IPushGateway>,
}

struct ContextParams {
    pub postgres_connection_string: String,
    pub service_account_json: String,
}

impl NotifierContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let config = Config::new();
        let sys: Arc<dyn ISys> = Arc::new(RealSys {});

        let key = ServiceAccountKey::from_json(&params.service_account_json)
            .expect("GOOGLE_APPLICATION_CREDENTIALS to be a valid service account key");
        let push = FcmPushGateway::new(key, config.request_timeout, sys.clone())
            .expect("To build the push gateway http client");

        Self {
            repos,
            config,
            sys,
            push: Arc::new(push),
        }
    }

    /// Context backed by inmemory repositories and push gateway, used for testing
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            push: Arc::new(InMemoryPushGateway::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> NotifierContext {
    NotifierContext::create(ContextParams {
        postgres_connection_string: get_env_var("DATABASE_URL"),
        service_account_json: get_env_var("GOOGLE_APPLICATION_CREDENTIALS"),
    })
    .await
}

fn get_env_var(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| panic!("{} env var to be present.", key))
}
