use reminder_notifier_domain::ID;
use reminder_notifier_infra::PushError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifierError {
    #[error("Reminder repository is unavailable. Error message: `{0}`")]
    RepositoryUnavailable(String),
    #[error("User: {0} was not found")]
    UserNotFound(ID),
    #[error("User: {0} has no push token registered")]
    TokenMissing(ID),
    #[error("Unable to acquire push access token. Error message: `{0}`")]
    AuthAcquisitionFailed(String),
    #[error("Transient push failure. Error message: `{0}`")]
    Transient(String),
    #[error("Permanent push failure. Error message: `{0}`")]
    Permanent(String),
}

impl NotifierError {
    /// The `Reminder` could not be notified because of its owner, not because of delivery
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::TokenMissing(_))
    }

    /// Whether the push gateway may have accepted the message. When it surely did not,
    /// the occurrence can be matched and dispatched again while still due.
    pub fn maybe_sent(&self) -> bool {
        matches!(self, Self::AuthAcquisitionFailed(_) | Self::Transient(_))
    }
}

impl From<PushError> for NotifierError {
    fn from(e: PushError) -> Self {
        match e {
            PushError::AuthAcquisitionFailed(msg) => Self::AuthAcquisitionFailed(msg),
            PushError::Transient(msg) => Self::Transient(msg),
            PushError::Permanent(msg) => Self::Permanent(msg),
        }
    }
}
