use super::{IPushGateway, PushError, PushMessage, PushReceipt};
use crate::repos::lock;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Push gateway that records messages instead of sending them.
/// Failures can be queued up to be returned by the next sends.
pub struct InMemoryPushGateway {
    sent: Mutex<Vec<PushMessage>>,
    failures: Mutex<VecDeque<PushError>>,
}

impl InMemoryPushGateway {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// The next send fails with the given error
    pub fn fail_next(&self, error: PushError) {
        lock(&self.failures).push_back(error);
    }

    pub fn sent_messages(&self) -> Vec<PushMessage> {
        lock(&self.sent).clone()
    }
}

impl Default for InMemoryPushGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPushGateway for InMemoryPushGateway {
    async fn send(&self, message: &PushMessage) -> Result<PushReceipt, PushError> {
        if let Some(error) = lock(&self.failures).pop_front() {
            return Err(error);
        }
        let mut sent = lock(&self.sent);
        sent.push(message.clone());
        Ok(PushReceipt {
            provider_response: format!("projects/inmemory/messages/{}", sent.len()),
        })
    }
}
