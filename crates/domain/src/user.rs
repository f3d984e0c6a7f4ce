use crate::shared::entity::{Entity, ID};

/// The owner of `Reminder`s. Only resolved to find where and to whom
/// a notification should be delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub email: Option<String>,
    /// Device token registered with the push provider
    pub push_token: Option<String>,
}

impl User {
    pub fn new() -> Self {
        Self {
            id: Default::default(),
            email: None,
            push_token: None,
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}
