//! Read-only actor identity resolution.
//!
//! Actors are authenticated by an external collaborator; the engine only
//! stores raw ids and joins them to display identities on the admin
//! detail path.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// Display identity for an administrative actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Lookup of actor ids to display identities. Unknown ids resolve to
/// `None` rather than failing the read.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve(&self, id: Uuid) -> Result<Option<UserIdentity>, EngineError>;
}

/// Fixed in-memory directory, used in tests and single-tenant setups.
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    users: HashMap<Uuid, UserIdentity>,
}

impl StaticUserDirectory {
    pub fn new(users: impl IntoIterator<Item = UserIdentity>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn resolve(&self, id: Uuid) -> Result<Option<UserIdentity>, EngineError> {
        Ok(self.users.get(&id).cloned())
    }
}
