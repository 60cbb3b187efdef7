//! In-process collaborators for local runs and tests.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::AccountId;
use crate::interfaces::{MembershipOracle, NotifyError, Notifier};

/// Membership oracle backed by a fixed answer or an allow list.
#[derive(Debug, Default)]
pub struct StaticMembership {
    /// `None` admits everyone.
    members: Option<RwLock<HashSet<AccountId>>>,
}

impl StaticMembership {
    /// Everyone is a member.
    pub fn allow_all() -> Self {
        Self { members: None }
    }

    /// Only the listed accounts are members.
    pub fn only(members: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            members: Some(RwLock::new(members.into_iter().collect())),
        }
    }

    /// Add a member to the allow list. No-op when everyone is admitted.
    pub async fn admit(&self, id: AccountId) {
        if let Some(members) = &self.members {
            members.write().await.insert(id);
        }
    }
}

#[async_trait]
impl MembershipOracle for StaticMembership {
    async fn is_member(&self, id: AccountId) -> bool {
        match &self.members {
            None => true,
            Some(members) => members.read().await.contains(&id),
        }
    }
}

/// Notifier that only writes messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, id: AccountId, message: &str) -> Result<(), NotifyError> {
        info!(account = %id, message = %message, "Notification");
        Ok(())
    }
}
