//! Channel membership oracle.

use async_trait::async_trait;

use crate::domain::AccountId;

/// Answers whether a user has joined the gating channel.
///
/// Consulted by the chat handler before reward actions; the reward engine
/// never calls it. Lookup failures count as "not a member".
#[async_trait]
pub trait MembershipOracle: Send + Sync {
    async fn is_member(&self, id: AccountId) -> bool;
}
