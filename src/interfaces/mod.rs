//! Abstract interfaces for reward-ledger components.
//!
//! These traits define the contracts for:
//! - Ledger storage (accounts and referral edges)
//! - Channel membership checks (transport gating)
//! - Notifications to users (referral credit messages)
//! - Wall-clock time (injected so rules stay deterministic)

pub mod clock;
pub mod ledger_store;
pub mod membership;
pub mod notifier;

pub use clock::{Clock, SystemClock};
pub use ledger_store::{LedgerStore, StorageError};
pub use membership::MembershipOracle;
pub use notifier::{NotifyError, Notifier};
