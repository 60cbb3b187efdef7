//! Ledger domain types.
//!
//! Accounts, monetary amounts and referral tokens. These are plain values;
//! persistence lives behind [`crate::interfaces::LedgerStore`].

mod account;
mod amount;
mod referral;

pub use account::{Account, AccountId};
pub use amount::{Amount, MINOR_UNITS_PER_MAJOR};
pub use referral::{InvalidReferralToken, ReferralToken};
