//! Service implementations.

pub mod reward_engine;

pub use reward_engine::{
    AccountSummary, BonusOutcome, ErrorCategory, OnboardOutcome, RewardEngine, RewardError,
    WithdrawOutcome,
};
