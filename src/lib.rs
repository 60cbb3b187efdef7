//! Reward Ledger
//!
//! Per-user balances behind a chat bot: one-time referral credits,
//! a rate-limited recurring bonus, and threshold-gated withdrawals.

pub mod clients;
pub mod config;
pub mod domain;
pub mod handlers;
pub mod interfaces;
pub mod services;
pub mod storage;
pub mod utils;
