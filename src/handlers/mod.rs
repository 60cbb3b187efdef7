//! Transport adapters over the reward engine.

pub mod chat;
pub mod rest;

pub use chat::{ChatHandler, Reply, Update};
pub use rest::{router, serve, AppState};
