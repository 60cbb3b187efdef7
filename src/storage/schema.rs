//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Accounts table schema.
#[derive(Iden)]
pub enum Accounts {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "balance"]
    Balance,
    #[iden = "last_bonus_at"]
    LastBonusAt,
    #[iden = "referred_by"]
    ReferredBy,
    #[iden = "created_at"]
    CreatedAt,
}

/// Referral edges table schema.
///
/// Keyed by the referred account: one edge per invitee, ever.
#[derive(Iden)]
pub enum Referrals {
    Table,
    #[iden = "referred_id"]
    ReferredId,
    #[iden = "referrer_id"]
    ReferrerId,
    #[iden = "created_at"]
    CreatedAt,
}

/// SQL for creating the ledger tables. Portable between SQLite and PostgreSQL.
pub const CREATE_LEDGER_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id BIGINT PRIMARY KEY,
    balance BIGINT NOT NULL DEFAULT 0 CHECK (balance >= 0),
    last_bonus_at TEXT,
    referred_by BIGINT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS referrals (
    referred_id BIGINT PRIMARY KEY,
    referrer_id BIGINT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_referrals_referrer ON referrals(referrer_id);
"#;
