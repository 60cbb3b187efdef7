//! Unified SQL LedgerStore implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.
//!
//! Concurrency relies on single-statement conditional writes:
//! - creation and referral edges use `INSERT ... ON CONFLICT DO NOTHING`
//! - credits/debits use `UPDATE ... WHERE balance >= -delta RETURNING balance`
//! - the withdrawal swap is a compare-and-swap on the observed balance,
//!   retried with backoff when another writer got there first
//! - the bonus stamp only applies while `last_bonus_at` is the value the
//!   claimant read

use std::marker::PhantomData;

use chrono::{DateTime, Utc};

use super::SqlDatabase;
use crate::domain::{Account, AccountId, Amount};
use crate::storage::{Result, StorageError};

/// SQL-based implementation of LedgerStore.
///
/// This generic implementation works with any SQL database that implements
/// the `SqlDatabase` trait (PostgreSQL, SQLite).
pub struct SqlLedgerStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlLedgerStore<DB> {
    /// Create a new SQL ledger store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &DB::Pool {
        &self.pool
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", raw, e)))
}

fn account_from_columns(
    id: i64,
    balance: i64,
    last_bonus_at: Option<String>,
    referred_by: Option<i64>,
) -> Result<Account> {
    Ok(Account {
        id: AccountId::new(id),
        balance: Amount::from_minor(balance),
        last_bonus_at: last_bonus_at.as_deref().map(parse_timestamp).transpose()?,
        referred_by: referred_by.map(AccountId::new),
    })
}

/// Macro to implement LedgerStore for a specific SQL backend.
///
/// This eliminates duplication between PostgreSQL and SQLite implementations
/// while maintaining full type safety.
macro_rules! impl_ledger_store {
    ($db_type:ty, $row_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlLedgerStore<$db_type> {
            /// Create the ledger tables if they do not exist.
            pub async fn init(&self) -> Result<()> {
                sqlx::raw_sql(crate::storage::schema::CREATE_LEDGER_TABLES)
                    .execute(&self.pool)
                    .await?;
                Ok(())
            }

            fn decode_account(row: &$row_type) -> Result<Account> {
                use sqlx::Row;

                account_from_columns(
                    row.try_get("id")?,
                    row.try_get("balance")?,
                    row.try_get("last_bonus_at")?,
                    row.try_get("referred_by")?,
                )
            }

            /// One compare-and-swap round for `set_balance`.
            async fn swap_balance_once(
                &self,
                id: AccountId,
                value: Amount,
                floor: Amount,
            ) -> Result<Option<Amount>> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Accounts;
                use crate::storage::LedgerStore;

                let current = self
                    .get_account(id)
                    .await?
                    .ok_or(StorageError::AccountNotFound(id))?
                    .balance;

                if current < floor {
                    return Ok(None);
                }
                if value.is_negative() {
                    return Err(StorageError::InsufficientFunds {
                        id,
                        balance: current,
                        delta: value - current,
                    });
                }

                let stmt = Query::update()
                    .table(Accounts::Table)
                    .value(Accounts::Balance, value.minor())
                    .and_where(Expr::col(Accounts::Id).eq(id.get()))
                    .and_where(Expr::col(Accounts::Balance).eq(current.minor()))
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;

                if result.rows_affected() == 1 {
                    Ok(Some(current))
                } else {
                    Err(StorageError::Contention(id))
                }
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::storage::LedgerStore for SqlLedgerStore<$db_type> {
            async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Accounts;

                let stmt = Query::select()
                    .columns([
                        Accounts::Id,
                        Accounts::Balance,
                        Accounts::LastBonusAt,
                        Accounts::ReferredBy,
                    ])
                    .from(Accounts::Table)
                    .and_where(Expr::col(Accounts::Id).eq(id.get()))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

                row.as_ref().map(Self::decode_account).transpose()
            }

            async fn create_account_if_absent(
                &self,
                id: AccountId,
                referred_by: Option<AccountId>,
            ) -> Result<(Account, bool)> {
                use sea_query::{OnConflict, Query};

                use crate::storage::schema::Accounts;
                use crate::storage::LedgerStore;

                let referred_by = referred_by.filter(|referrer| *referrer != id);
                let created_at = Utc::now().to_rfc3339();

                let stmt = Query::insert()
                    .into_table(Accounts::Table)
                    .columns([
                        Accounts::Id,
                        Accounts::Balance,
                        Accounts::ReferredBy,
                        Accounts::CreatedAt,
                    ])
                    .values_panic([
                        id.get().into(),
                        0i64.into(),
                        referred_by.map(AccountId::get).into(),
                        created_at.into(),
                    ])
                    .on_conflict(OnConflict::column(Accounts::Id).do_nothing().to_owned())
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                let created = result.rows_affected() == 1;

                let account = self
                    .get_account(id)
                    .await?
                    .ok_or(StorageError::AccountNotFound(id))?;

                Ok((account, created))
            }

            async fn adjust_balance(&self, id: AccountId, delta: Amount) -> Result<Amount> {
                use sea_query::{Expr, Query};
                use sqlx::Row;

                use crate::storage::schema::Accounts;
                use crate::storage::LedgerStore;

                let stmt = Query::update()
                    .table(Accounts::Table)
                    .value(
                        Accounts::Balance,
                        Expr::col(Accounts::Balance).add(delta.minor()),
                    )
                    .and_where(Expr::col(Accounts::Id).eq(id.get()))
                    .and_where(Expr::col(Accounts::Balance).gte(-delta.minor()))
                    .returning_col(Accounts::Balance)
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                if let Some(row) = sqlx::query(&sql).fetch_optional(&self.pool).await? {
                    let balance: i64 = row.try_get("balance")?;
                    return Ok(Amount::from_minor(balance));
                }

                // Nothing matched: unknown account or the debit would overdraw.
                match self.get_account(id).await? {
                    None => Err(StorageError::AccountNotFound(id)),
                    Some(account) => Err(StorageError::InsufficientFunds {
                        id,
                        balance: account.balance,
                        delta,
                    }),
                }
            }

            async fn set_balance(
                &self,
                id: AccountId,
                value: Amount,
                floor: Amount,
            ) -> Result<Option<Amount>> {
                use backon::Retryable;

                (|| self.swap_balance_once(id, value, floor))
                    .retry(crate::utils::retry::balance_swap_backoff())
                    .when(|e| matches!(e, StorageError::Contention(_)))
                    .await
            }

            async fn record_bonus_claim(&self, id: AccountId, at: DateTime<Utc>) -> Result<()> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Accounts;

                let stmt = Query::update()
                    .table(Accounts::Table)
                    .value(Accounts::LastBonusAt, at.to_rfc3339())
                    .and_where(Expr::col(Accounts::Id).eq(id.get()))
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;

                if result.rows_affected() == 0 {
                    return Err(StorageError::AccountNotFound(id));
                }
                Ok(())
            }

            async fn try_record_bonus_claim(
                &self,
                id: AccountId,
                expected: Option<DateTime<Utc>>,
                at: DateTime<Utc>,
            ) -> Result<bool> {
                use sea_query::{Expr, Query};

                use crate::storage::schema::Accounts;
                use crate::storage::LedgerStore;

                // Stamps are always written with to_rfc3339, so string
                // equality matches the stored value.
                let unchanged = match expected {
                    Some(last) => Expr::col(Accounts::LastBonusAt).eq(last.to_rfc3339()),
                    None => Expr::col(Accounts::LastBonusAt).is_null(),
                };

                let stmt = Query::update()
                    .table(Accounts::Table)
                    .value(Accounts::LastBonusAt, at.to_rfc3339())
                    .and_where(Expr::col(Accounts::Id).eq(id.get()))
                    .and_where(unchanged)
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;

                if result.rows_affected() == 1 {
                    return Ok(true);
                }
                match self.get_account(id).await? {
                    None => Err(StorageError::AccountNotFound(id)),
                    Some(_) => Ok(false),
                }
            }

            async fn try_record_referral(
                &self,
                referrer: AccountId,
                referred: AccountId,
            ) -> Result<bool> {
                use sea_query::{OnConflict, Query};

                use crate::storage::schema::Referrals;

                if referrer == referred {
                    return Ok(false);
                }

                let created_at = Utc::now().to_rfc3339();

                let stmt = Query::insert()
                    .into_table(Referrals::Table)
                    .columns([
                        Referrals::ReferredId,
                        Referrals::ReferrerId,
                        Referrals::CreatedAt,
                    ])
                    .values_panic([
                        referred.get().into(),
                        referrer.get().into(),
                        created_at.into(),
                    ])
                    .on_conflict(
                        OnConflict::column(Referrals::ReferredId)
                            .do_nothing()
                            .to_owned(),
                    )
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;

                Ok(result.rows_affected() == 1)
            }

            async fn list_referrals(&self, referrer: AccountId) -> Result<Vec<AccountId>> {
                use sea_query::{Expr, Order, Query};
                use sqlx::Row;

                use crate::storage::schema::Referrals;

                let stmt = Query::select()
                    .column(Referrals::ReferredId)
                    .from(Referrals::Table)
                    .and_where(Expr::col(Referrals::ReferrerId).eq(referrer.get()))
                    .order_by(Referrals::ReferredId, Order::Asc)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

                rows.iter()
                    .map(|row| -> Result<AccountId> {
                        let referred: i64 = row.try_get("referred_id")?;
                        Ok(AccountId::new(referred))
                    })
                    .collect()
            }
        }
    };
}

impl_ledger_store!(super::postgres::Postgres, sqlx::postgres::PgRow, "postgres");
impl_ledger_store!(super::sqlite::Sqlite, sqlx::sqlite::SqliteRow, "sqlite");
