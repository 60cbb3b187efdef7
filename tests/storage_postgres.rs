//! PostgreSQL storage integration tests using testcontainers.
//!
//! Run with: cargo test --test storage_postgres --features postgres -- --nocapture
//!
//! These tests spin up PostgreSQL in a container using testcontainers-rs,
//! create the ledger tables, and run the LedgerStore contract.

mod storage;

use std::time::Duration;

use reward_ledger::storage::PostgresLedgerStore;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    GenericImage, ImageExt,
};

/// Start PostgreSQL container.
///
/// Returns (container, connection_string) where connection_string is suitable
/// for sqlx PgPool connection.
async fn start_postgres() -> (testcontainers::ContainerAsync<GenericImage>, String) {
    // The readiness line is printed once for the init server and again for
    // the real one; the short sleep below covers the gap.
    let image = GenericImage::new("postgres", "16")
        .with_exposed_port(5432.tcp())
        .with_wait_for(WaitFor::message_on_stdout(
            "database system is ready to accept connections",
        ));

    let container = image
        .with_env_var("POSTGRES_USER", "ledger")
        .with_env_var("POSTGRES_PASSWORD", "ledger")
        .with_env_var("POSTGRES_DB", "reward_ledger")
        .with_startup_timeout(Duration::from_secs(60))
        .start()
        .await
        .expect("Failed to start postgres container");

    tokio::time::sleep(Duration::from_secs(1)).await;

    let host_port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get mapped port");

    let host = container
        .get_host()
        .await
        .expect("Failed to get container host");

    let connection_string = format!(
        "postgres://ledger:ledger@{}:{}/reward_ledger",
        host, host_port
    );

    println!("PostgreSQL available at: {}", connection_string);

    (container, connection_string)
}

#[tokio::test]
async fn test_postgres_ledger_store() {
    println!("=== PostgreSQL LedgerStore Tests ===");
    println!("Starting PostgreSQL container...");

    let (_container, connection_string) = start_postgres().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .expect("Failed to connect to PostgreSQL");

    let store = PostgresLedgerStore::new(pool);
    store.init().await.expect("Failed to create ledger tables");

    run_ledger_store_tests!(&store);

    println!("=== All PostgreSQL LedgerStore tests PASSED ===");
}
