//! Example demonstrating request/response logging over an in-memory database
//!
//! Run with `RUST_LOG=dbcore_logger=debug` to also see the resolved policy.

use dbcore_logger::{LogType, LoggerConfig, TableLogger};
use dbcore_types::memory::MemoryDatabase;
use dbcore_types::*;
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let db = MemoryDatabase::new(["users", "sessions"]).with_latency(Duration::from_millis(3));

    // Verbose output, cursors excluded
    let logger = TableLogger::new(
        LoggerConfig::default()
            .with_operations_black_list([OperationKind::OpenCursor])
            .with_transaction_tracking(true),
    )?;
    let logged = logger.middleware(db.clone());
    let users = logged.table("users")?;
    let trans = TransactionId::new();

    users
        .mutate(
            MutateRequest::new(Mutation::Put {
                values: vec![
                    json!({"id": "user_1", "name": "Alice"}),
                    json!({"id": "user_2", "name": "Bob"}),
                ],
                keys: None,
            })
            .in_transaction(trans.clone()),
        )
        .await?;
    users
        .get(GetRequest::new(json!("user_1")).in_transaction(trans.clone()))
        .await?;
    users
        .open_cursor(OpenCursorRequest::new(DbCoreQuery::primary(KeyRange::all())))
        .await?;
    logged.complete_transaction(&trans);

    // One line per call, sessions only
    let minimal = TableLogger::new(
        LoggerConfig::default()
            .with_table_white_list(["sessions"])
            .with_log_type(LogType::Minimal),
    )?;
    let logged = minimal.middleware(db);
    let sessions = logged.table("sessions")?;
    sessions
        .mutate(MutateRequest::new(Mutation::Add {
            values: vec![json!({"id": "s1", "user": "user_1"})],
            keys: None,
        }))
        .await?;
    let count = sessions
        .count(CountRequest::new(DbCoreQuery::primary(KeyRange::all())))
        .await?;
    println!("sessions: {}", count);

    // Not logged: users is outside the allow list
    logged
        .table("users")?
        .get_many(GetManyRequest::new(vec![json!("user_1"), json!("user_2")]))
        .await?;

    Ok(())
}
