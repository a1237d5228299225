//! Integration tests for connection construction
//!
//! These tests require the test PostgreSQL database to be running; each one
//! skips itself when the database is not available.

use crate::common::test_config;
use pglink::db::{Hook, connect};
use pglink::{Connection, Error};
use std::sync::{Arc, Mutex};

async fn try_connect(config: &pglink::PostgresConfig) -> Option<Connection> {
    let span = tracing::info_span!("integration");
    match connect(Some(config), Some(&span)).await {
        Ok(conn) => Some(conn),
        Err(e) => {
            eprintln!(
                "Skipping test: database not available at {} - {}",
                config.hostname, e
            );
            None
        }
    }
}

#[tokio::test]
async fn test_connect_probe_and_close() {
    let config = test_config();
    let Some(conn) = try_connect(&config).await else {
        return;
    };

    let affected = conn.execute("SELECT 1", &[]).await.unwrap();
    assert_eq!(affected, 1);

    let rows = conn.query("SELECT 1 AS num", &[]).await.unwrap();
    assert_eq!(rows.len(), 1);
    let num: i32 = rows[0].get("num");
    assert_eq!(num, 1);

    conn.close();
}

#[tokio::test]
async fn test_bad_credentials_yield_connect_error() {
    let mut config = test_config();
    config.username = "pglink_unknown_user".to_string();

    let span = tracing::info_span!("integration");
    let err = connect(Some(&config), Some(&span)).await.unwrap_err();
    // either auth is rejected or the database is unreachable; both surface
    // as the connect wrap, never as a usable handle
    assert!(matches!(err, Error::Connect(_)));
}

#[tokio::test]
async fn test_after_hook_observes_successful_query() {
    let mut config = test_config();
    config.debug = true;

    let Some(conn) = try_connect(&config).await else {
        return;
    };

    let captured = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);
    conn.add_query_hook(Hook {
        before: None,
        after: Some(Box::new(move |_, event| {
            *sink.lock().unwrap() = Some(event.clone());
            Ok(())
        })),
    });

    conn.execute("SELECT 42", &[]).await.unwrap();

    let event = captured.lock().unwrap().take().expect("hook not invoked");
    assert!(!event.query.is_empty());
    assert!(event.error.is_none());
    assert_eq!(event.attempt, 1);

    conn.close();
}

#[tokio::test]
async fn test_hook_sees_query_error() {
    let config = test_config();
    let Some(conn) = try_connect(&config).await else {
        return;
    };

    let captured = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);
    conn.add_query_hook(Hook {
        before: None,
        after: Some(Box::new(move |_, event| {
            *sink.lock().unwrap() = Some(event.clone());
            Ok(())
        })),
    });

    let result = conn.execute("SELECT * FROM pglink_no_such_table", &[]).await;
    assert!(result.is_err());

    let event = captured.lock().unwrap().take().expect("hook not invoked");
    assert!(event.error.is_some());

    conn.close();
}
