//! Common test utilities and helpers
//!
//! Shared fixtures for the integration tests.

use pglink::config::PostgresConfig;
use std::collections::HashMap;

/// Build a connection config pointing at the test database, overridable
/// through the TEST_DB_* environment variables.
pub fn test_config() -> PostgresConfig {
    let host = std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("TEST_DB_PORT").unwrap_or_else(|_| "5432".to_string());

    PostgresConfig {
        hostname: format!("{host}:{port}"),
        username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
        password: std::env::var("TEST_DB_PASSWORD").unwrap_or_else(|_| "postgres".to_string()),
        database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "postgres".to_string()),
        debug: false,
        pool_size: 4,
        options: HashMap::from([("sslmode".to_string(), "disable".to_string())]),
    }
}
