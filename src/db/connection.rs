//! Connection construction
//!
//! Combines a [`PostgresConfig`] with a logger span to produce a live,
//! validated [`Connection`]. TLS comes from the option resolver; the pool
//! is delegated to deadpool sized from `pool_size`. A liveness probe runs
//! immediately after the pool is built so a handle is only ever returned
//! when the session is actually usable.

use crate::config::PostgresConfig;
use crate::db::hook::{Hook, QueryContext, QueryEvent};
use crate::error::{Error, Result};
use crate::tls;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio_postgres::{NoTls, Row, types::ToSql};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::Span;

/// A live database connection handle.
///
/// Safe to share across concurrent query operations; the underlying driver
/// pool manages up to `pool_size` sessions.
pub struct Connection {
    pool: Pool,
    hooks: RwLock<Vec<Arc<Hook>>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

/// Build a validated connection from configuration and a logger span.
///
/// Fails fast with [`Error::EmptyConfig`] / [`Error::EmptyLogger`] before
/// any I/O. Option-resolver failures propagate unchanged. After the pool is
/// built, a `SELECT 1` probe must succeed; otherwise the pool is closed and
/// [`Error::Connect`] names the underlying cause.
///
/// With `debug` enabled, one connect-time line (including credentials, for
/// diagnostic use) is emitted through the span and a query-logging hook is
/// installed on the returned handle.
pub async fn connect(config: Option<&PostgresConfig>, logger: Option<&Span>) -> Result<Connection> {
    let cfg = config.ok_or(Error::EmptyConfig)?;
    let logger = logger.ok_or(Error::EmptyLogger)?.clone();

    if cfg.debug {
        tracing::debug!(
            parent: &logger,
            hostname = %cfg.hostname,
            username = %cfg.username,
            password = %cfg.password,
            database = %cfg.database,
            pool_size = cfg.pool_size,
            options = ?cfg.options,
            "connect to PostgreSQL"
        );
    }

    let tls_config = tls::resolve(&cfg.options)?;

    let (host, port) = cfg.host_port();
    let mut pg_config = tokio_postgres::Config::new();
    pg_config
        .host(host)
        .port(port)
        .user(&cfg.username)
        .password(&cfg.password)
        .dbname(&cfg.database);

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let manager = match tls_config {
        None => Manager::from_config(pg_config, NoTls, manager_config),
        Some(tls_config) => Manager::from_config(
            pg_config,
            MakeRustlsConnect::new(tls_config),
            manager_config,
        ),
    };

    let pool = Pool::builder(manager)
        .max_size(cfg.pool_size.max(1))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| Error::Connect(e.to_string()))?;

    if let Err(err) = probe(&pool).await {
        pool.close();
        return Err(err);
    }

    let connection = Connection {
        pool,
        hooks: RwLock::new(Vec::new()),
    };

    if cfg.debug {
        connection.add_query_hook(Hook::debug(logger));
    }

    Ok(connection)
}

/// Minimal round-trip confirming the session is usable, not just that the
/// socket opened.
async fn probe(pool: &Pool) -> Result<()> {
    let client = pool
        .get()
        .await
        .map_err(|e| Error::Connect(e.to_string()))?;
    client
        .execute("SELECT 1", &[])
        .await
        .map_err(|e| Error::Connect(e.to_string()))?;
    Ok(())
}

impl Connection {
    /// Register a query instrumentation hook on this handle.
    pub fn add_query_hook(&self, hook: Hook) {
        self.hooks.write().push(Arc::new(hook));
    }

    /// Execute a statement, returning the number of rows affected.
    pub async fn execute(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let hooks = self.hooks_snapshot();
        let mut event = QueryEvent::new(query, render_params(params));
        let mut ctx = QueryContext::new();
        for hook in &hooks {
            ctx = hook.before_query(ctx, &event)?;
        }

        let outcome = self.raw_execute(query, params).await;
        event.error = outcome.as_ref().err().map(ToString::to_string);

        for hook in &hooks {
            hook.after_query(&ctx, &event)?;
        }
        outcome
    }

    /// Execute a query, returning the resulting rows.
    pub async fn query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let hooks = self.hooks_snapshot();
        let mut event = QueryEvent::new(query, render_params(params));
        let mut ctx = QueryContext::new();
        for hook in &hooks {
            ctx = hook.before_query(ctx, &event)?;
        }

        let outcome = self.raw_query(query, params).await;
        event.error = outcome.as_ref().err().map(ToString::to_string);

        for hook in &hooks {
            hook.after_query(&ctx, &event)?;
        }
        outcome
    }

    /// Close the handle; in-flight sessions are torn down by the pool.
    pub fn close(&self) {
        self.pool.close();
    }

    fn hooks_snapshot(&self) -> Vec<Arc<Hook>> {
        self.hooks.read().clone()
    }

    async fn raw_execute(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let client = self.pool.get().await.map_err(|e| Error::Query(e.to_string()))?;
        client
            .execute(query, params)
            .await
            .map_err(|e| Error::Query(e.to_string()))
    }

    async fn raw_query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let client = self.pool.get().await.map_err(|e| Error::Query(e.to_string()))?;
        client
            .query(query, params)
            .await
            .map_err(|e| Error::Query(e.to_string()))
    }
}

fn render_params(params: &[&(dyn ToSql + Sync)]) -> Vec<String> {
    params.iter().map(|p| format!("{p:?}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_config(options: &[(&str, &str)]) -> PostgresConfig {
        PostgresConfig {
            hostname: "localhost".to_string(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "postgres".to_string(),
            debug: false,
            pool_size: 2,
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn test_empty_config_fails_fast() {
        let span = Span::none();
        let err = connect(None, Some(&span)).await.unwrap_err();
        assert!(matches!(err, Error::EmptyConfig));
    }

    #[tokio::test]
    async fn test_empty_logger_fails_fast() {
        let cfg = test_config(&[]);
        let err = connect(Some(&cfg), None).await.unwrap_err();
        assert!(matches!(err, Error::EmptyLogger));
    }

    #[tokio::test]
    async fn test_resolver_errors_propagate_unwrapped() {
        let span = Span::none();

        let cfg = test_config(&[("sslmode", "whatever")]);
        let err = connect(Some(&cfg), Some(&span)).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedSslMode(ref m) if m == "whatever"));

        let cfg = test_config(&[
            ("sslmode", "verify-full"),
            ("sslrootcert", "/nonexistent/pglink-root.pem"),
        ]);
        let err = connect(Some(&cfg), Some(&span)).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_render_params() {
        let rendered = render_params(&[&1i32, &"abc"]);
        assert_eq!(rendered, vec!["1".to_string(), "\"abc\"".to_string()]);
    }
}
