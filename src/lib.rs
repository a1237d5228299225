//! pglink - configured PostgreSQL connections with sslmode resolution
//!
//! pglink turns externally supplied configuration into a live, validated
//! PostgreSQL connection handle, negotiating TLS according to libpq's
//! `sslmode` semantics and optionally instrumenting every query.
//!
//! # Architecture
//!
//! The library is organized into a few small modules:
//!
//! - [`config`]: the `[postgres]` configuration namespace
//! - [`tls`]: sslmode option resolution into a `rustls` client config
//! - [`db`]: connection construction and query hooks
//! - [`error`]: error types and result alias
//!
//! # Example
//!
//! ```no_run
//! use pglink::config::PostgresConfig;
//! use pglink::db::connect;
//!
//! # async fn example() -> pglink::Result<()> {
//! let config = PostgresConfig::from_toml_str(
//!     r#"
//!     [postgres]
//!     hostname = "localhost"
//!     username = "app"
//!     password = "secret"
//!     database = "orders"
//!     debug = true
//!
//!     [postgres.options]
//!     sslmode = "verify-full"
//!     sslrootcert = "/etc/ssl/certs/root.pem"
//!     "#,
//! )?;
//!
//! let span = tracing::info_span!("postgres");
//! let conn = connect(Some(&config), Some(&span)).await?;
//!
//! let rows = conn.query("SELECT id, name FROM users WHERE id = $1", &[&1i32]).await?;
//! println!("got {} rows", rows.len());
//!
//! conn.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod tls;

pub use config::PostgresConfig;
pub use db::{Connection, Hook, QueryContext, QueryEvent, connect};
pub use error::{Error, Result};
