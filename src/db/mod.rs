//! Database connectivity
//!
//! Connection construction and query instrumentation. TLS resolution lives
//! in [`crate::tls`]; this module wires its output into the driver.

pub mod connection;
pub mod hook;

pub use connection::{Connection, connect};
pub use hook::{Hook, QueryContext, QueryEvent};
