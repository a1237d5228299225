//! Error types for pglink
//!
//! One closed error enum for the whole crate. The validation kinds
//! (`EmptyConfig`, `EmptyLogger`, `UnsupportedSslMode`, `PemParse`,
//! `SslKeyHasWorldPermissions`) are sentinels with fixed messages and are
//! compared by variant; I/O errors reading certificate material propagate
//! as-is through the `Io` variant.

use std::io;

/// Main error type for pglink operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration object absent, or the `[postgres]` namespace is missing
    /// from the configuration source
    #[error("database empty config")]
    EmptyConfig,

    /// Logger argument absent
    #[error("database empty logger")]
    EmptyLogger,

    /// `sslmode` value outside the four recognized values
    #[error(
        "unsupported sslmode {0:?}; only \"require\", \"verify-full\", \"verify-ca\", and \"disable\" supported"
    )]
    UnsupportedSslMode(String),

    /// `sslrootcert` file content contains zero parseable PEM certificates
    #[error("couldn't parse pem in sslrootcert")]
    PemParse,

    /// Client key file has group or world permission bits set
    #[error(
        "private key file has group or world access. Permissions should be u=rw (0600) or less"
    )]
    SslKeyHasWorldPermissions,

    /// Filesystem errors reading certificate/key files, unwrapped
    #[error(transparent)]
    Io(#[from] io::Error),

    /// TLS material was readable but could not be assembled into a client
    /// configuration (bad client cert/key pair, verifier build failure)
    #[error("tls configuration failed: {0}")]
    Tls(String),

    /// Failed to parse the configuration source
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Transport opened but the connection is not usable (liveness probe
    /// failed), or the pool could not be built
    #[error("cannot connect to database: {0}")]
    Connect(String),

    /// Query execution failed
    #[error("query failed: {0}")]
    Query(String),
}

/// Specialized Result type for pglink operations
pub type Result<T> = std::result::Result<T, Error>;
