//! TLS option resolution
//!
//! Translates the free-form `options` map of a [`PostgresConfig`] into a
//! validated `rustls` client configuration, enforcing PostgreSQL's
//! `sslmode` semantics:
//!
//! - `disable` — no TLS; every other ssl option is ignored
//! - `require` — encrypted, server certificate accepted without verification
//! - `verify-ca` — certificate chain validated against the CA pool, hostname
//!   not checked
//! - `verify-full` — full chain and hostname validation
//!
//! The CA pool comes from `sslrootcert` when set, otherwise from the OS
//! trust store with the Mozilla roots as fallback. A client certificate is
//! loaded when both `sslcert` and `sslkey` are set; the key file must not be
//! readable by group or world.
//!
//! [`PostgresConfig`]: crate::config::PostgresConfig

pub mod permissions;
pub mod verifier;

use crate::error::{Error, Result};
use rustls::{
    ClientConfig, RootCertStore,
    pki_types::{CertificateDer, PrivateKeyDer},
};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, OnceLock};

pub use permissions::ssl_key_permissions;
pub use verifier::{CaVerifier, NoVerifier};

static CRYPTO_PROVIDER_INIT: OnceLock<()> = OnceLock::new();

/// Install the ring crypto provider once, before any TLS configuration is
/// built. Safe to call repeatedly.
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER_INIT.get_or_init(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Resolve the ssl options map into a client TLS configuration.
///
/// Returns `Ok(None)` for `sslmode=disable` (the default when the key is
/// absent). Validation failures come back as the sentinel errors
/// ([`Error::UnsupportedSslMode`], [`Error::PemParse`],
/// [`Error::SslKeyHasWorldPermissions`]); filesystem errors reading
/// certificate material propagate unwrapped.
pub fn resolve(options: &HashMap<String, String>) -> Result<Option<ClientConfig>> {
    let mode = options.get("sslmode").map_or("disable", String::as_str);

    if mode == "disable" {
        return Ok(None);
    }

    ensure_crypto_provider();

    let builder = match mode {
        "require" => ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier)),
        "verify-ca" => {
            let verifier =
                CaVerifier::new(root_store(options)?).map_err(|e| Error::Tls(e.to_string()))?;
            ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(verifier))
        }
        "verify-full" => ClientConfig::builder().with_root_certificates(root_store(options)?),
        other => return Err(Error::UnsupportedSslMode(other.to_string())),
    };

    let config = match client_pair(options)? {
        Some((certs, key)) => builder
            .with_client_auth_cert(certs, key)
            .map_err(|e| Error::Tls(e.to_string()))?,
        None => builder.with_no_client_auth(),
    };

    Ok(Some(config))
}

/// Assemble the root CA pool for the verifying modes.
///
/// With `sslrootcert` set, every PEM certificate in the file is added; a
/// file yielding zero usable certificates fails with [`Error::PemParse`].
/// Without it, OS certificates are trusted, falling back to the bundled
/// Mozilla roots when none load.
fn root_store(options: &HashMap<String, String>) -> Result<RootCertStore> {
    let mut roots = RootCertStore::empty();

    if let Some(path) = options.get("sslrootcert") {
        let pem = std::fs::read(path)?;
        let parsed: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut Cursor::new(pem))
            .filter_map(std::result::Result::ok)
            .collect();

        let (added, _) = roots.add_parsable_certificates(parsed);
        if added == 0 {
            return Err(Error::PemParse);
        }
        return Ok(roots);
    }

    let native = rustls_native_certs::load_native_certs();
    let mut loaded = 0;
    for cert in native.certs {
        if roots.add(cert).is_ok() {
            loaded += 1;
        }
    }
    if loaded == 0 {
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    Ok(roots)
}

/// Load the client certificate/key pair when both `sslcert` and `sslkey`
/// are set. The key file permission check runs before any key material is
/// read.
fn client_pair(
    options: &HashMap<String, String>,
) -> Result<Option<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)>> {
    let (Some(cert_path), Some(key_path)) = (options.get("sslcert"), options.get("sslkey"))
    else {
        return Ok(None);
    };

    ssl_key_permissions(Path::new(key_path))?;

    let pem = std::fs::read(cert_path)?;
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut Cursor::new(pem))
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::Tls(format!("invalid certificate in {cert_path}: {e}")))?;
    if certs.is_empty() {
        return Err(Error::Tls(format!("no certificates found in {cert_path}")));
    }

    let pem = std::fs::read(key_path)?;
    let key = rustls_pemfile::private_key(&mut Cursor::new(pem))
        .map_err(|e| Error::Tls(format!("invalid private key in {key_path}: {e}")))?
        .ok_or_else(|| Error::Tls(format!("no private key found in {key_path}")))?;

    Ok(Some((certs, key)))
}
