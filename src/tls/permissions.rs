//! SSL key file permission checks
//!
//! libpq refuses client key files readable by group or world, and does not
//! check key file permissions on platforms without POSIX mode bits. Both
//! behaviors are kept here.

use crate::error::Result;
use std::path::Path;

/// Check the permissions on a user-supplied ssl key file.
///
/// The key file should have very little access: anything beyond u=rw (0600)
/// fails with [`Error::SslKeyHasWorldPermissions`](crate::Error::SslKeyHasWorldPermissions).
/// A missing file surfaces as the underlying I/O error.
#[cfg(unix)]
pub fn ssl_key_permissions(sslkey: &Path) -> Result<()> {
    use crate::error::Error;
    use std::os::unix::fs::PermissionsExt;

    let meta = std::fs::metadata(sslkey)?;
    if meta.permissions().mode() & 0o077 != 0 {
        return Err(Error::SslKeyHasWorldPermissions);
    }
    Ok(())
}

/// Permission bits are not meaningful here; the check always passes.
#[cfg(not(unix))]
pub fn ssl_key_permissions(_sslkey: &Path) -> Result<()> {
    Ok(())
}
