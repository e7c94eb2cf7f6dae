//! Connection Manager
//!
//! Resolves the store location and hands out [`ScopedConnection`]s. A scoped
//! connection owns one DuckDB handle for one logical operation and releases
//! it on drop, so early returns, `?` and panics all close the handle.

use std::ffi::OsString;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use duckdb::{AccessMode, Config, Connection};
use tracing::debug;

use crate::StorageError;

/// Environment variable naming the store file
pub const DB_PATH_ENV: &str = "SENSOR_DB_PATH";

/// Store file used when neither an explicit path nor the environment names one
pub const DEFAULT_DB_FILE: &str = "my_geospatial_data.duckdb";

/// Callback run once each time a scoped connection is released
pub type ReleaseHook = Arc<dyn Fn(&Path) + Send + Sync>;

/// Resolve the store path: explicit path, then `SENSOR_DB_PATH`, then
/// [`DEFAULT_DB_FILE`].
pub fn resolve_db_path(explicit: Option<&Path>) -> PathBuf {
    resolve_from(explicit, std::env::var_os(DB_PATH_ENV))
}

fn resolve_from(explicit: Option<&Path>, env_value: Option<OsString>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    match env_value {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_DB_FILE),
    }
}

/// Opens scoped connections to a single store file
#[derive(Clone)]
pub struct ConnectionManager {
    db_path: PathBuf,
    on_release: Option<ReleaseHook>,
}

impl ConnectionManager {
    /// Create a manager for the store at the resolved path
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            db_path: resolve_db_path(path),
            on_release: None,
        }
    }

    /// Register a callback fired after every release
    pub fn with_release_hook(mut self, hook: ReleaseHook) -> Self {
        self.on_release = Some(hook);
        self
    }

    /// Path of the store file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a read-only connection. Fails if the store does not exist.
    pub fn acquire(&self) -> Result<ScopedConnection, StorageError> {
        self.open(AccessMode::ReadOnly)
    }

    /// Open a read-write connection, creating the store file if needed
    pub fn acquire_writable(&self) -> Result<ScopedConnection, StorageError> {
        self.open(AccessMode::ReadWrite)
    }

    fn open(&self, mode: AccessMode) -> Result<ScopedConnection, StorageError> {
        let path = &self.db_path;

        let connection = Config::default()
            .access_mode(mode)
            .and_then(|config| Connection::open_with_flags(path, config))
            .map_err(|source| StorageError::Connection {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "acquired store connection");

        Ok(ScopedConnection {
            connection,
            _release: ReleaseGuard {
                path: path.clone(),
                hook: self.on_release.clone(),
            },
        })
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("db_path", &self.db_path)
            .field("on_release", &self.on_release.is_some())
            .finish()
    }
}

/// A connection owned by exactly one operation.
///
/// Dereferences to [`duckdb::Connection`]. Dropping it closes the handle and
/// then runs the manager's release hook.
pub struct ScopedConnection {
    // Field order matters: the handle is closed before the guard fires.
    connection: Connection,
    _release: ReleaseGuard,
}

impl ScopedConnection {
    /// Path of the store this connection points at
    pub fn path(&self) -> &Path {
        &self._release.path
    }
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.connection
    }
}

impl DerefMut for ScopedConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }
}

struct ReleaseGuard {
    path: PathBuf,
    hook: Option<ReleaseHook>,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "released store connection");
        if let Some(hook) = &self.hook {
            hook(&self.path);
        }
    }
}
