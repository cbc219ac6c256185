use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use rusqlite::{Connection, MAIN_DB};
use tracing::debug;

const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";
const HEADER_LEN: usize = 100;
const WRITE_VERSION_OFFSET: usize = 18;
const READ_VERSION_OFFSET: usize = 19;
const WAL_VERSION: u8 = 2;
const LEGACY_VERSION: u8 = 1;
// The engine sizes an in-memory image with a C int.
const MAX_IMAGE_LEN: usize = i32::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Unavailable(PathBuf),
    Unreadable { path: PathBuf, reason: String },
}

impl StoreError {
    fn unreadable(path: &Path, reason: impl Into<String>) -> Self {
        Self::Unreadable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(path) => write!(f, "history store not found: {}", path.display()),
            Self::Unreadable { path, reason } => {
                write!(f, "history store unreadable: {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Reads the whole database file at `path` and opens a private, read-only
/// in-memory copy of it. The file on disk is never opened by the engine.
pub fn load(path: &Path) -> Result<Connection, StoreError> {
    if !path.is_file() {
        return Err(StoreError::Unavailable(path.to_path_buf()));
    }

    let mut bytes = std::fs::read(path).map_err(|error| match error.kind() {
        std::io::ErrorKind::NotFound => StoreError::Unavailable(path.to_path_buf()),
        _ => StoreError::unreadable(path, error.to_string()),
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read history store");

    check_size(bytes.len()).map_err(|reason| StoreError::unreadable(path, reason))?;
    check_header(&bytes).map_err(|reason| StoreError::unreadable(path, reason))?;
    clear_wal_mode(&mut bytes);

    let mut conn =
        Connection::open_in_memory().map_err(|e| StoreError::unreadable(path, e.to_string()))?;
    let len = bytes.len();
    conn.deserialize_read_exact(MAIN_DB, bytes.as_slice(), len, true)
        .map_err(|e| StoreError::unreadable(path, e.to_string()))?;

    // Deserialization is lazy; touch the schema so a corrupt body fails here.
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .map_err(|e| StoreError::unreadable(path, e.to_string()))?;

    Ok(conn)
}

fn check_size(len: usize) -> Result<(), String> {
    if len > MAX_IMAGE_LEN {
        return Err(format!("file too large to load into memory ({len} bytes)"));
    }
    Ok(())
}

fn check_header(bytes: &[u8]) -> Result<(), String> {
    if bytes.is_empty() {
        return Err("file is empty".to_string());
    }
    if bytes.len() < HEADER_LEN {
        return Err(format!("file too short for a database header ({} bytes)", bytes.len()));
    }
    if !bytes.starts_with(SQLITE_HEADER) {
        return Err("not a SQLite database".to_string());
    }
    Ok(())
}

/// A memory-backed database cannot use a write-ahead log, so the private
/// copy is switched to rollback-journal file format.
fn clear_wal_mode(bytes: &mut [u8]) {
    if bytes[WRITE_VERSION_OFFSET] == WAL_VERSION {
        bytes[WRITE_VERSION_OFFSET] = LEGACY_VERSION;
    }
    if bytes[READ_VERSION_OFFSET] == WAL_VERSION {
        bytes[READ_VERSION_OFFSET] = LEGACY_VERSION;
    }
}
