use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    #[error("Operation aborted")]
    Aborted,

    // Resolution Errors
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name not resolved: {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },

    // File Errors
    #[error("Failed to open {}: {source}", .path.display())]
    FileOpenFailed {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Failed to read {}: {source}", .path.display())]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("Failed to write output: {source}")]
    OutputWriteFailed {
        #[source]
        source: Arc<io::Error>,
    },

    // Startup Errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to spawn {role} thread: {source}")]
    ThreadSpawnFailed {
        role: &'static str,
        #[source]
        source: Arc<io::Error>,
    },
}

const ERR_FAILED: i32 = -2;
const ERR_ABORTED: i32 = -3;
const ERR_INVALID_ARGUMENT: i32 = -4;
const ERR_FILE_NOT_FOUND: i32 = -6;
const ERR_ACCESS_DENIED: i32 = -10;
const ERR_NAME_NOT_RESOLVED: i32 = -105;

impl NetError {
    /// Numeric code attached to log events as the `code` field.
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::Aborted => ERR_ABORTED,
            NetError::NameNotResolved | NetError::NameNotResolvedFor { .. } => {
                ERR_NAME_NOT_RESOLVED
            }
            NetError::FileOpenFailed { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => ERR_FILE_NOT_FOUND,
                io::ErrorKind::PermissionDenied => ERR_ACCESS_DENIED,
                _ => ERR_FAILED,
            },
            NetError::FileReadFailed { .. }
            | NetError::OutputWriteFailed { .. }
            | NetError::ThreadSpawnFailed { .. } => ERR_FAILED,
            NetError::InvalidConfig(_) => ERR_INVALID_ARGUMENT,
        }
    }

    /// Name resolution failed for a specific domain.
    pub fn dns_failed(domain: impl Into<String>, source: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.into(),
            source: Arc::new(source),
        }
    }

    /// A file could not be opened or created.
    pub fn open_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        NetError::FileOpenFailed {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// A file was opened but reading from it failed.
    pub fn read_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        NetError::FileReadFailed {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub fn write_failed(source: io::Error) -> Self {
        NetError::OutputWriteFailed {
            source: Arc::new(source),
        }
    }

    pub fn spawn_failed(role: &'static str, source: io::Error) -> Self {
        NetError::ThreadSpawnFailed {
            role,
            source: Arc::new(source),
        }
    }
}
