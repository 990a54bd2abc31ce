/// API types for gateway operations

use std::io::Read;
use std::path::PathBuf;

use crate::store::StoreError;

/// A single entry from a directory listing.
///
/// Constructed fresh per listing call and never cached; the fields
/// reflect the remote service's view at the time of the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full remote path
    pub path: String,

    /// True for directories
    pub is_dir: bool,

    /// File length in bytes (0 for directories)
    pub len: u64,

    /// Replication factor; meaningful only for files, 0 for directories
    pub replication: u32,
}

/// Progress notification callback.
///
/// Invoked zero or more times during a transfer, once per copied
/// chunk; carries no payload and its cadence is not part of the
/// contract.
pub type ProgressSink<'a> = dyn FnMut() + 'a;

/// Lazy forward-only byte stream over a remote file's full contents.
///
/// The stream is a resource: it is released when dropped, and it is
/// not restartable. Exhausting or abandoning it requires reopening
/// the file.
pub struct ByteStream {
    inner: Box<dyn Read>,
}

impl ByteStream {
    pub(crate) fn new(inner: Box<dyn Read>) -> Self {
        Self { inner }
    }

    /// Drain the remainder of the stream into a buffer.
    pub fn read_to_vec(mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.inner.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("not connected")]
    NotConnected,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("path error: {0}")]
    Path(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("local I/O error: {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("remote I/O error: {path}: {source}")]
    RemoteIo {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("not a directory: {0}")]
    NotADirectory(String),
}

impl GatewayError {
    /// Stable kind name, used by the CLI to identify the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Connection(_) => "connection",
            GatewayError::NotConnected => "not-connected",
            GatewayError::NotFound(_) => "not-found",
            GatewayError::Path(_) => "path",
            GatewayError::Conflict(_) => "conflict",
            GatewayError::DirectoryNotEmpty(_) => "directory-not-empty",
            GatewayError::LocalIo { .. } => "local-io",
            GatewayError::RemoteIo { .. } => "remote-io",
            GatewayError::NotADirectory(_) => "not-a-directory",
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
