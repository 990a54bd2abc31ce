//! Remote store abstraction
//!
//! The gateway never speaks a wire protocol of its own; the remote
//! hierarchical storage service is an opaque dependency reached through
//! the [`RemoteStore`] trait. The crate ships one in-tree backend,
//! [`MemoryStore`], registered under the `mem` scheme for demos and
//! tests. Real services implement the trait out of tree and hand the
//! boxed store to `RemoteFileGateway::connect_with_store`.
//!
//! Note: the trait does not require Send + Sync. The gateway has a
//! single-threaded usage model; callers needing concurrency hold one
//! gateway per thread of control.

pub mod memory;

pub use memory::MemoryStore;

use std::io::Read;

use thiserror::Error;

use crate::api::types::FileEntry;
use crate::path::RemotePath;

/// Errors surfaced by a store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("parent directory missing: {0}")]
    ParentMissing(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Primitive operations against the remote hierarchy.
///
/// Methods take `&self`; backends use interior mutability as needed.
pub trait RemoteStore {
    /// Create a file with the given content. `Overwrite` replaces an
    /// existing file; otherwise an existing path is `AlreadyExists`.
    fn create_file(&self, path: &RemotePath, content: &[u8], overwrite: bool) -> StoreResult<()>;

    /// Open a file for a single forward-only read of its full contents.
    fn open_file(&self, path: &RemotePath) -> StoreResult<Box<dyn Read>>;

    /// Move an entry. Destination conflict policy is backend-defined.
    fn rename(&self, old: &RemotePath, new: &RemotePath) -> StoreResult<()>;

    /// Remove a file, or a directory (recursively when asked).
    fn remove(&self, path: &RemotePath, recursive: bool) -> StoreResult<()>;

    /// Create a directory. The parent must already exist.
    fn mkdir(&self, path: &RemotePath) -> StoreResult<()>;

    /// Single-level listing of a directory.
    fn list(&self, path: &RemotePath) -> StoreResult<Vec<FileEntry>>;

    /// Status of a single entry.
    fn stat(&self, path: &RemotePath) -> StoreResult<FileEntry>;
}

/// A parsed `scheme://host:port` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Parse an endpoint URI of the form `scheme://host:port`.
    pub fn parse(uri: &str) -> StoreResult<Self> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| StoreError::InvalidEndpoint(format!("malformed endpoint URI: {}", uri)))?;

        if scheme.is_empty() {
            return Err(StoreError::InvalidEndpoint(format!(
                "malformed endpoint URI: {}",
                uri
            )));
        }

        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| StoreError::InvalidEndpoint(format!("missing port in endpoint: {}", uri)))?;

        if host.is_empty() {
            return Err(StoreError::InvalidEndpoint(format!(
                "missing host in endpoint: {}",
                uri
            )));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| StoreError::InvalidEndpoint(format!("invalid port in endpoint: {}", uri)))?;

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        })
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Resolve an endpoint's scheme to a backend and dial it.
///
/// Only `mem` is registered in-tree. The user identity is recorded by
/// the backend for attribution; the memory backend accepts any.
pub fn dial(endpoint: &Endpoint, user: &str) -> StoreResult<Box<dyn RemoteStore>> {
    match endpoint.scheme.as_str() {
        "mem" => Ok(Box::new(MemoryStore::new(user.to_string()))),
        other => Err(StoreError::UnsupportedScheme(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_parse() {
        let ep = Endpoint::parse("mem://localhost:9000").unwrap();
        assert_eq!(ep.scheme, "mem");
        assert_eq!(ep.host, "localhost");
        assert_eq!(ep.port, 9000);
        assert_eq!(ep.to_string(), "mem://localhost:9000");
    }

    #[test]
    fn test_endpoint_parse_errors() {
        assert!(Endpoint::parse("localhost:9000").is_err()); // no scheme
        assert!(Endpoint::parse("mem://localhost").is_err()); // no port
        assert!(Endpoint::parse("mem://:9000").is_err()); // no host
        assert!(Endpoint::parse("mem://localhost:abc").is_err()); // bad port
        assert!(Endpoint::parse("://host:1").is_err()); // empty scheme
    }

    #[test]
    fn test_dial_unknown_scheme() {
        let ep = Endpoint::parse("hdfs://namenode:8020").unwrap();
        assert!(matches!(
            dial(&ep, "hadoop"),
            Err(StoreError::UnsupportedScheme(_))
        ));
    }
}
