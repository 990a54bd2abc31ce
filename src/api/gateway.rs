//! Remote file gateway
//!
//! [`RemoteFileGateway`] is the main entry point: it owns at most one
//! [`ConnectionContext`] and exposes the file operations over it. The
//! gateway is either fully connected (context present, all operations
//! usable) or fully disconnected (all operations fail fast with
//! [`GatewayError::NotConnected`]); there are no partial states.
//!
//! Every call round-trips to the remote store; nothing is cached and
//! nothing is retried.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, instrument};

use crate::api::types::{ByteStream, FileEntry, GatewayError, GatewayResult, ProgressSink};
use crate::config::{GatewayConfig, OverwritePolicy};
use crate::path::RemotePath;
use crate::store::{dial, Endpoint, RemoteStore, StoreError};

/// The live session binding: endpoint, user identity, and the dialed
/// store handle. Owned exclusively by one gateway and dropped on
/// disconnect.
pub struct ConnectionContext {
    endpoint: Endpoint,
    user: String,
    store: Box<dyn RemoteStore>,
}

impl ConnectionContext {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

/// Facade over a remote hierarchical storage service.
///
/// Single-threaded usage model: the gateway provides no internal
/// locking. Callers needing concurrency serialize access externally
/// or hold one gateway per thread of control.
pub struct RemoteFileGateway {
    /// Present iff connected
    context: Option<ConnectionContext>,

    /// Behavior of `create_file` on an existing path
    overwrite: OverwritePolicy,

    /// Copy buffer size for uploads and downloads
    chunk_size: usize,
}

impl RemoteFileGateway {
    /// Create a disconnected gateway with default transfer settings.
    pub fn new() -> Self {
        Self {
            context: None,
            overwrite: OverwritePolicy::Deny,
            chunk_size: crate::config::defaults::COPY_CHUNK_SIZE,
        }
    }

    /// Create a disconnected gateway with the given transfer settings.
    pub fn with_config(config: &GatewayConfig) -> Self {
        Self {
            context: None,
            overwrite: config.transfer.overwrite,
            chunk_size: config.transfer.chunk_size,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.context.is_some()
    }

    /// The current connection context, if any.
    pub fn context(&self) -> Option<&ConnectionContext> {
        self.context.as_ref()
    }

    /// Establish a connection context.
    ///
    /// # Arguments
    /// * `endpoint` - endpoint URI of the form `scheme://host:port`
    /// * `user` - user identity to dial as
    ///
    /// Connecting while already connected fails rather than silently
    /// replacing (and leaking) the prior context.
    pub fn connect(&mut self, endpoint: &str, user: &str) -> GatewayResult<()> {
        if self.context.is_some() {
            return Err(GatewayError::Connection("already connected".to_string()));
        }
        if endpoint.is_empty() {
            return Err(GatewayError::Connection("empty endpoint".to_string()));
        }
        if user.is_empty() {
            return Err(GatewayError::Connection("empty user identity".to_string()));
        }

        let endpoint = Endpoint::parse(endpoint)
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        let store = dial(&endpoint, user)
            .map_err(|e| GatewayError::Connection(format!("{}: {}", endpoint, e)))?;

        debug!(endpoint = %endpoint, user, "connected");
        self.context = Some(ConnectionContext {
            endpoint,
            user: user.to_string(),
            store,
        });
        Ok(())
    }

    /// Connect using an externally constructed store handle.
    ///
    /// This is the seam for real service clients: anything implementing
    /// [`RemoteStore`] can be plugged in without registering a scheme.
    pub fn connect_with_store(
        &mut self,
        endpoint: &str,
        user: &str,
        store: Box<dyn RemoteStore>,
    ) -> GatewayResult<()> {
        if self.context.is_some() {
            return Err(GatewayError::Connection("already connected".to_string()));
        }
        if user.is_empty() {
            return Err(GatewayError::Connection("empty user identity".to_string()));
        }
        let endpoint = Endpoint::parse(endpoint)
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        debug!(endpoint = %endpoint, user, "connected with external store");
        self.context = Some(ConnectionContext {
            endpoint,
            user: user.to_string(),
            store,
        });
        Ok(())
    }

    /// Release the connection context. No-op when already disconnected.
    pub fn disconnect(&mut self) {
        if let Some(ctx) = self.context.take() {
            debug!(endpoint = %ctx.endpoint, "disconnected");
        }
    }

    fn store(&self) -> GatewayResult<&dyn RemoteStore> {
        self.context
            .as_ref()
            .map(|ctx| ctx.store.as_ref())
            .ok_or(GatewayError::NotConnected)
    }

    fn parse_path(path: &str) -> GatewayResult<RemotePath> {
        RemotePath::new(path).map_err(|e| GatewayError::Path(e.to_string()))
    }

    /// Create a file with the given initial content.
    ///
    /// Whether an existing path is overwritten is the gateway's
    /// configured [`OverwritePolicy`], not an inherited remote-service
    /// default; `Deny` yields a `Conflict` error.
    pub fn create_file(&self, path: &str, content: &[u8]) -> GatewayResult<()> {
        let store = self.store()?;
        let remote = Self::parse_path(path)?;
        let overwrite = self.overwrite == OverwritePolicy::Overwrite;

        store
            .create_file(&remote, content, overwrite)
            .map_err(|e| match e {
                StoreError::ParentMissing(p) => GatewayError::Path(p),
                StoreError::IsADirectory(p) => GatewayError::Path(p),
                StoreError::AlreadyExists(p) => GatewayError::Conflict(p),
                other => GatewayError::RemoteIo {
                    path: path.to_string(),
                    source: other,
                },
            })?;
        debug!(path, bytes = content.len(), "created file");
        Ok(())
    }

    /// Open a file for reading.
    ///
    /// The returned [`ByteStream`] is lazy, finite, and forward-only;
    /// it is released on drop and cannot be restarted.
    pub fn read_file(&self, path: &str) -> GatewayResult<ByteStream> {
        let store = self.store()?;
        let remote = Self::parse_path(path)?;

        let reader = store.open_file(&remote).map_err(|e| match e {
            StoreError::NotFound(p) => GatewayError::NotFound(p),
            other => GatewayError::RemoteIo {
                path: path.to_string(),
                source: other,
            },
        })?;
        Ok(ByteStream::new(reader))
    }

    /// Move an entry from `old` to `new`.
    ///
    /// The facade makes no atomicity guarantee of its own; conflict
    /// policy when `new` exists is remote-service-defined (the in-tree
    /// memory backend rejects it with a conflict).
    pub fn rename(&self, old: &str, new: &str) -> GatewayResult<()> {
        let store = self.store()?;
        let old_path = Self::parse_path(old)?;
        let new_path = Self::parse_path(new)?;

        store.rename(&old_path, &new_path).map_err(|e| match e {
            StoreError::NotFound(p) => GatewayError::NotFound(p),
            StoreError::AlreadyExists(p) => GatewayError::Conflict(p),
            StoreError::ParentMissing(p) => GatewayError::Path(p),
            other => GatewayError::RemoteIo {
                path: old.to_string(),
                source: other,
            },
        })?;
        debug!(old, new, "renamed");
        Ok(())
    }

    /// Delete a file or directory.
    ///
    /// A non-empty directory requires `recursive`; an absent path is
    /// an error, never a silent success.
    pub fn delete(&self, path: &str, recursive: bool) -> GatewayResult<()> {
        let store = self.store()?;
        let remote = Self::parse_path(path)?;

        store.remove(&remote, recursive).map_err(|e| match e {
            StoreError::NotFound(p) => GatewayError::NotFound(p),
            StoreError::NotEmpty(p) => GatewayError::DirectoryNotEmpty(p),
            other => GatewayError::RemoteIo {
                path: path.to_string(),
                source: other,
            },
        })?;
        debug!(path, recursive, "deleted");
        Ok(())
    }

    /// Create a directory. The parent must already exist.
    pub fn mkdir(&self, path: &str) -> GatewayResult<()> {
        let store = self.store()?;
        let remote = Self::parse_path(path)?;

        store.mkdir(&remote).map_err(|e| match e {
            StoreError::ParentMissing(p) => GatewayError::Path(p),
            StoreError::AlreadyExists(p) => GatewayError::Conflict(p),
            other => GatewayError::RemoteIo {
                path: path.to_string(),
                source: other,
            },
        })?;
        debug!(path, "created directory");
        Ok(())
    }

    /// Copy a local file into `remote_dir` under its local base name.
    ///
    /// The optional progress sink is invoked once per copied chunk as
    /// a bare notification; the cadence depends on the configured
    /// chunk size and is not part of the contract. A write failure may
    /// leave a partial remote file behind; there is no rollback.
    #[instrument(level = "debug", skip(self, progress))]
    pub fn upload_local_file(
        &self,
        local: &Path,
        remote_dir: &str,
        mut progress: Option<&mut ProgressSink<'_>>,
    ) -> GatewayResult<()> {
        let store = self.store()?;
        let dir = Self::parse_path(remote_dir)?;

        let base_name = local
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GatewayError::LocalIo {
                path: local.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "local path has no usable file name",
                ),
            })?;
        let dest = dir
            .join(base_name)
            .map_err(|e| GatewayError::Path(e.to_string()))?;

        let mut file = File::open(local).map_err(|e| GatewayError::LocalIo {
            path: local.to_path_buf(),
            source: e,
        })?;

        let mut content = Vec::new();
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            let n = file.read(&mut chunk).map_err(|e| GatewayError::LocalIo {
                path: local.to_path_buf(),
                source: e,
            })?;
            if n == 0 {
                break;
            }
            content.extend_from_slice(&chunk[..n]);
            if let Some(sink) = progress.as_deref_mut() {
                sink();
            }
        }

        let overwrite = self.overwrite == OverwritePolicy::Overwrite;
        store
            .create_file(&dest, &content, overwrite)
            .map_err(|e| match e {
                StoreError::ParentMissing(p) => GatewayError::Path(p),
                StoreError::IsADirectory(p) => GatewayError::Path(p),
                StoreError::AlreadyExists(p) => GatewayError::Conflict(p),
                other => GatewayError::RemoteIo {
                    path: dest.to_string(),
                    source: other,
                },
            })?;
        debug!(dest = %dest, bytes = content.len(), "uploaded");
        Ok(())
    }

    /// Copy a remote file into a new or overwritten local file.
    ///
    /// A mid-transfer failure leaves a possibly truncated local file;
    /// no rollback and no checksum verification happen here (the
    /// remote service may verify integrity on its own).
    #[instrument(level = "debug", skip(self))]
    pub fn download_remote_file(&self, remote: &str, local: &Path) -> GatewayResult<()> {
        let store = self.store()?;
        let remote_path = Self::parse_path(remote)?;

        let mut reader = store.open_file(&remote_path).map_err(|e| match e {
            StoreError::NotFound(p) => GatewayError::NotFound(p),
            other => GatewayError::RemoteIo {
                path: remote.to_string(),
                source: other,
            },
        })?;

        let mut file = File::create(local).map_err(|e| GatewayError::LocalIo {
            path: local.to_path_buf(),
            source: e,
        })?;

        let bytes = std::io::copy(&mut reader, &mut file).map_err(|e| GatewayError::LocalIo {
            path: local.to_path_buf(),
            source: e,
        })?;
        debug!(remote, bytes, "downloaded");
        Ok(())
    }

    /// Non-recursive single-level listing of a directory.
    pub fn list(&self, dir: &str) -> GatewayResult<Vec<FileEntry>> {
        let store = self.store()?;
        let remote = Self::parse_path(dir)?;

        store.list(&remote).map_err(|e| match e {
            StoreError::NotFound(p) => GatewayError::NotFound(p),
            StoreError::NotADirectory(p) => GatewayError::NotADirectory(p),
            other => GatewayError::RemoteIo {
                path: dir.to_string(),
                source: other,
            },
        })
    }

    /// Status of a single remote entry.
    pub fn stat(&self, path: &str) -> GatewayResult<FileEntry> {
        let store = self.store()?;
        let remote = Self::parse_path(path)?;

        store.stat(&remote).map_err(|e| match e {
            StoreError::NotFound(p) => GatewayError::NotFound(p),
            other => GatewayError::RemoteIo {
                path: path.to_string(),
                source: other,
            },
        })
    }
}

impl Default for RemoteFileGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransferConfig;

    const ENDPOINT: &str = "mem://localhost:9000";

    fn connected() -> RemoteFileGateway {
        let mut gw = RemoteFileGateway::new();
        gw.connect(ENDPOINT, "tester").unwrap();
        gw
    }

    #[test]
    fn test_connect_lifecycle() {
        let mut gw = RemoteFileGateway::new();
        assert!(!gw.is_connected());

        gw.connect(ENDPOINT, "tester").unwrap();
        assert!(gw.is_connected());
        let ctx = gw.context().unwrap();
        assert_eq!(ctx.endpoint().to_string(), ENDPOINT);
        assert_eq!(ctx.user(), "tester");

        gw.disconnect();
        assert!(!gw.is_connected());
        // Disconnect is a no-op when already disconnected
        gw.disconnect();
        // Reconnecting is allowed
        gw.connect(ENDPOINT, "tester").unwrap();
    }

    #[test]
    fn test_connect_rejections() {
        let mut gw = RemoteFileGateway::new();
        assert!(matches!(
            gw.connect("", "tester"),
            Err(GatewayError::Connection(_))
        ));
        assert!(matches!(
            gw.connect(ENDPOINT, ""),
            Err(GatewayError::Connection(_))
        ));
        assert!(matches!(
            gw.connect("not a uri", "tester"),
            Err(GatewayError::Connection(_))
        ));
        assert!(matches!(
            gw.connect("hdfs://namenode:8020", "tester"),
            Err(GatewayError::Connection(_))
        ));

        // Connect over an existing context is refused
        gw.connect(ENDPOINT, "tester").unwrap();
        assert!(matches!(
            gw.connect(ENDPOINT, "tester"),
            Err(GatewayError::Connection(_))
        ));
    }

    #[test]
    fn test_operations_require_connection() {
        let gw = RemoteFileGateway::new();
        assert!(matches!(
            gw.create_file("/a", b"x"),
            Err(GatewayError::NotConnected)
        ));
        assert!(matches!(
            gw.read_file("/a"),
            Err(GatewayError::NotConnected)
        ));
        assert!(matches!(
            gw.rename("/a", "/b"),
            Err(GatewayError::NotConnected)
        ));
        assert!(matches!(
            gw.delete("/a", false),
            Err(GatewayError::NotConnected)
        ));
        assert!(matches!(gw.list("/"), Err(GatewayError::NotConnected)));
        assert!(matches!(gw.mkdir("/d"), Err(GatewayError::NotConnected)));
        assert!(matches!(gw.stat("/a"), Err(GatewayError::NotConnected)));
    }

    #[test]
    fn test_create_read_round_trip() {
        let gw = connected();
        gw.mkdir("/d").unwrap();
        gw.create_file("/d/a.txt", b"hello").unwrap();

        let bytes = gw.read_file("/d/a.txt").unwrap().read_to_vec().unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_create_error_mapping() {
        let gw = connected();

        assert!(matches!(
            gw.create_file("/missing/a.txt", b"x"),
            Err(GatewayError::Path(_))
        ));
        assert!(matches!(
            gw.create_file("no-leading-slash", b"x"),
            Err(GatewayError::Path(_))
        ));

        gw.create_file("/a.txt", b"one").unwrap();
        // Default policy denies overwriting
        assert!(matches!(
            gw.create_file("/a.txt", b"two"),
            Err(GatewayError::Conflict(_))
        ));
    }

    #[test]
    fn test_overwrite_policy() {
        let config = GatewayConfig {
            transfer: TransferConfig {
                overwrite: OverwritePolicy::Overwrite,
                ..TransferConfig::default()
            },
            ..GatewayConfig::default()
        };
        let mut gw = RemoteFileGateway::with_config(&config);
        gw.connect(ENDPOINT, "tester").unwrap();

        gw.create_file("/a.txt", b"one").unwrap();
        gw.create_file("/a.txt", b"two").unwrap();
        let bytes = gw.read_file("/a.txt").unwrap().read_to_vec().unwrap();
        assert_eq!(bytes, b"two");
    }

    #[test]
    fn test_rename_error_mapping() {
        let gw = connected();
        gw.create_file("/a", b"1").unwrap();
        gw.create_file("/b", b"2").unwrap();

        assert!(matches!(
            gw.rename("/missing", "/c"),
            Err(GatewayError::NotFound(_))
        ));
        assert!(matches!(
            gw.rename("/a", "/b"),
            Err(GatewayError::Conflict(_))
        ));
        gw.rename("/a", "/c").unwrap();
        assert!(matches!(gw.stat("/a"), Err(GatewayError::NotFound(_))));
        assert_eq!(gw.stat("/c").unwrap().len, 1);
    }

    #[test]
    fn test_delete_error_mapping() {
        let gw = connected();
        gw.mkdir("/d").unwrap();
        gw.create_file("/d/a", b"x").unwrap();

        assert!(matches!(
            gw.delete("/d", false),
            Err(GatewayError::DirectoryNotEmpty(_))
        ));
        assert!(matches!(
            gw.delete("/missing", false),
            Err(GatewayError::NotFound(_))
        ));
        gw.delete("/d", true).unwrap();
        assert!(gw.list("/").unwrap().is_empty());
    }

    #[test]
    fn test_list_error_mapping() {
        let gw = connected();
        gw.create_file("/a", b"x").unwrap();

        assert!(matches!(
            gw.list("/a"),
            Err(GatewayError::NotADirectory(_))
        ));
        assert!(matches!(
            gw.list("/missing"),
            Err(GatewayError::NotFound(_))
        ));
    }
}
