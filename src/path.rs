//! Remote path handling
//!
//! Paths in the remote hierarchy are absolute, slash-delimited strings.
//! Validation happens once at construction; everything downstream can
//! assume a well-formed path. No normalization is performed beyond
//! component checks — whatever the remote service does with the path
//! is its own business.

use std::fmt;

use crate::store::{StoreError, StoreResult};

/// An absolute slash-delimited path in the remote hierarchy.
///
/// Invariants held after construction:
/// - starts with `/`
/// - no empty components (`//`)
/// - no `.` or `..` components
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath(String);

impl RemotePath {
    /// Parse and validate a remote path.
    pub fn new(path: impl Into<String>) -> StoreResult<Self> {
        let path = path.into();

        if path.is_empty() {
            return Err(StoreError::InvalidPath("empty path".to_string()));
        }
        if !path.starts_with('/') {
            return Err(StoreError::InvalidPath(format!(
                "path must be absolute: {}",
                path
            )));
        }

        // Trailing slash is tolerated on input but stripped so that
        // "/d" and "/d/" key the same entry.
        let path = if path != "/" && path.ends_with('/') {
            path[..path.len() - 1].to_string()
        } else {
            path
        };

        if path != "/" {
            for component in path[1..].split('/') {
                match component {
                    "" => {
                        return Err(StoreError::InvalidPath(format!(
                            "empty component in path: {}",
                            path
                        )))
                    }
                    "." | ".." => {
                        return Err(StoreError::InvalidPath(format!(
                            "relative component in path: {}",
                            path
                        )))
                    }
                    _ => {}
                }
            }
        }

        Ok(Self(path))
    }

    /// The root of the hierarchy.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Parent path, or `None` for the root.
    pub fn parent(&self) -> Option<RemotePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(RemotePath::root()),
            Some(idx) => Some(RemotePath(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Final path component, or `None` for the root.
    pub fn base_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Append a single child component.
    pub fn join(&self, name: &str) -> StoreResult<RemotePath> {
        if name.is_empty() || name.contains('/') {
            return Err(StoreError::InvalidPath(format!(
                "invalid path component: {:?}",
                name
            )));
        }
        if self.is_root() {
            RemotePath::new(format!("/{}", name))
        } else {
            RemotePath::new(format!("{}/{}", self.0, name))
        }
    }

    /// True when `self` is a direct child of `dir`.
    pub fn is_child_of(&self, dir: &RemotePath) -> bool {
        match self.parent() {
            Some(parent) => parent == *dir,
            None => false,
        }
    }

    /// True when `self` equals `prefix` or lives anywhere under it.
    pub fn starts_under(&self, prefix: &RemotePath) -> bool {
        if prefix.is_root() {
            return true;
        }
        self.0 == prefix.0 || self.0.starts_with(&format!("{}/", prefix.0))
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RemotePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
