//! In-process store backend
//!
//! A path-keyed map standing in for a real remote service, used by the
//! demos and the test suite. Files and directories live in two maps
//! keyed by full path; a listing is a scan for direct children. The
//! root directory always exists.
//!
//! Note: single-threaded by design, hence `RefCell` rather than locks.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};

use tracing::trace;

use super::{RemoteStore, StoreError, StoreResult};
use crate::api::types::FileEntry;
use crate::path::RemotePath;

/// Default replication factor reported for files, matching the usual
/// remote-service default of three replicas.
pub const DEFAULT_REPLICATION: u32 = 3;

#[derive(Debug, Clone)]
struct FileNode {
    content: Vec<u8>,
    replication: u32,
}

/// In-memory hierarchical store.
pub struct MemoryStore {
    /// Identity the store was dialed with. Recorded for attribution
    /// only; the memory backend performs no authorization.
    user: String,

    /// File path -> content and replication factor.
    files: RefCell<HashMap<RemotePath, FileNode>>,

    /// Directory paths. Always contains the root.
    dirs: RefCell<HashSet<RemotePath>>,

    /// Replication factor stamped on newly created files.
    replication: u32,
}

impl MemoryStore {
    pub fn new(user: String) -> Self {
        Self::with_replication(user, DEFAULT_REPLICATION)
    }

    pub fn with_replication(user: String, replication: u32) -> Self {
        let mut dirs = HashSet::new();
        dirs.insert(RemotePath::root());

        Self {
            user,
            files: RefCell::new(HashMap::new()),
            dirs: RefCell::new(dirs),
            replication,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    fn is_dir(&self, path: &RemotePath) -> bool {
        self.dirs.borrow().contains(path)
    }

    fn is_file(&self, path: &RemotePath) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn exists(&self, path: &RemotePath) -> bool {
        self.is_dir(path) || self.is_file(path)
    }

    fn require_parent_dir(&self, path: &RemotePath) -> StoreResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::InvalidPath("root has no parent".to_string()))?;
        if !self.is_dir(&parent) {
            return Err(StoreError::ParentMissing(parent.to_string()));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn create_file(&self, path: &RemotePath, content: &[u8], overwrite: bool) -> StoreResult<()> {
        self.require_parent_dir(path)?;

        if self.is_dir(path) {
            return Err(StoreError::IsADirectory(path.to_string()));
        }
        if self.is_file(path) && !overwrite {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }

        self.files.borrow_mut().insert(
            path.clone(),
            FileNode {
                content: content.to_vec(),
                replication: self.replication,
            },
        );
        trace!(path = %path, bytes = content.len(), "created file");
        Ok(())
    }

    fn open_file(&self, path: &RemotePath) -> StoreResult<Box<dyn Read>> {
        if self.is_dir(path) {
            return Err(StoreError::IsADirectory(path.to_string()));
        }
        let files = self.files.borrow();
        let node = files
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        Ok(Box::new(Cursor::new(node.content.clone())))
    }

    fn rename(&self, old: &RemotePath, new: &RemotePath) -> StoreResult<()> {
        if !self.exists(old) {
            return Err(StoreError::NotFound(old.to_string()));
        }
        if self.exists(new) {
            return Err(StoreError::AlreadyExists(new.to_string()));
        }
        self.require_parent_dir(new)?;

        if self.is_file(old) {
            let mut files = self.files.borrow_mut();
            let node = files.remove(old).expect("checked above");
            files.insert(new.clone(), node);
        } else {
            // Directory rename rekeys the whole subtree.
            if new.starts_under(old) {
                return Err(StoreError::InvalidPath(format!(
                    "cannot move {} under itself",
                    old
                )));
            }

            let rekey = |path: &RemotePath| -> RemotePath {
                if path == old {
                    new.clone()
                } else {
                    let suffix = &path.as_str()[old.as_str().len()..];
                    RemotePath::new(format!("{}{}", new.as_str(), suffix))
                        .expect("rekeyed path is valid")
                }
            };

            let mut dirs = self.dirs.borrow_mut();
            let moved_dirs: Vec<RemotePath> = dirs
                .iter()
                .filter(|d| d.starts_under(old))
                .cloned()
                .collect();
            for dir in moved_dirs {
                dirs.remove(&dir);
                dirs.insert(rekey(&dir));
            }

            let mut files = self.files.borrow_mut();
            let moved_files: Vec<RemotePath> = files
                .keys()
                .filter(|f| f.starts_under(old))
                .cloned()
                .collect();
            for file in moved_files {
                let node = files.remove(&file).expect("key just collected");
                files.insert(rekey(&file), node);
            }
        }

        trace!(old = %old, new = %new, "renamed");
        Ok(())
    }

    fn remove(&self, path: &RemotePath, recursive: bool) -> StoreResult<()> {
        if path.is_root() {
            return Err(StoreError::InvalidPath(
                "cannot remove the root directory".to_string(),
            ));
        }

        if self.is_file(path) {
            self.files.borrow_mut().remove(path);
            trace!(path = %path, "removed file");
            return Ok(());
        }

        if !self.is_dir(path) {
            return Err(StoreError::NotFound(path.to_string()));
        }

        let has_children = {
            let dirs = self.dirs.borrow();
            let files = self.files.borrow();
            dirs.iter().any(|d| d != path && d.starts_under(path))
                || files.keys().any(|f| f.starts_under(path))
        };

        if has_children && !recursive {
            return Err(StoreError::NotEmpty(path.to_string()));
        }

        self.dirs.borrow_mut().retain(|d| !d.starts_under(path));
        self.files.borrow_mut().retain(|f, _| !f.starts_under(path));
        trace!(path = %path, recursive, "removed directory");
        Ok(())
    }

    fn mkdir(&self, path: &RemotePath) -> StoreResult<()> {
        if self.exists(path) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        self.require_parent_dir(path)?;
        self.dirs.borrow_mut().insert(path.clone());
        trace!(path = %path, "created directory");
        Ok(())
    }

    fn list(&self, path: &RemotePath) -> StoreResult<Vec<FileEntry>> {
        if self.is_file(path) {
            return Err(StoreError::NotADirectory(path.to_string()));
        }
        if !self.is_dir(path) {
            return Err(StoreError::NotFound(path.to_string()));
        }

        let mut entries = Vec::new();

        for dir in self.dirs.borrow().iter() {
            if dir.is_child_of(path) {
                entries.push(FileEntry {
                    path: dir.to_string(),
                    is_dir: true,
                    len: 0,
                    replication: 0,
                });
            }
        }
        for (file, node) in self.files.borrow().iter() {
            if file.is_child_of(path) {
                entries.push(FileEntry {
                    path: file.to_string(),
                    is_dir: false,
                    len: node.content.len() as u64,
                    replication: node.replication,
                });
            }
        }

        // HashMap iteration order is arbitrary; keep listings stable.
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn stat(&self, path: &RemotePath) -> StoreResult<FileEntry> {
        if self.is_dir(path) {
            return Ok(FileEntry {
                path: path.to_string(),
                is_dir: true,
                len: 0,
                replication: 0,
            });
        }
        let files = self.files.borrow();
        let node = files
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        Ok(FileEntry {
            path: path.to_string(),
            is_dir: false,
            len: node.content.len() as u64,
            replication: node.replication,
        })
    }
}
