//! A directory-backed key-value store.

use std::path::PathBuf;
use std::{fs, io};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;

use crate::error::{PersistError, Result};
use crate::kv::KvStore;

/// One file per key under a root directory.
///
/// Any non-empty string is a valid key. Each key is stored in a file named by
/// its unpadded base64url encoding, so the file name never contains a path
/// separator or a dot segment and always lands directly under the root.
#[derive(Debug, Clone)]
pub struct DiskKv {
    root: PathBuf,
}

impl DiskKv {
    /// Open `root`, which must be an existing, writable directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let attr = fs::metadata(&root).map_err(|source| PersistError::RootPathInvalid {
            path: root.clone(),
            source,
        })?;

        if !attr.is_dir() {
            return Err(PersistError::RootPathInvalid {
                path: root,
                source: io::Error::other("root path must be a directory"),
            });
        }

        if attr.permissions().readonly() {
            return Err(PersistError::RootPathInvalid {
                path: root,
                source: io::Error::other("root directory must be writable"),
            });
        }

        match root.canonicalize() {
            Ok(root) => Ok(Self { root }),
            Err(source) => Err(PersistError::RootPathInvalid { path: root, source }),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn file_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(PersistError::InvalidKey {
                key: key.to_string(),
                reason: "key must not be empty",
            });
        }
        Ok(self.root.join(URL_SAFE_NO_PAD.encode(key)))
    }
}

impl KvStore for DiskKv {
    fn get(&mut self, key: &str) -> Result<Option<Bytes>> {
        let file = self.file_for(key)?;
        match fs::read(&file) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Io { path: file, source }),
        }
    }

    fn set(&mut self, key: &str, data: Bytes) -> Result<()> {
        let file = self.file_for(key)?;
        tracing::debug!(path = %file.display(), bytes = data.len(), "writing key");
        fs::write(&file, &data).map_err(|source| PersistError::Io { path: file, source })
    }
}
