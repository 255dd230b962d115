//! File-backed head pointer.
//!
//! On-disk format: the 40-character hex digest followed by a newline, or an
//! empty file before the first commit.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jit_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::traits::RefStore;

/// Permission bits of the head file after an update.
#[cfg(unix)]
const HEAD_MODE: u32 = 0o644;

/// [`RefStore`] backed by a single `HEAD` file.
#[derive(Clone, Debug)]
pub struct FileRefStore {
    path: PathBuf,
}

impl FileRefStore {
    /// Use the head file at `path`. The file is not touched until read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create an empty head file, failing if one already exists.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(RefError::AlreadyExists { path })
            }
            Err(source) => Err(RefError::Io {
                op: "create",
                path,
                source,
            }),
        }
    }

    /// Path of the head file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, op: &'static str, source: io::Error) -> RefError {
        RefError::Io {
            op,
            path: self.path.clone(),
            source,
        }
    }
}

impl RefStore for FileRefStore {
    fn head(&self) -> Result<Option<ObjectId>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RefError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(self.io_error("read", e)),
        };

        let digest = contents.trim();
        if digest.is_empty() {
            return Ok(None);
        }
        let id = ObjectId::from_hex(digest).map_err(|e| RefError::InvalidHead {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(id))
    }

    fn update_head(&self, id: &ObjectId) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| self.io_error("create temporary head for", e))?;
        writeln!(tmp, "{id}").map_err(|e| self.io_error("write", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(HEAD_MODE))
                .map_err(|e| self.io_error("set permissions on", e))?;
        }
        tmp.persist(&self.path)
            .map_err(|e| self.io_error("replace", e.error))?;

        debug!(head = %id, path = %self.path.display(), "head updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_means_no_commits() {
        let dir = TempDir::new().unwrap();
        let refs = FileRefStore::create(dir.path().join("HEAD")).unwrap();
        assert_eq!(refs.head().unwrap(), None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let refs = FileRefStore::new(dir.path().join("HEAD"));
        assert!(matches!(refs.head(), Err(RefError::NotFound { .. })));
    }

    #[test]
    fn create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("HEAD");
        fs::write(&path, "keep me").unwrap();
        assert!(matches!(
            FileRefStore::create(&path),
            Err(RefError::AlreadyExists { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn update_writes_hex_and_newline() {
        let dir = TempDir::new().unwrap();
        let refs = FileRefStore::create(dir.path().join("HEAD")).unwrap();
        let id = ObjectId::from_hash([0xab; 20]);
        refs.update_head(&id).unwrap();

        assert_eq!(
            fs::read_to_string(refs.path()).unwrap(),
            format!("{}\n", id.to_hex())
        );
        assert_eq!(refs.head().unwrap(), Some(id));
    }

    #[test]
    fn update_overwrites_previous_head() {
        let dir = TempDir::new().unwrap();
        let refs = FileRefStore::create(dir.path().join("HEAD")).unwrap();
        refs.update_head(&ObjectId::from_hash([1; 20])).unwrap();
        refs.update_head(&ObjectId::from_hash([2; 20])).unwrap();
        assert_eq!(refs.head().unwrap(), Some(ObjectId::from_hash([2; 20])));
    }

    #[cfg(unix)]
    #[test]
    fn updated_head_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let refs = FileRefStore::create(dir.path().join("HEAD")).unwrap();
        refs.update_head(&ObjectId::from_hash([3; 20])).unwrap();
        let mode = fs::metadata(refs.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, HEAD_MODE);
    }

    #[test]
    fn garbage_head_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("HEAD");
        fs::write(&path, "ref: refs/heads/main\n").unwrap();
        let refs = FileRefStore::new(&path);
        assert!(matches!(refs.head(), Err(RefError::InvalidHead { .. })));
    }
}
