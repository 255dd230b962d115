//! Working-directory snapshots: files become blobs, blobs become a tree.

use std::fs;
use std::path::{Path, PathBuf};

use jit_store::{Blob, ObjectStore, Stored, Tree, TreeEntry};
use tracing::debug;

use crate::config::EntryOrder;
use crate::error::{SdkError, SdkResult};

/// List the regular files directly inside `work_dir`.
///
/// Subdirectories (including `.git`) and other non-regular entries are
/// skipped; the snapshot is flat.
pub fn list_files(work_dir: &Path, order: EntryOrder) -> SdkResult<Vec<(String, PathBuf)>> {
    let listing =
        fs::read_dir(work_dir).map_err(|e| SdkError::io("list directory", work_dir, e))?;

    let mut files = Vec::new();
    for entry in listing {
        let entry = entry.map_err(|e| SdkError::io("list directory", work_dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| SdkError::io("stat", &path, e))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| SdkError::InvalidFileName { path: path.clone() })?;
        files.push((name, path));
    }

    if order == EntryOrder::Sorted {
        files.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    }
    Ok(files)
}

/// Store every file in `work_dir` as a blob and return the entries in
/// `order`.
pub fn store_blobs<S: ObjectStore>(
    store: &S,
    work_dir: &Path,
    order: EntryOrder,
) -> SdkResult<Vec<TreeEntry>> {
    list_files(work_dir, order)?
        .into_iter()
        .map(|(name, path)| -> SdkResult<TreeEntry> {
            let data = fs::read(&path).map_err(|e| SdkError::io("read", &path, e))?;
            let blob = store.store(Blob::new(data))?;
            debug!(name = %name, id = %blob.id(), "snapshot blob");
            Ok(TreeEntry::new(name, blob.id())?)
        })
        .collect()
}

/// Snapshot `work_dir` into a stored tree.
pub fn snapshot_tree<S: ObjectStore>(
    store: &S,
    work_dir: &Path,
    order: EntryOrder,
) -> SdkResult<Stored<Tree>> {
    let entries = store_blobs(store, work_dir, order)?;
    Ok(store.store(Tree::new(entries))?)
}
