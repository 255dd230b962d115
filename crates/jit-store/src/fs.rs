use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use jit_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Default zlib compression level.
pub const DEFAULT_COMPRESSION: u32 = 6;

/// Permission bits of a written object file. Objects are never modified.
#[cfg(unix)]
const OBJECT_MODE: u32 = 0o444;

/// Filesystem object store using the loose-object layout.
///
/// Each object lives at `<root>/<first 2 hex chars>/<remaining 38 hex chars>`
/// and contains the zlib-compressed envelope. Files are written once through
/// a temporary file in the shard directory and never rewritten.
#[derive(Clone, Debug)]
pub struct FsObjectStore {
    root: PathBuf,
    compression: Compression,
}

impl FsObjectStore {
    /// Open a store rooted at `root` (normally `.git/objects`).
    ///
    /// No directories are created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            compression: Compression::new(DEFAULT_COMPRESSION),
        }
    }

    /// Use the given zlib level (0..=9) for new objects.
    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    /// The object database root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The sharded path at which `id` is (or would be) stored.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.shard();
        self.root.join(dir).join(file)
    }

    fn compress(&self, envelope: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.compression);
        encoder.write_all(envelope)?;
        encoder.finish()
    }
}

impl ObjectStore for FsObjectStore {
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        let path = self.object_path(&id);

        if path
            .try_exists()
            .map_err(|e| StoreError::io("stat object", &path, e))?
        {
            debug!(id = %id, kind = %object.kind, "object already stored");
            return Ok(id);
        }

        let (dir, _) = id.shard();
        let shard = self.root.join(dir);
        fs::create_dir_all(&shard)
            .map_err(|e| StoreError::io("create shard directory", &shard, e))?;

        let compressed = self
            .compress(&object.envelope())
            .map_err(|e| StoreError::io("compress object", &path, e))?;

        let mut tmp = NamedTempFile::new_in(&shard)
            .map_err(|e| StoreError::io("create temporary object", &shard, e))?;
        tmp.write_all(&compressed)
            .map_err(|e| StoreError::io("write object", tmp.path().to_path_buf(), e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(OBJECT_MODE))
                .map_err(|e| StoreError::io("set permissions on", tmp.path().to_path_buf(), e))?;
        }

        match tmp.persist_noclobber(&path) {
            Ok(_) => {}
            // Another writer stored the same content first.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(StoreError::io("persist object", &path, e.error)),
        }

        debug!(id = %id, kind = %object.kind, size = object.size, "object written");
        Ok(id)
    }

    fn load(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id))
            }
            Err(e) => return Err(StoreError::io("read object", &path, e)),
        };

        let mut envelope = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut envelope)
            .map_err(|e| StoreError::corrupt(*id, format!("decompression failed: {e}")))?;

        StoredObject::decode_envelope(id, &envelope)?;
        Ok(envelope)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let path = self.object_path(id);
        path.try_exists()
            .map_err(|e| StoreError::io("stat object", &path, e))
    }
}
