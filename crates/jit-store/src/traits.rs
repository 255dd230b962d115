use jit_types::ObjectId;

use crate::error::StoreResult;
use crate::object::{ObjectData, Stored, StoredObject};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same envelope always produces
///   the same ID, and an existing object is never rewritten.
/// - `write` is idempotent: storing byte-identical content twice performs no
///   second write.
/// - The store never interprets payloads beyond envelope framing.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op beyond hashing.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Load the raw, decompressed envelope stored under `id`.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if the
    /// object does not exist and
    /// [`StoreError::CorruptObject`](crate::StoreError::CorruptObject) if it
    /// cannot be decoded or fails verification.
    fn load(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read and decode the envelope stored under `id`.
    fn read(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        let envelope = self.load(id)?;
        StoredObject::decode_envelope(id, &envelope)
    }

    /// Persist a typed object and hand it back with its digest attached.
    fn store<T: ObjectData>(&self, object: T) -> StoreResult<Stored<T>>
    where
        Self: Sized,
    {
        let id = self.write(&object.to_stored_object())?;
        Ok(Stored::new(object, id))
    }
}
