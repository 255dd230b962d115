use std::ops::Deref;

use jit_crypto::ContentHasher;
use jit_types::{ObjectId, Signature};

use crate::error::{StoreError, StoreResult};

/// Mode token written for every tree entry. Trees are flat and hold regular
/// files only.
pub const REGULAR_FILE_MODE: &str = "100644";

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw content (file contents).
    Blob,
    /// Flat directory listing: ordered entries mapping names to blob ids.
    Tree,
    /// Snapshot reference with parent link, identity, and message.
    Commit,
}

impl ObjectKind {
    /// The tag written verbatim into the envelope header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// Parse an envelope tag.
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"blob" => Some(Self::Blob),
            b"tree" => Some(Self::Tree),
            b"commit" => Some(Self::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviour shared by every object variant: a fixed kind tag and a pure,
/// canonical serialization of the logical contents.
pub trait ObjectData {
    /// The kind tag of this object.
    fn kind(&self) -> ObjectKind;

    /// Canonical payload bytes (the envelope minus its header).
    fn serialize(&self) -> Vec<u8>;

    /// Convert into a `StoredObject` for storage.
    fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(self.kind(), self.serialize())
    }
}

/// A stored object: kind tag + serialized payload + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// payload; it only frames, hashes, and compresses it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The serialized payload bytes.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and payload.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID: SHA-1 over the full envelope.
    pub fn compute_id(&self) -> ObjectId {
        ContentHasher::hash_object(self.kind.as_str(), &self.data)
    }

    /// The exact bytes that are hashed and compressed:
    /// `<kind> <len>\0<payload>`.
    pub fn envelope(&self) -> Vec<u8> {
        let mut envelope = ContentHasher::header(self.kind.as_str(), self.data.len());
        envelope.extend_from_slice(&self.data);
        envelope
    }

    /// Decode and validate an envelope that was stored under `id`.
    ///
    /// Fails with [`StoreError::CorruptObject`] when the header is malformed,
    /// the declared length disagrees with the payload, or the envelope does
    /// not hash to `id`.
    pub fn decode_envelope(id: &ObjectId, envelope: &[u8]) -> StoreResult<Self> {
        let nul = envelope
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| StoreError::corrupt(*id, "missing header terminator"))?;
        let header = &envelope[..nul];
        let payload = &envelope[nul + 1..];

        let space = header
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| StoreError::corrupt(*id, "malformed header"))?;
        let kind = ObjectKind::from_tag(&header[..space]).ok_or_else(|| {
            StoreError::corrupt(
                *id,
                format!("unknown kind {:?}", String::from_utf8_lossy(&header[..space])),
            )
        })?;

        let len_field = &header[space + 1..];
        if len_field.is_empty() || !len_field.iter().all(u8::is_ascii_digit) {
            return Err(StoreError::corrupt(*id, "malformed length field"));
        }
        let declared: usize = std::str::from_utf8(len_field)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| StoreError::corrupt(*id, "malformed length field"))?;
        if declared != payload.len() {
            return Err(StoreError::corrupt(
                *id,
                format!(
                    "length mismatch: header declares {declared}, payload has {}",
                    payload.len()
                ),
            ));
        }

        if !ContentHasher::verify(envelope, id) {
            return Err(StoreError::corrupt(
                *id,
                format!("digest mismatch: content hashes to {}", ContentHasher::hash_envelope(envelope)),
            ));
        }

        Ok(Self::new(kind, payload.to_vec()))
    }

    fn expect_kind(&self, expected: ObjectKind) -> StoreResult<()> {
        if self.kind != expected {
            return Err(StoreError::corrupt(
                self.compute_id(),
                format!("expected {expected}, got {}", self.kind),
            ));
        }
        Ok(())
    }
}

/// An object that has been persisted and carries its digest.
///
/// Plain `Blob`/`Tree`/`Commit` values are unstored; the only way to obtain
/// a `Stored<T>` is through [`ObjectStore::store`](crate::ObjectStore::store),
/// so the digest is assigned exactly once and cannot be reassigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stored<T> {
    object: T,
    id: ObjectId,
}

impl<T> Stored<T> {
    pub(crate) fn new(object: T, id: ObjectId) -> Self {
        Self { object, id }
    }

    /// The digest assigned when the object was stored.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn object(&self) -> &T {
        &self.object
    }

    pub fn into_inner(self) -> T {
        self.object
    }
}

impl<T> Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.object
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object. The payload is the content, unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

impl ObjectData for Blob {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Blob
    }

    fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// File name; always a single path component.
    pub name: String,
    /// Content-addressed ID of the referenced blob.
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry, rejecting names that are not a single
    /// path component.
    pub fn new(name: impl Into<String>, object_id: ObjectId) -> StoreResult<Self> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("empty name")
        } else if name == "." || name == ".." {
            Some("relative path component")
        } else if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
            Some("contains a path separator")
        } else if name.contains('\0') {
            Some("contains a NUL byte")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(StoreError::InvalidEntryName { name, reason });
        }
        Ok(Self { name, object_id })
    }
}

/// Flat directory listing object.
///
/// Entries are serialized in insertion order; the digest depends on it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries, preserving their order.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Tree)?;
        let corrupt = |reason: &str| StoreError::corrupt(obj.compute_id(), reason);

        let mut entries = Vec::new();
        let mut rest = obj.data.as_slice();
        while !rest.is_empty() {
            let space = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| corrupt("tree entry missing mode"))?;
            if &rest[..space] != REGULAR_FILE_MODE.as_bytes() {
                return Err(corrupt("unsupported tree entry mode"));
            }
            rest = &rest[space + 1..];

            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| corrupt("tree entry missing name terminator"))?;
            let name = std::str::from_utf8(&rest[..nul])
                .map_err(|_| corrupt("tree entry name is not UTF-8"))?;
            rest = &rest[nul + 1..];

            if rest.len() < jit_types::object::DIGEST_LEN {
                return Err(corrupt("truncated tree entry digest"));
            }
            let (digest, tail) = rest.split_at(jit_types::object::DIGEST_LEN);
            let object_id =
                ObjectId::from_slice(digest).map_err(|e| corrupt(&e.to_string()))?;
            let entry = TreeEntry::new(name, object_id).map_err(|e| corrupt(&e.to_string()))?;
            entries.push(entry);
            rest = tail;
        }
        Ok(Self { entries })
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ObjectData for Tree {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Tree
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(REGULAR_FILE_MODE.as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.name.as_bytes());
            out.push(0);
            out.extend_from_slice(entry.object_id.as_bytes());
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Commit object: a tree snapshot linked to its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub tree: ObjectId,
    /// Previous head; `None` for the first commit.
    pub parent: Option<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    /// Create a commit whose author and committer are the same signature.
    pub fn new(
        tree: ObjectId,
        parent: Option<ObjectId>,
        signature: Signature,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parent,
            author: signature.clone(),
            committer: signature,
            message: message.into(),
        }
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        let corrupt = |reason: String| StoreError::corrupt(obj.compute_id(), reason);

        let text = std::str::from_utf8(&obj.data)
            .map_err(|_| corrupt("commit is not UTF-8".into()))?;
        let (headers, message) = text
            .split_once("\n\n")
            .ok_or_else(|| corrupt("commit missing header terminator".into()))?;

        let mut tree: Option<ObjectId> = None;
        let mut parent: Option<ObjectId> = None;
        let mut author: Option<Signature> = None;
        let mut committer: Option<Signature> = None;
        for line in headers.lines() {
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| corrupt(format!("malformed header line {line:?}")))?;
            match key {
                "tree" => {
                    tree = Some(value.parse().map_err(|e| corrupt(format!("tree: {e}")))?)
                }
                "parent" => {
                    parent = Some(value.parse().map_err(|e| corrupt(format!("parent: {e}")))?)
                }
                "author" => {
                    author = Some(value.parse().map_err(|e| corrupt(format!("author: {e}")))?)
                }
                "committer" => {
                    committer =
                        Some(value.parse().map_err(|e| corrupt(format!("committer: {e}")))?)
                }
                other => return Err(corrupt(format!("unexpected header {other:?}"))),
            }
        }

        Ok(Self {
            tree: tree.ok_or_else(|| corrupt("missing tree header".into()))?,
            parent,
            author: author.ok_or_else(|| corrupt("missing author header".into()))?,
            committer: committer.ok_or_else(|| corrupt("missing committer header".into()))?,
            message: message.to_string(),
        })
    }
}

impl ObjectData for Commit {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Commit
    }

    fn serialize(&self) -> Vec<u8> {
        let mut text = format!("tree {}\n", self.tree);
        if let Some(parent) = &self.parent {
            text.push_str(&format!("parent {parent}\n"));
        }
        text.push_str(&format!("author {}\n", self.author));
        text.push_str(&format!("committer {}\n", self.committer));
        text.push('\n');
        text.push_str(&self.message);
        text.into_bytes()
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// Any object variant, as returned when reading by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// Decode whichever variant the stored kind names.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        Ok(match obj.kind {
            ObjectKind::Blob => Self::Blob(Blob::from_stored_object(obj)?),
            ObjectKind::Tree => Self::Tree(Tree::from_stored_object(obj)?),
            ObjectKind::Commit => Self::Commit(Commit::from_stored_object(obj)?),
        })
    }
}

impl ObjectData for Object {
    fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(b) => b.kind(),
            Self::Tree(t) => t.kind(),
            Self::Commit(c) => c.kind(),
        }
    }

    fn serialize(&self) -> Vec<u8> {
        match self {
            Self::Blob(b) => b.serialize(),
            Self::Tree(t) => t.serialize(),
            Self::Commit(c) => c.serialize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jit_types::Timestamp;
    use proptest::prelude::*;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 20])
    }

    fn signature() -> Signature {
        Signature::new("Jane Doe", "jane@example.com", Timestamp::new(1_700_000_000, 60))
    }

    #[test]
    fn blob_serialize_is_identity() {
        let blob = Blob::new(b"hello world".to_vec());
        assert_eq!(blob.serialize(), b"hello world");
        assert_eq!(blob.kind(), ObjectKind::Blob);
    }

    #[test]
    fn blob_roundtrip() {
        let blob = Blob::new(b"hello world".to_vec());
        let stored = blob.to_stored_object();
        assert_eq!(Blob::from_stored_object(&stored).unwrap(), blob);
    }

    #[test]
    fn blob_kind_mismatch() {
        let stored = StoredObject::new(ObjectKind::Tree, Vec::new());
        let err = Blob::from_stored_object(&stored).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn envelope_layout() {
        let stored = Blob::new(b"hello".to_vec()).to_stored_object();
        assert_eq!(stored.envelope(), b"blob 5\0hello");
        assert_eq!(stored.size, 5);
    }

    #[test]
    fn compute_id_matches_git() {
        let stored = Blob::new(b"hello".to_vec()).to_stored_object();
        assert_eq!(
            stored.compute_id().to_hex(),
            "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0"
        );
    }

    #[test]
    fn tree_serialization_layout() {
        let tree = Tree::new(vec![
            TreeEntry::new("a.txt", id(1)).unwrap(),
            TreeEntry::new("b.txt", id(2)).unwrap(),
        ]);
        let mut expected = b"100644 a.txt\0".to_vec();
        expected.extend_from_slice(&[1; 20]);
        expected.extend_from_slice(b"100644 b.txt\0");
        expected.extend_from_slice(&[2; 20]);
        assert_eq!(tree.serialize(), expected);
    }

    #[test]
    fn tree_preserves_insertion_order() {
        let tree = Tree::new(vec![
            TreeEntry::new("zebra.txt", id(1)).unwrap(),
            TreeEntry::new("alpha.txt", id(2)).unwrap(),
        ]);
        assert_eq!(tree.entries[0].name, "zebra.txt");
        assert_eq!(tree.entries[1].name, "alpha.txt");
    }

    #[test]
    fn tree_order_changes_digest() {
        let a = TreeEntry::new("a.txt", id(1)).unwrap();
        let b = TreeEntry::new("b.txt", id(2)).unwrap();
        let forward = Tree::new(vec![a.clone(), b.clone()]).to_stored_object();
        let reversed = Tree::new(vec![b, a]).to_stored_object();
        assert_ne!(forward.compute_id(), reversed.compute_id());
    }

    #[test]
    fn tree_roundtrip() {
        let tree = Tree::new(vec![
            TreeEntry::new("file.txt", id(9)).unwrap(),
            TreeEntry::new("notes.md", id(8)).unwrap(),
        ]);
        let decoded = Tree::from_stored_object(&tree.to_stored_object()).unwrap();
        assert_eq!(decoded, tree);
        assert!(decoded.get("notes.md").is_some());
        assert!(decoded.get("missing").is_none());
        assert_eq!(decoded.len(), 2);
    }

    #[test]
    fn tree_truncated_digest_is_corrupt() {
        let mut data = b"100644 a.txt\0".to_vec();
        data.extend_from_slice(&[1; 10]);
        let stored = StoredObject::new(ObjectKind::Tree, data);
        assert!(matches!(
            Tree::from_stored_object(&stored),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn stored_tree_with_bad_entry_name_is_corrupt() {
        let mut data = b"100644 dir/file\0".to_vec();
        data.extend_from_slice(&[1; 20]);
        let stored = StoredObject::new(ObjectKind::Tree, data);
        assert!(matches!(
            Tree::from_stored_object(&stored),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn empty_tree() {
        let tree = Tree::empty();
        assert!(tree.is_empty());
        assert!(tree.serialize().is_empty());
    }

    #[test]
    fn entry_name_validation() {
        assert!(TreeEntry::new("ok.txt", id(0)).is_ok());
        for bad in ["", ".", "..", "dir/file", "nul\0byte"] {
            assert!(
                matches!(
                    TreeEntry::new(bad, id(0)),
                    Err(StoreError::InvalidEntryName { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn root_commit_has_no_parent_line() {
        let commit = Commit::new(id(1), None, signature(), "first");
        let text = String::from_utf8(commit.serialize()).unwrap();
        let expected = format!(
            "tree {}\n\
             author Jane Doe <jane@example.com> 1700000000 +0100\n\
             committer Jane Doe <jane@example.com> 1700000000 +0100\n\
             \n\
             first",
            id(1)
        );
        assert_eq!(text, expected);
        assert!(!text.contains("parent"));
    }

    #[test]
    fn child_commit_has_parent_as_second_line() {
        let commit = Commit::new(id(1), Some(id(2)), signature(), "second");
        let text = String::from_utf8(commit.serialize()).unwrap();
        let second_line = text.lines().nth(1).unwrap();
        assert_eq!(second_line, format!("parent {}", id(2)));
    }

    #[test]
    fn commit_roundtrip() {
        let commit = Commit::new(id(1), Some(id(2)), signature(), "multi\n\nline message\n");
        let decoded = Commit::from_stored_object(&commit.to_stored_object()).unwrap();
        assert_eq!(decoded, commit);
    }

    #[test]
    fn commit_with_empty_message_roundtrips() {
        let commit = Commit::new(id(3), None, signature(), "");
        let decoded = Commit::from_stored_object(&commit.to_stored_object()).unwrap();
        assert_eq!(decoded.message, "");
    }

    #[test]
    fn commit_missing_tree_is_corrupt() {
        let data = b"author a <b> 1 +0000\ncommitter a <b> 1 +0000\n\nmsg".to_vec();
        let stored = StoredObject::new(ObjectKind::Commit, data);
        assert!(matches!(
            Commit::from_stored_object(&stored),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn object_dispatches_on_kind() {
        let stored = Commit::new(id(1), None, signature(), "x").to_stored_object();
        match Object::from_stored_object(&stored).unwrap() {
            Object::Commit(c) => assert_eq!(c.message, "x"),
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn decode_envelope_roundtrip() {
        let stored = Blob::new(b"payload".to_vec()).to_stored_object();
        let id = stored.compute_id();
        let decoded = StoredObject::decode_envelope(&id, &stored.envelope()).unwrap();
        assert_eq!(decoded, stored);
    }

    #[test]
    fn decode_envelope_rejects_length_mismatch() {
        let envelope = b"blob 9\0short".to_vec();
        let id = ContentHasher::hash_envelope(&envelope);
        let err = StoredObject::decode_envelope(&id, &envelope).unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn decode_envelope_rejects_unknown_kind() {
        let envelope = b"tag 0\0".to_vec();
        let id = ContentHasher::hash_envelope(&envelope);
        assert!(StoredObject::decode_envelope(&id, &envelope).is_err());
    }

    #[test]
    fn decode_envelope_rejects_wrong_digest() {
        let envelope = b"blob 2\0hi".to_vec();
        let err = StoredObject::decode_envelope(&id(0), &envelope).unwrap_err();
        assert!(err.to_string().contains("digest mismatch"));
    }

    #[test]
    fn object_kind_display() {
        assert_eq!(ObjectKind::Blob.to_string(), "blob");
        assert_eq!(ObjectKind::Tree.to_string(), "tree");
        assert_eq!(ObjectKind::Commit.to_string(), "commit");
        assert_eq!(ObjectKind::from_tag(b"commit"), Some(ObjectKind::Commit));
        assert_eq!(ObjectKind::from_tag(b"pack"), None);
    }

    proptest! {
        #[test]
        fn id_is_sha1_of_envelope(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let stored = Blob::new(data.clone()).to_stored_object();
            let mut envelope = format!("blob {}\0", data.len()).into_bytes();
            envelope.extend_from_slice(&data);
            prop_assert_eq!(stored.compute_id(), ContentHasher::hash_envelope(&envelope));
        }

        #[test]
        fn flipping_a_byte_changes_id(
            data in proptest::collection::vec(any::<u8>(), 1..256),
            index in any::<proptest::sample::Index>(),
        ) {
            let original = Blob::new(data.clone()).to_stored_object().compute_id();
            let mut changed = data;
            let i = index.index(changed.len());
            changed[i] ^= 0x01;
            prop_assert_ne!(original, Blob::new(changed).to_stored_object().compute_id());
        }
    }
}
