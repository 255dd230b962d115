use jit_types::ObjectId;
use sha1::{Digest, Sha1};

/// SHA-1 content hasher for object envelopes.
///
/// The envelope header is `<kind> <decimal payload length>\0`, followed by
/// the payload. Hashing the header together with the payload means a blob
/// and a tree with identical payload bytes never share an id.
pub struct ContentHasher;

impl ContentHasher {
    /// Build the envelope header for `kind` and a payload of `len` bytes.
    pub fn header(kind: &str, len: usize) -> Vec<u8> {
        format!("{kind} {len}\0").into_bytes()
    }

    /// Hash a payload under the given kind tag without materializing the
    /// full envelope.
    pub fn hash_object(kind: &str, payload: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(Self::header(kind, payload.len()));
        hasher.update(payload);
        ObjectId::from_hash(hasher.finalize().into())
    }

    /// Hash a complete envelope (header included).
    pub fn hash_envelope(envelope: &[u8]) -> ObjectId {
        ObjectId::from_hash(Sha1::digest(envelope).into())
    }

    /// Verify that an envelope produces the expected object ID.
    pub fn verify(envelope: &[u8], expected: &ObjectId) -> bool {
        Self::hash_envelope(envelope) == *expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_format() {
        assert_eq!(ContentHasher::header("blob", 5), b"blob 5\0".to_vec());
        assert_eq!(ContentHasher::header("commit", 0), b"commit 0\0".to_vec());
    }

    #[test]
    fn matches_known_git_blob_id() {
        // `printf hello | git hash-object --stdin`
        let id = ContentHasher::hash_object("blob", b"hello");
        assert_eq!(id.to_hex(), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
    }

    #[test]
    fn empty_blob_id() {
        let id = ContentHasher::hash_object("blob", b"");
        assert_eq!(id.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn streaming_and_envelope_hashes_agree() {
        let mut envelope = ContentHasher::header("tree", 3);
        envelope.extend_from_slice(b"abc");
        assert_eq!(
            ContentHasher::hash_object("tree", b"abc"),
            ContentHasher::hash_envelope(&envelope)
        );
    }

    #[test]
    fn kind_changes_digest() {
        assert_ne!(
            ContentHasher::hash_object("blob", b"same"),
            ContentHasher::hash_object("tree", b"same")
        );
    }

    #[test]
    fn verify_detects_tampering() {
        let envelope = b"blob 8\0original";
        let id = ContentHasher::hash_envelope(envelope);
        assert!(ContentHasher::verify(envelope, &id));
        assert!(!ContentHasher::verify(b"blob 8\0tampered", &id));
        assert_eq!(hex::encode(id.as_bytes()), id.to_hex());
    }
}
