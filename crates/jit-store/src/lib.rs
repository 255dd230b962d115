//! Content-addressed object model and object database for jit.
//!
//! Every piece of data -- file contents, directory listings, commits -- is
//! stored as an immutable object identified by the SHA-1 of its envelope
//! (`<kind> <len>\0<payload>`), analogous to git's `.git/objects/`.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw file content
//! - [`Tree`] -- flat, ordered listing of [`TreeEntry`] name/digest pairs
//! - [`Commit`] -- tree snapshot linked to its parent commit
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`FsObjectStore`] -- sharded, zlib-compressed loose objects on disk
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are write-once; an existing object is never rewritten or deleted.
//! 2. Storing identical content twice is a no-op on the second call.
//! 3. A digest is attached to an object only by storing it ([`Stored`]).
//! 4. All I/O errors are propagated with the path that failed.

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{
    Blob, Commit, Object, ObjectData, ObjectKind, Stored, StoredObject, Tree, TreeEntry,
    REGULAR_FILE_MODE,
};
pub use traits::ObjectStore;
