//! Head pointer management for jit.
//!
//! The head pointer is the single mutable piece of repository state: it
//! holds the digest of the most recent commit, or nothing before the first
//! commit. Only commit creation moves it.
//!
//! # Modules
//!
//! - [`error`] — Error types for ref operations
//! - [`traits`] — The [`RefStore`] trait defining the storage interface
//! - [`file`] — [`FileRefStore`], backed by `.git/HEAD`
//! - [`memory`] — In-memory [`InMemoryRefStore`] for tests

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{RefError, Result};
pub use file::FileRefStore;
pub use memory::InMemoryRefStore;
pub use traits::RefStore;
