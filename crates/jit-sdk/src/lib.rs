//! High-level repository API for jit.
//!
//! Provides the two operations a front end needs (create a repository and
//! commit the working directory) plus typed read-back of stored objects.
//!
//! ```no_run
//! use jit_sdk::{Repository, RepositoryConfig};
//!
//! let repo = Repository::initialize("demo", RepositoryConfig::from_env())?;
//! let id = repo.commit("first")?;
//! println!("{id}");
//! # Ok::<(), jit_sdk::SdkError>(())
//! ```

pub mod config;
pub mod error;
pub mod repository;
pub mod snapshot;

pub use config::{Clock, EntryOrder, FixedClock, Identity, RepositoryConfig, SystemClock};
pub use error::{SdkError, SdkResult};
pub use repository::{LogEntry, Repository, GIT_DIR};

// Re-export key types
pub use jit_store::{Blob, Commit, Object, ObjectKind, Tree, TreeEntry};
pub use jit_types::{ObjectId, Signature, Timestamp};
