//! The [`RefStore`] trait defining the head pointer interface.

use jit_types::ObjectId;

use crate::error::Result;

/// Storage backend for the head pointer.
///
/// Updates are last-writer-wins; no compare-and-swap is offered, so two
/// concurrent commits against the same repository can lose an update.
pub trait RefStore: Send + Sync {
    /// Read the current head.
    ///
    /// Returns `Ok(None)` before the first commit.
    fn head(&self) -> Result<Option<ObjectId>>;

    /// Point the head at `id`.
    fn update_head(&self, id: &ObjectId) -> Result<()>;
}
