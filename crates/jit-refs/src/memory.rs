//! In-memory head pointer for testing and ephemeral use.

use std::sync::RwLock;

use jit_types::ObjectId;

use crate::error::Result;
use crate::traits::RefStore;

/// An in-memory implementation of [`RefStore`]. Data is lost when the store
/// is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    head: RwLock<Option<ObjectId>>,
}

impl InMemoryRefStore {
    /// Create a store with no commits.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefStore for InMemoryRefStore {
    fn head(&self) -> Result<Option<ObjectId>> {
        Ok(*self.head.read().expect("lock poisoned"))
    }

    fn update_head(&self, id: &ObjectId) -> Result<()> {
        *self.head.write().expect("lock poisoned") = Some(*id);
        Ok(())
    }
}
