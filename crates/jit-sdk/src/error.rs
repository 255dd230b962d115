use std::path::PathBuf;

use jit_store::ObjectKind;
use jit_types::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("repository already exists at {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("not a repository: {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("file name is not valid UTF-8: {}", path.display())]
    InvalidFileName { path: PathBuf },

    #[error("object {id} is a {actual}, expected a {expected}")]
    UnexpectedObject {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] jit_store::StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] jit_refs::RefError),
}

impl SdkError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
