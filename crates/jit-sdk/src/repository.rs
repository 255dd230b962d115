use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jit_refs::{FileRefStore, RefStore};
use jit_store::{Commit, FsObjectStore, Object, ObjectKind, ObjectStore};
use jit_types::ObjectId;
use tracing::info;

use crate::config::{Clock, RepositoryConfig, SystemClock};
use crate::error::{SdkError, SdkResult};
use crate::snapshot;

/// Name of the metadata directory inside the working directory.
pub const GIT_DIR: &str = ".git";

/// Directories created under the metadata directory by [`Repository::initialize`].
const SCAFFOLD_DIRS: [&str; 4] = ["branches", "objects", "refs/heads", "refs/tags"];

/// One commit in the history returned by [`Repository::log`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub id: ObjectId,
    pub commit: Commit,
}

/// Handle on a working directory and its `.git` metadata.
///
/// The handle holds no per-object state; every call goes to disk.
pub struct Repository {
    work_dir: PathBuf,
    git_dir: PathBuf,
    objects: FsObjectStore,
    refs: FileRefStore,
    config: RepositoryConfig,
    clock: Box<dyn Clock>,
}

impl Repository {
    /// Create the metadata directory under `path` and return a handle.
    ///
    /// `path` is created if needed. Fails with [`SdkError::AlreadyExists`]
    /// if `path/.git` already exists, leaving it untouched. Any other
    /// failure aborts initialization and names the path that failed.
    pub fn initialize(path: impl AsRef<Path>, config: RepositoryConfig) -> SdkResult<Self> {
        let work_dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&work_dir)
            .map_err(|e| SdkError::io("create working directory", &work_dir, e))?;

        let git_dir = work_dir.join(GIT_DIR);
        match fs::create_dir(&git_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(SdkError::AlreadyExists { path: git_dir })
            }
            Err(e) => return Err(SdkError::io("create", &git_dir, e)),
        }

        for dir in SCAFFOLD_DIRS {
            let path = git_dir.join(dir);
            fs::create_dir_all(&path).map_err(|e| SdkError::io("create", &path, e))?;
        }
        let description = git_dir.join("description");
        fs::write(&description, b"").map_err(|e| SdkError::io("create", &description, e))?;
        let refs = FileRefStore::create(git_dir.join("HEAD"))?;

        info!(path = %git_dir.display(), "initialized empty repository");
        Ok(Self::assemble(work_dir, git_dir, refs, config))
    }

    /// Open an existing repository rooted at `path`.
    pub fn open(path: impl AsRef<Path>, config: RepositoryConfig) -> SdkResult<Self> {
        let work_dir = path.as_ref().to_path_buf();
        let git_dir = work_dir.join(GIT_DIR);
        if !git_dir.join("HEAD").is_file() || !git_dir.join("objects").is_dir() {
            return Err(SdkError::NotARepository { path: work_dir });
        }
        let refs = FileRefStore::new(git_dir.join("HEAD"));
        Ok(Self::assemble(work_dir, git_dir, refs, config))
    }

    fn assemble(
        work_dir: PathBuf,
        git_dir: PathBuf,
        refs: FileRefStore,
        config: RepositoryConfig,
    ) -> Self {
        let objects =
            FsObjectStore::new(git_dir.join("objects")).with_compression(config.compression);
        Self {
            work_dir,
            git_dir,
            objects,
            refs,
            config,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock used to timestamp new commits.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // ---- Commit assembly ----

    /// Snapshot every top-level file into a new commit on top of the current
    /// head, then move the head to it.
    ///
    /// A failure part-way leaves only unreferenced objects behind; the head
    /// moves last.
    pub fn commit(&self, message: &str) -> SdkResult<ObjectId> {
        let tree =
            snapshot::snapshot_tree(&self.objects, &self.work_dir, self.config.entry_order)?;
        let parent = self.refs.head()?;
        let signature = self.config.identity.signature(self.clock.now());

        let commit = self
            .objects
            .store(Commit::new(tree.id(), parent, signature, message))?;
        self.refs.update_head(&commit.id())?;

        info!(
            commit = %commit.id(),
            tree = %tree.id(),
            parent = ?parent.map(|p| p.short_hex()),
            files = tree.len(),
            "created commit"
        );
        Ok(commit.id())
    }

    // ---- Retrieval ----

    /// The current head, or `None` before the first commit.
    pub fn head(&self) -> SdkResult<Option<ObjectId>> {
        Ok(self.refs.head()?)
    }

    /// Load and decode any object.
    pub fn read_object(&self, id: &ObjectId) -> SdkResult<Object> {
        let stored = self.objects.read(id)?;
        Ok(Object::from_stored_object(&stored)?)
    }

    /// Load an object that must be a commit.
    pub fn read_commit(&self, id: &ObjectId) -> SdkResult<Commit> {
        match self.read_object(id)? {
            Object::Commit(commit) => Ok(commit),
            other => Err(SdkError::UnexpectedObject {
                id: *id,
                expected: ObjectKind::Commit,
                actual: jit_store::ObjectData::kind(&other),
            }),
        }
    }

    /// Walk parent links from the head, newest first, up to `limit` commits.
    pub fn log(&self, limit: usize) -> SdkResult<Vec<LogEntry>> {
        let mut entries = Vec::new();
        let mut next = self.refs.head()?;
        while let Some(id) = next {
            if entries.len() >= limit {
                break;
            }
            let commit = self.read_commit(&id)?;
            next = commit.parent;
            entries.push(LogEntry { id, commit });
        }
        Ok(entries)
    }

    // ---- Accessors ----

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn objects(&self) -> &FsObjectStore {
        &self.objects
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("work_dir", &self.work_dir)
            .field("config", &self.config)
            .finish()
    }
}
