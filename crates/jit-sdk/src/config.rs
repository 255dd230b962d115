use jit_types::{Signature, Timestamp};
use serde::{Deserialize, Serialize};

/// Author name used when neither `GIT_AUTHOR_NAME` nor `USER` is set.
pub const DEFAULT_AUTHOR_NAME: &str = "jit";

/// Host part of the fallback email address.
pub const DEFAULT_EMAIL_HOST: &str = "localhost";

/// Author and committer identity recorded on new commits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Resolve the identity from the process environment.
    ///
    /// Name: `GIT_AUTHOR_NAME`, then `USER`, then [`DEFAULT_AUTHOR_NAME`].
    /// Email: `GIT_AUTHOR_EMAIL`, then `<name>@localhost`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the identity through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let name = non_empty("GIT_AUTHOR_NAME")
            .or_else(|| non_empty("USER"))
            .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string());
        let email = non_empty("GIT_AUTHOR_EMAIL")
            .unwrap_or_else(|| format!("{name}@{DEFAULT_EMAIL_HOST}"));
        Self { name, email }
    }

    /// Stamp this identity with a time.
    pub fn signature(&self, when: Timestamp) -> Signature {
        Signature::new(&self.name, &self.email, when)
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new(
            DEFAULT_AUTHOR_NAME,
            format!("{DEFAULT_AUTHOR_NAME}@{DEFAULT_EMAIL_HOST}"),
        )
    }
}

/// Order in which working-directory files become tree entries.
///
/// The tree digest depends on entry order, so `Listing` can produce
/// different digests for the same content on different platforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrder {
    /// Keep whatever order the directory listing returns.
    #[default]
    Listing,
    /// Sort entries by file name bytes.
    Sorted,
}

/// Configuration for a repository handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Identity written to `author` and `committer` lines.
    pub identity: Identity,
    /// Tree entry ordering policy.
    pub entry_order: EntryOrder,
    /// zlib level (0..=9) for new objects.
    pub compression: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            entry_order: EntryOrder::default(),
            compression: jit_store::fs::DEFAULT_COMPRESSION,
        }
    }
}

impl RepositoryConfig {
    /// Defaults with the identity resolved from the environment.
    pub fn from_env() -> Self {
        Self {
            identity: Identity::from_env(),
            ..Default::default()
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_entry_order(mut self, order: EntryOrder) -> Self {
        self.entry_order = order;
        self
    }
}

/// Source of commit timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in the local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock frozen at one instant, for reproducible commits.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
