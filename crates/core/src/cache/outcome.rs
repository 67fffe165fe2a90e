//! Results of cache reads and writes.
//!
//! A disabled cache is not an error: callers get `Disabled` and carry on
//! with uncached computation.

use serde::Serialize;

/// Result of a cache read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Lookup<T> {
    Hit(T),
    Miss,
    /// Caching is switched off; nothing was read.
    Disabled,
}

impl<T> Lookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Lookup::Disabled)
    }

    /// The cached value, if any.
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Disabled => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::Hit(value) => Lookup::Hit(f(value)),
            Lookup::Miss => Lookup::Miss,
            Lookup::Disabled => Lookup::Disabled,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Lookup::Miss, Lookup::Hit)
    }
}

/// Result of a cache write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Applied,
    /// Delete or expire targeted a key that does not exist.
    Missing,
    /// Caching is switched off; nothing was written.
    Disabled,
}

impl WriteOutcome {
    pub fn is_disabled(&self) -> bool {
        matches!(self, WriteOutcome::Disabled)
    }
}

impl From<bool> for WriteOutcome {
    fn from(existed: bool) -> Self {
        if existed {
            WriteOutcome::Applied
        } else {
            WriteOutcome::Missing
        }
    }
}
