//! The namespace oracle boundary.
//!
//! The oracle models the host analysis environment's symbol table: an
//! authoritative, mutable namespace that may gain entries outside this
//! system's awareness. It is injected as a capability so synthesis is fully
//! unit-testable against [`MockNamespaceOracle`], an in-memory taken-set.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use thiserror::Error;

/// The oracle could not be reached.
///
/// Fatal to the symbol in progress; surfaced immediately and never retried
/// here. The caller may re-invoke the whole query if it wants a retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("namespace oracle unavailable: {detail}")]
pub struct NamespaceUnavailable {
    /// What the oracle reported, verbatim.
    pub detail: String,
}

/// A bind against the namespace failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BindError {
    /// The name was already bound. Bindings are never overwritten.
    #[error("name '{name}' is already bound")]
    NameTaken {
        /// The name that was already present.
        name: String,
    },

    /// The oracle could not be reached.
    #[error(transparent)]
    NamespaceUnavailable(#[from] NamespaceUnavailable),
}

/// External authority over the symbol namespace.
///
/// The oracle is authoritative and live: entries may appear between two
/// queries, so a suffix search must re-check every candidate against current
/// oracle state rather than a cached snapshot.
///
/// # Contract for concurrent implementors
///
/// The supported usage is single-threaded and sequential. An implementation
/// shared across threads must serialize check-then-bind as one atomic unit
/// per name (test-and-set semantics); nothing in this crate provides that
/// atomicity.
pub trait NamespaceOracle {
    /// Reports whether `candidate` is already bound in the namespace.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceUnavailable`] if the namespace cannot be queried.
    fn is_name_taken(&self, candidate: &str) -> Result<bool, NamespaceUnavailable>;

    /// Binds `name` to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::NameTaken`] if `name` is already bound, or
    /// [`BindError::NamespaceUnavailable`] if the namespace cannot be
    /// reached. A successful bind is one-shot and non-reversible from this
    /// system's point of view.
    fn bind(&self, name: &str, value: u64) -> Result<(), BindError>;
}

/// In-memory oracle for tests and offline runs.
///
/// Holds a taken-set plus the bindings made through it, and records every
/// `is_name_taken` query so tests can assert which candidates were probed.
#[derive(Debug, Default)]
pub struct MockNamespaceOracle {
    inner: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    taken: BTreeSet<String>,
    bound: BTreeMap<String, u64>,
    queries: Vec<String>,
    unavailable: bool,
}

impl MockNamespaceOracle {
    /// Creates an oracle with an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an oracle that already holds the given names.
    #[must_use]
    pub fn with_taken<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let oracle = Self::new();
        {
            let mut state = oracle.inner.lock().expect("mock oracle lock");
            state.taken = names.into_iter().map(Into::into).collect();
        }
        oracle
    }

    /// Marks a name as taken without recording a binding value.
    pub fn mark_taken(&self, name: impl Into<String>) {
        self.inner
            .lock()
            .expect("mock oracle lock")
            .taken
            .insert(name.into());
    }

    /// Makes every subsequent oracle call fail with [`NamespaceUnavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().expect("mock oracle lock").unavailable = unavailable;
    }

    /// Every candidate probed via `is_name_taken`, in query order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.inner.lock().expect("mock oracle lock").queries.clone()
    }

    /// The value bound to `name`, if any binding went through this oracle.
    #[must_use]
    pub fn bound_value(&self, name: &str) -> Option<u64> {
        self.inner
            .lock()
            .expect("mock oracle lock")
            .bound
            .get(name)
            .copied()
    }
}

impl NamespaceOracle for MockNamespaceOracle {
    fn is_name_taken(&self, candidate: &str) -> Result<bool, NamespaceUnavailable> {
        let mut state = self.inner.lock().expect("mock oracle lock");
        if state.unavailable {
            return Err(NamespaceUnavailable {
                detail: "mock oracle marked unavailable".to_owned(),
            });
        }
        state.queries.push(candidate.to_owned());
        Ok(state.taken.contains(candidate) || state.bound.contains_key(candidate))
    }

    fn bind(&self, name: &str, value: u64) -> Result<(), BindError> {
        let mut state = self.inner.lock().expect("mock oracle lock");
        if state.unavailable {
            return Err(NamespaceUnavailable {
                detail: "mock oracle marked unavailable".to_owned(),
            }
            .into());
        }
        // Test-and-set: check and insert under one lock.
        if state.taken.contains(name) || state.bound.contains_key(name) {
            return Err(BindError::NameTaken {
                name: name.to_owned(),
            });
        }
        state.bound.insert(name.to_owned(), value);
        Ok(())
    }
}
