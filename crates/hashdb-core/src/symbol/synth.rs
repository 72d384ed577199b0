//! Candidate sanitization and the suffix search.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::oracle::{NamespaceOracle, NamespaceUnavailable};

/// Base name substituted when sanitization is handed an empty candidate.
pub const PLACEHOLDER_BASE: &str = "hashdb_string";

/// Upper bound on the suffix search.
///
/// The search terminates in practice because the namespace is finite; this
/// bound only converts a pathological loop into
/// [`SynthesisError::SuffixSpaceExhausted`]. It is far above any normal
/// catalog page size and must not be reached in ordinary use.
pub const MAX_SUFFIX_ATTEMPTS: u32 = 65_536;

/// A synthesized enumeration member, ready to bind.
///
/// `name` is syntactically valid and was free in the namespace at the moment
/// of synthesis; `value` is the numeric payload the name will be bound to
/// (values are not subject to uniqueness). Ownership transfers to the
/// namespace once the caller binds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    /// Final unique identifier.
    pub name: String,
    /// Numeric payload to bind the name to.
    pub value: u64,
    /// Whether the name denotes a known API export.
    pub is_api: bool,
}

/// Failure of a single synthesis. Never retried internally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SynthesisError {
    /// The oracle could not be queried.
    #[error(transparent)]
    NamespaceUnavailable(#[from] NamespaceUnavailable),

    /// The suffix search hit [`MAX_SUFFIX_ATTEMPTS`] without finding a free
    /// name.
    #[error("no free name for base '{base}' within {limit} suffix attempts")]
    SuffixSpaceExhausted {
        /// Sanitized base name the search ran on.
        base: String,
        /// The attempt bound that was hit.
        limit: u32,
    },
}

/// Rewrites a candidate label into a syntactically legal identifier.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`; an empty candidate
/// becomes [`PLACEHOLDER_BASE`]. Idempotent: sanitizing a sanitized label is
/// a no-op.
#[must_use]
pub fn sanitize(candidate: &str) -> String {
    if candidate.is_empty() {
        return PLACEHOLDER_BASE.to_owned();
    }
    candidate
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Derives a unique, valid identifier for `candidate` and pairs it with
/// `value`.
///
/// The candidate is sanitized into a base name, then:
///
/// - `is_api == false`: the bare base is used as-is when the oracle reports
///   it free; on collision the search tries `{base}_2`, `{base}_3`, … and
///   takes the first free variant.
/// - `is_api == true`: the bare base is never used, even if nominally free —
///   API symbols recur across distinct hash values and the bare name is
///   assumed owned by a canonical occurrence. The search starts directly at
///   `{base}_2`.
///
/// Every candidate is checked against current oracle state, so names bound
/// by other actors between queries are respected. Deterministic: the same
/// candidate, flag, and oracle taken-set always yield the same name.
///
/// This function only decides the name; the caller performs the bind.
///
/// # Errors
///
/// Returns [`SynthesisError::NamespaceUnavailable`] if the oracle cannot be
/// queried, and [`SynthesisError::SuffixSpaceExhausted`] if the defensive
/// attempt bound is hit.
pub fn synthesize<O>(
    oracle: &O,
    candidate: &str,
    value: u64,
    is_api: bool,
) -> Result<EnumValue, SynthesisError>
where
    O: NamespaceOracle + ?Sized,
{
    let base = sanitize(candidate);

    if !is_api && !oracle.is_name_taken(&base)? {
        return Ok(EnumValue {
            name: base,
            value,
            is_api,
        });
    }

    // Suffix 1 is implicitly the bare name, so the search starts at 2.
    for n in 2..MAX_SUFFIX_ATTEMPTS {
        let variant = format!("{base}_{n}");
        if !oracle.is_name_taken(&variant)? {
            debug!(base = %base, chosen = %variant, "suffixed variant selected");
            return Ok(EnumValue {
                name: variant,
                value,
                is_api,
            });
        }
    }

    Err(SynthesisError::SuffixSpaceExhausted {
        base,
        limit: MAX_SUFFIX_ATTEMPTS,
    })
}
