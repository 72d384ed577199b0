//! Typed catalog records.
//!
//! All record types are transient, request-scoped values: they are created
//! only by the validators in this module's parent, are immutable afterward,
//! and none persists across a catalog query.

use serde::Serialize;

/// Width of the unsigned integers a hash algorithm produces.
///
/// The wire payload does not transmit the width directly; it carries a
/// `type` tag that the validator maps through [`AlgorithmWidth::from_wire_tag`].
/// The tag set is closed: anything outside it is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlgorithmWidth {
    /// 32-bit hash values (wire tag `unsigned_int`).
    U32,
    /// 64-bit hash values (wire tag `unsigned_long`).
    U64,
}

impl AlgorithmWidth {
    /// Maps a wire `type` tag to a width.
    ///
    /// Returns `None` for any tag outside the closed table
    /// `{"unsigned_int", "unsigned_long"}`.
    #[must_use]
    pub fn from_wire_tag(tag: &str) -> Option<Self> {
        match tag {
            "unsigned_int" => Some(Self::U32),
            "unsigned_long" => Some(Self::U64),
            _ => None,
        }
    }

    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::U32 => 32,
            Self::U64 => 64,
        }
    }

    /// Width in bytes, for sizing memory reads.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        self.bits() / 8
    }
}

/// A hash algorithm definition served by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Algorithm {
    /// Algorithm identifier, e.g. `crc32` or `fnv1a_64`. Never empty.
    pub name: String,
    /// Width of the values this algorithm produces.
    pub width: AlgorithmWidth,
}

/// A single hash-to-string resolution served by the catalog.
///
/// When `is_api` is true the resolved string names an API export:
/// `permutation` and `api_name` are present, `modules` is non-empty, and
/// `api_name` equals `resolved_string` with an optional `_<digits>`
/// de-duplication suffix stripped (the raw API symbol before
/// de-duplication). When `is_api` is false those fields are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashResolution {
    /// The hash value the string resolves from.
    pub hash: u64,
    /// The resolved plaintext string.
    pub resolved_string: String,
    /// Whether the string names a known API export.
    pub is_api: bool,
    /// Hash permutation the resolution was found under.
    pub permutation: Option<String>,
    /// Raw API symbol name, before de-duplication.
    pub api_name: Option<String>,
    /// Modules exporting this API symbol, in catalog order.
    pub modules: Vec<String>,
}

impl HashResolution {
    /// The label to derive a symbol name from: the raw API symbol when this
    /// resolution names an API export, the resolved string otherwise.
    #[must_use]
    pub fn symbol_label(&self) -> &str {
        match &self.api_name {
            Some(api_name) if self.is_api => api_name,
            _ => &self.resolved_string,
        }
    }
}

/// Per-algorithm hit statistic for a hunt query. Reporting only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitStatistic {
    /// Algorithm the hits were counted for.
    pub algorithm_name: String,
    /// Number of matching hashes.
    pub count: u64,
    /// Fraction of queried hashes that matched, in `[0, 1]`.
    pub hit_rate: f64,
}
