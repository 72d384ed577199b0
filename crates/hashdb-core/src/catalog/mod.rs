//! Catalog payload validation.
//!
//! The catalog serves three document shapes, each a JSON object wrapping one
//! array field:
//!
//! | Document | Field | Record shape |
//! |----------|-------|--------------|
//! | algorithms | `algorithms` | `{ "algorithm": str, "type": "unsigned_int" \| "unsigned_long" }` |
//! | resolutions | `hashes` | `{ "hash": int, "string": { "string": str, "is_api": bool, ... } }` |
//! | hit statistics | `hits` | `{ "algorithm": str, "count": int, "hitrate": float }` |
//!
//! Validation is record-local and side-effect-free: every record is checked
//! independently, accepted records and [`RejectionReason`]s are returned
//! together in input order, and one malformed entry never poisons the rest
//! of a catalog page. The caller decides whether any rejection is fatal to
//! the overall operation.

mod records;
mod validate;

pub use records::{Algorithm, AlgorithmWidth, HashResolution, HitStatistic};
pub use validate::{validate_algorithms, validate_hashes, validate_hits, RejectionReason};
