//! Unique symbol name synthesis.
//!
//! Resolved catalog strings become enumeration members in the host analysis
//! environment's symbol table. That table is an external, mutable namespace
//! this system does not fully control, so naming goes through two gates:
//!
//! 1. **Sanitization** — the candidate label is rewritten into a
//!    syntactically legal identifier (`[A-Za-z0-9_]` only).
//! 2. **Uniqueness** — the [`NamespaceOracle`] is queried for each candidate
//!    name until a free one is found; an existing binding is never silently
//!    overwritten.
//!
//! Synthesis only decides the name. The caller performs the actual
//! [`NamespaceOracle::bind`] call, so partial-failure rollback stays the
//! namespace owner's concern.

mod oracle;
mod synth;

pub use oracle::{BindError, MockNamespaceOracle, NamespaceOracle, NamespaceUnavailable};
pub use synth::{
    sanitize, synthesize, EnumValue, SynthesisError, MAX_SUFFIX_ATTEMPTS, PLACEHOLDER_BASE,
};
