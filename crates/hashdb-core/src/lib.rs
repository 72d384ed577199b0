//! Typed lookup client for a remote hash/string catalog.
//!
//! During binary analysis, hashed API names and obfuscated strings are
//! resolved against a remote catalog that serves machine-generated hash
//! algorithm definitions, hash-to-string resolutions, and hit statistics.
//! This crate turns those loosely-typed catalog payloads into strongly-typed
//! records and converts accepted records into symbol definitions a host
//! analysis environment can bind.
//!
//! # Architecture
//!
//! Two independent pipelines share a validation discipline:
//!
//! - [`catalog`] validates parsed catalog documents record by record. One
//!   malformed record never fails the batch; rejections are collected and
//!   returned alongside the accepted records so the caller decides pass/fail
//!   thresholds.
//! - [`symbol`] synthesizes a syntactically valid, collision-free identifier
//!   for each accepted record, querying an external namespace oracle, and
//!   never silently overwrites an existing binding.
//!
//! The network transport ([`transport`]) and the host environment's memory
//! and type primitives ([`host`]) are abstracted behind traits so the core
//! stays synchronous, deterministic, and fully unit-testable against
//! in-memory fakes.
//!
//! # Example
//!
//! ```
//! use hashdb_core::symbol::{synthesize, MockNamespaceOracle, NamespaceOracle};
//!
//! let oracle = MockNamespaceOracle::new();
//! let symbol = synthesize(&oracle, "LoadLibraryA", 0x0726_774C, false).unwrap();
//! assert_eq!(symbol.name, "LoadLibraryA");
//! oracle.bind(&symbol.name, symbol.value).unwrap();
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod host;
pub mod symbol;
pub mod transport;
