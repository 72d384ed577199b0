//! Record-local validation of parsed catalog documents.
//!
//! Every operation here consumes an already-parsed [`serde_json::Value`]
//! document (a body that fails to parse at all is the transport's
//! [`InvalidPayload`](crate::transport::TransportError::InvalidPayload),
//! raised upstream) and returns accepted records together with per-record
//! rejections, both in input order. The wrapping array field being absent is
//! treated as an empty page, not an error.
//!
//! The rejection taxonomy is deliberately coarse: a missing field and a
//! field of the wrong type are the same [`RejectionReason::MalformedRecord`].
//! The one distinguished case is an algorithm `type` tag outside the closed
//! width table, which callers report differently because it usually means a
//! catalog schema revision rather than a corrupt record.

use serde_json::{Map, Value};
use thiserror::Error;

use super::records::{Algorithm, AlgorithmWidth, HashResolution, HitStatistic};

/// Why a single catalog record was rejected.
///
/// Rejections are collected, never thrown: a bad record costs only itself.
/// Every variant carries the record's index in the wire array and the raw
/// offending value, enough context to reproduce the rejection in a test.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RejectionReason {
    /// A required field was missing or had the wrong type.
    #[error("record {index}: malformed field '{field}': {detail}")]
    MalformedRecord {
        /// Index of the record in the wire array.
        index: usize,
        /// Dotted path of the offending field.
        field: &'static str,
        /// The raw offending value, rendered as JSON text.
        detail: String,
    },

    /// An algorithm `type` tag outside the closed width table.
    #[error("record {index}: unknown algorithm type: {raw}")]
    UnknownAlgorithmType {
        /// Index of the record in the wire array.
        index: usize,
        /// The offending tag, rendered as JSON text when not a string.
        raw: String,
    },
}

/// Validates an algorithms document.
///
/// Reads `doc["algorithms"]` (absent means an empty page). Each record needs
/// a non-empty string `algorithm` and a `type` tag from the closed table
/// `{"unsigned_int": 32, "unsigned_long": 64}`. Any other tag, including a
/// missing or non-string one, is rejected as
/// [`RejectionReason::UnknownAlgorithmType`] carrying the raw tag.
#[must_use]
pub fn validate_algorithms(doc: &Value) -> (Vec<Algorithm>, Vec<RejectionReason>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, record) in page(doc, "algorithms").iter().enumerate() {
        match validate_algorithm_record(index, record) {
            Ok(algorithm) => accepted.push(algorithm),
            Err(reason) => rejected.push(reason),
        }
    }

    (accepted, rejected)
}

/// Validates a hash-resolutions document.
///
/// Reads `doc["hashes"]` (absent means an empty page). Each record needs an
/// unsigned integer `hash` and a nested `string` object with `string` (str)
/// and `is_api` (bool). When `is_api` is true, `permutation` (str), `api`
/// (str) and a non-empty `modules` array of strings are also required, and
/// `api` must equal `string` with an optional `_<digits>` de-duplication
/// suffix stripped. When `is_api` is false those fields are ignored.
#[must_use]
pub fn validate_hashes(doc: &Value) -> (Vec<HashResolution>, Vec<RejectionReason>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, record) in page(doc, "hashes").iter().enumerate() {
        match validate_hash_record(index, record) {
            Ok(resolution) => accepted.push(resolution),
            Err(reason) => rejected.push(reason),
        }
    }

    (accepted, rejected)
}

/// Validates a hit-statistics document.
///
/// Reads `doc["hits"]` (absent means an empty page). Each record needs
/// `algorithm` (str), `count` (non-negative integer) and `hitrate` (number
/// in `[0, 1]`).
#[must_use]
pub fn validate_hits(doc: &Value) -> (Vec<HitStatistic>, Vec<RejectionReason>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, record) in page(doc, "hits").iter().enumerate() {
        match validate_hit_record(index, record) {
            Ok(hit) => accepted.push(hit),
            Err(reason) => rejected.push(reason),
        }
    }

    (accepted, rejected)
}

/// Returns the wire array under `key`, or an empty page when absent or not
/// an array.
fn page<'doc>(doc: &'doc Value, key: &str) -> &'doc [Value] {
    doc.get(key)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

fn validate_algorithm_record(index: usize, record: &Value) -> Result<Algorithm, RejectionReason> {
    let name = require_str(index, record, "algorithm")?;
    if name.is_empty() {
        return Err(malformed(index, "algorithm", record.get("algorithm")));
    }

    let width = match record.get("type") {
        Some(Value::String(tag)) => AlgorithmWidth::from_wire_tag(tag).ok_or_else(|| {
            RejectionReason::UnknownAlgorithmType {
                index,
                raw: tag.clone(),
            }
        })?,
        other => {
            return Err(RejectionReason::UnknownAlgorithmType {
                index,
                raw: render(other),
            })
        }
    };

    Ok(Algorithm {
        name: name.to_owned(),
        width,
    })
}

fn validate_hash_record(index: usize, record: &Value) -> Result<HashResolution, RejectionReason> {
    let hash = record
        .get("hash")
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed(index, "hash", record.get("hash")))?;

    let string_obj: &Map<String, Value> = record
        .get("string")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed(index, "string", record.get("string")))?;

    let resolved_string = string_obj
        .get("string")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(index, "string.string", string_obj.get("string")))?;

    let is_api = string_obj
        .get("is_api")
        .and_then(Value::as_bool)
        .ok_or_else(|| malformed(index, "string.is_api", string_obj.get("is_api")))?;

    if !is_api {
        // The API-only fields are not required here and are ignored even
        // when present.
        return Ok(HashResolution {
            hash,
            resolved_string: resolved_string.to_owned(),
            is_api,
            permutation: None,
            api_name: None,
            modules: Vec::new(),
        });
    }

    let permutation = string_obj
        .get("permutation")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(index, "string.permutation", string_obj.get("permutation")))?;

    let api_name = string_obj
        .get("api")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(index, "string.api", string_obj.get("api")))?;

    if !api_name_matches(resolved_string, api_name) {
        return Err(RejectionReason::MalformedRecord {
            index,
            field: "string.api",
            detail: format!("'{api_name}' does not match resolved string '{resolved_string}'"),
        });
    }

    let modules = string_obj
        .get("modules")
        .and_then(Value::as_array)
        .filter(|modules| !modules.is_empty())
        .ok_or_else(|| malformed(index, "string.modules", string_obj.get("modules")))?
        .iter()
        .map(|module| {
            module
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| malformed(index, "string.modules", Some(module)))
        })
        .collect::<Result<Vec<String>, RejectionReason>>()?;

    Ok(HashResolution {
        hash,
        resolved_string: resolved_string.to_owned(),
        is_api,
        permutation: Some(permutation.to_owned()),
        api_name: Some(api_name.to_owned()),
        modules,
    })
}

fn validate_hit_record(index: usize, record: &Value) -> Result<HitStatistic, RejectionReason> {
    let algorithm_name = require_str(index, record, "algorithm")?.to_owned();

    let count = record
        .get("count")
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed(index, "count", record.get("count")))?;

    let hit_rate = record
        .get("hitrate")
        .and_then(Value::as_f64)
        .filter(|rate| (0.0..=1.0).contains(rate))
        .ok_or_else(|| malformed(index, "hitrate", record.get("hitrate")))?;

    Ok(HitStatistic {
        algorithm_name,
        count,
        hit_rate,
    })
}

/// True when `api_name` equals `resolved` with an optional `_<digits>`
/// de-duplication suffix stripped from `resolved`.
fn api_name_matches(resolved: &str, api_name: &str) -> bool {
    if resolved == api_name {
        return true;
    }
    resolved.strip_prefix(api_name).is_some_and(|rest| {
        let mut bytes = rest.bytes();
        bytes.next() == Some(b'_') && rest.len() > 1 && bytes.all(|b| b.is_ascii_digit())
    })
}

fn require_str<'rec>(
    index: usize,
    record: &'rec Value,
    field: &'static str,
) -> Result<&'rec str, RejectionReason> {
    record
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(index, field, record.get(field)))
}

fn malformed(index: usize, field: &'static str, raw: Option<&Value>) -> RejectionReason {
    RejectionReason::MalformedRecord {
        index,
        field,
        detail: render(raw),
    }
}

/// Renders a raw wire value for a rejection message; an absent field renders
/// as `null`, matching its JSON reading.
fn render(raw: Option<&Value>) -> String {
    raw.map_or_else(|| Value::Null.to_string(), Value::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // =========================================================================
    // Algorithm validation
    // =========================================================================

    #[test]
    fn test_algorithm_type_tags_map_to_widths() {
        let doc = json!({"algorithms": [
            {"algorithm": "crc32", "description": "Standard crc32 hash.", "type": "unsigned_int"},
            {"algorithm": "fnv1a_64", "description": "FNV1a hash (64-bit)", "type": "unsigned_long"},
        ]});

        let (accepted, rejected) = validate_algorithms(&doc);
        assert!(rejected.is_empty(), "unexpected rejections: {rejected:?}");
        assert_eq!(
            accepted,
            vec![
                Algorithm {
                    name: "crc32".to_owned(),
                    width: AlgorithmWidth::U32,
                },
                Algorithm {
                    name: "fnv1a_64".to_owned(),
                    width: AlgorithmWidth::U64,
                },
            ]
        );
        assert_eq!(accepted[0].width.bits(), 32);
        assert_eq!(accepted[1].width.bits(), 64);
    }

    #[test]
    fn test_unknown_algorithm_type_carries_raw_tag() {
        let doc = json!({"algorithms": [
            {"algorithm": "crc32", "type": "unsigned_float"},
            {"algorithm": "fnv1a_64", "type": "unsigned_long"},
        ]});

        let (accepted, rejected) = validate_algorithms(&doc);
        // The bad record costs only itself; the valid sibling survives.
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].name, "fnv1a_64");
        assert_eq!(
            rejected,
            vec![RejectionReason::UnknownAlgorithmType {
                index: 0,
                raw: "unsigned_float".to_owned(),
            }]
        );
    }

    #[test]
    fn test_missing_algorithm_type_is_unknown_type() {
        let doc = json!({"algorithms": [{"algorithm": "crc32"}]});

        let (accepted, rejected) = validate_algorithms(&doc);
        assert!(accepted.is_empty());
        assert_eq!(
            rejected,
            vec![RejectionReason::UnknownAlgorithmType {
                index: 0,
                raw: "null".to_owned(),
            }]
        );
    }

    #[test]
    fn test_missing_algorithm_name_is_malformed() {
        let doc = json!({"algorithms": [
            {},
            {"algorithm": 7, "type": "unsigned_int"},
            {"algorithm": "", "type": "unsigned_int"},
        ]});

        let (accepted, rejected) = validate_algorithms(&doc);
        assert!(accepted.is_empty());
        assert_eq!(rejected.len(), 3);
        for reason in &rejected {
            assert!(
                matches!(
                    reason,
                    RejectionReason::MalformedRecord {
                        field: "algorithm",
                        ..
                    }
                ),
                "expected MalformedRecord on 'algorithm', got: {reason:?}"
            );
        }
    }

    #[test]
    fn test_absent_algorithms_field_is_empty_page() {
        let (accepted, rejected) = validate_algorithms(&json!({}));
        assert!(accepted.is_empty());
        assert!(rejected.is_empty());
    }

    // =========================================================================
    // Hash resolution validation
    // =========================================================================

    #[test]
    fn test_valid_api_and_plain_resolutions() {
        let doc = json!({"hashes": [
            {"hash": 1_653_273_962_u64, "string": {
                "string": "RouteTheCall", "is_api": true, "permutation": "api",
                "api": "RouteTheCall", "modules": ["zipfldr"]}},
            {"hash": 2_998_556_761_u64, "string": {
                "string": "DllCanUnloadNow", "is_api": false}},
        ]});

        let (accepted, rejected) = validate_hashes(&doc);
        assert!(rejected.is_empty(), "unexpected rejections: {rejected:?}");
        assert_eq!(accepted.len(), 2);

        let api = &accepted[0];
        assert_eq!(api.hash, 1_653_273_962);
        assert_eq!(api.resolved_string, "RouteTheCall");
        assert!(api.is_api);
        assert_eq!(api.permutation.as_deref(), Some("api"));
        assert_eq!(api.api_name.as_deref(), Some("RouteTheCall"));
        assert_eq!(api.modules, vec!["zipfldr".to_owned()]);
        assert_eq!(api.symbol_label(), "RouteTheCall");

        let plain = &accepted[1];
        assert!(!plain.is_api);
        assert_eq!(plain.permutation, None);
        assert_eq!(plain.api_name, None);
        assert!(plain.modules.is_empty());
        assert_eq!(plain.symbol_label(), "DllCanUnloadNow");
    }

    #[test]
    fn test_partial_batch_keeps_good_record_and_rejects_in_order() {
        let doc = json!({"hashes": [
            // missing the nested string object entirely
            {"hash": 1_653_273_962_u64},
            {"hash": 2_998_556_761_u64, "string": {
                "string": "DllCanUnloadNow", "is_api": false}},
            // missing is_api
            {"hash": 1_075_368_562_u64, "string": {"string": "DllGetClassObject"}},
            // is_api without modules
            {"hash": 1_075_368_562_u64, "string": {
                "string": "DllGetClassObject", "is_api": true,
                "permutation": "api", "api": "DllGetClassObject"}},
        ]});

        let (accepted, rejected) = validate_hashes(&doc);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].resolved_string, "DllCanUnloadNow");

        let fields: Vec<&str> = rejected
            .iter()
            .map(|reason| match reason {
                RejectionReason::MalformedRecord { field, .. } => *field,
                other => panic!("expected MalformedRecord, got: {other:?}"),
            })
            .collect();
        assert_eq!(fields, vec!["string", "string.is_api", "string.modules"]);

        let indices: Vec<usize> = rejected
            .iter()
            .map(|reason| match reason {
                RejectionReason::MalformedRecord { index, .. }
                | RejectionReason::UnknownAlgorithmType { index, .. } => *index,
            })
            .collect();
        assert_eq!(indices, vec![0, 2, 3], "rejections must come in input order");
    }

    #[test]
    fn test_api_name_mismatch_is_malformed() {
        let doc = json!({"hashes": [{"hash": 1_075_368_562_u64, "string": {
            "string": "DllGetClassObject", "is_api": true, "permutation": "api",
            "api": "DllGetClassObject_12345", "modules": ["ole32"]}}]});

        let (accepted, rejected) = validate_hashes(&doc);
        assert!(accepted.is_empty());
        assert!(
            matches!(
                rejected.as_slice(),
                [RejectionReason::MalformedRecord {
                    field: "string.api",
                    ..
                }]
            ),
            "got: {rejected:?}"
        );
    }

    #[test]
    fn test_api_name_may_be_resolved_string_minus_dedup_suffix() {
        let doc = json!({"hashes": [{"hash": 42, "string": {
            "string": "GetProcAddress_2", "is_api": true, "permutation": "api",
            "api": "GetProcAddress", "modules": ["kernel32"]}}]});

        let (accepted, rejected) = validate_hashes(&doc);
        assert!(rejected.is_empty(), "unexpected rejections: {rejected:?}");
        assert_eq!(accepted[0].api_name.as_deref(), Some("GetProcAddress"));
        assert_eq!(accepted[0].symbol_label(), "GetProcAddress");
    }

    #[test]
    fn test_empty_modules_is_malformed() {
        let doc = json!({"hashes": [{"hash": 42, "string": {
            "string": "RouteTheCall", "is_api": true, "permutation": "api",
            "api": "RouteTheCall", "modules": []}}]});

        let (_, rejected) = validate_hashes(&doc);
        assert!(matches!(
            rejected.as_slice(),
            [RejectionReason::MalformedRecord {
                field: "string.modules",
                ..
            }]
        ));
    }

    #[test]
    fn test_wrong_type_is_malformed_like_missing() {
        // The taxonomy does not distinguish missing from wrong-type.
        let doc = json!({"hashes": [
            {"hash": "not-a-number", "string": {"string": "x", "is_api": false}},
            {"hash": -3, "string": {"string": "x", "is_api": false}},
            {"hash": 42, "string": {"string": "x", "is_api": "yes"}},
        ]});

        let (accepted, rejected) = validate_hashes(&doc);
        assert!(accepted.is_empty());
        assert_eq!(rejected.len(), 3);
    }

    #[test]
    fn test_api_fields_ignored_when_not_api() {
        let doc = json!({"hashes": [{"hash": 42, "string": {
            "string": "DllCanUnloadNow", "is_api": false,
            "permutation": "api", "api": "DllCanUnloadNow", "modules": ["ole32"]}}]});

        let (accepted, rejected) = validate_hashes(&doc);
        assert!(rejected.is_empty());
        assert_eq!(accepted[0].permutation, None);
        assert_eq!(accepted[0].api_name, None);
        assert!(accepted[0].modules.is_empty());
    }

    // =========================================================================
    // Hit statistic validation
    // =========================================================================

    #[test]
    fn test_valid_hit_record() {
        let doc = json!({"hits": [{"algorithm": "crc32", "count": 1, "hitrate": 1.0}]});

        let (accepted, rejected) = validate_hits(&doc);
        assert!(rejected.is_empty());
        assert_eq!(
            accepted,
            vec![HitStatistic {
                algorithm_name: "crc32".to_owned(),
                count: 1,
                hit_rate: 1.0,
            }]
        );
    }

    #[test]
    fn test_hit_records_missing_fields_are_malformed() {
        let doc = json!({"hits": [
            {},
            {"algorithm": "crc32"},
            {"algorithm": "crc32", "count": 1},
        ]});

        let (accepted, rejected) = validate_hits(&doc);
        assert!(accepted.is_empty());
        assert_eq!(rejected.len(), 3);
        assert!(rejected
            .iter()
            .all(|reason| matches!(reason, RejectionReason::MalformedRecord { .. })));
    }

    #[test]
    fn test_hit_rate_outside_unit_interval_is_malformed() {
        let doc = json!({"hits": [
            {"algorithm": "crc32", "count": 1, "hitrate": 1.5},
            {"algorithm": "crc32", "count": 1, "hitrate": -0.1},
            {"algorithm": "crc32", "count": 7, "hitrate": 0},
        ]});

        let (accepted, rejected) = validate_hits(&doc);
        // Integral zero still reads as a float, like the wire format allows.
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].count, 7);
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_negative_count_is_malformed() {
        let doc = json!({"hits": [{"algorithm": "crc32", "count": -1, "hitrate": 0.5}]});

        let (accepted, rejected) = validate_hits(&doc);
        assert!(accepted.is_empty());
        assert_eq!(rejected.len(), 1);
    }
}
