//! Key Derivation Module
//!
//! Pure helpers that turn structured inputs into stable strings and digests.
//! Every caller builds its cache keys from these so that equal inputs always
//! land on the same entry.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

// == Canonical JSON ==
/// Serializes `value` to compact JSON with object keys sorted at every depth.
///
/// Two structurally equal values produce byte-identical output regardless of
/// the order their keys were inserted in.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value = canonicalize(serde_json::to_value(value)?);
    Ok(serde_json::to_string(&value)?)
}

/// Rebuilds objects with their keys in ascending order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(String, Value)> = map.into_iter().collect();
            fields.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

// == Canonical Query String ==
/// Renders a flat mapping as `key=value` pairs joined by `&`.
///
/// Keys are sorted ascending and null values are skipped. Strings are
/// written without quotes, other scalars as their JSON text, and nested
/// arrays or objects as canonical JSON. No percent-encoding is applied.
///
/// # Errors
/// Returns [`CacheError::Serialization`] if `params` is not a JSON object.
pub fn canonical_query_string<T: Serialize + ?Sized>(params: &T) -> Result<String> {
    let map = match serde_json::to_value(params)? {
        Value::Object(map) => map,
        other => {
            return Err(CacheError::Serialization(format!(
                "query parameters must be an object, got {other}"
            )))
        }
    };

    let mut pairs: Vec<(String, Value)> = map
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .collect();
    pairs.sort_by(|(a, _), (b, _)| a.cmp(b));

    let rendered = pairs
        .into_iter()
        .map(|(key, value)| -> Result<String> {
            let value = match value {
                Value::String(s) => s,
                nested @ (Value::Array(_) | Value::Object(_)) => {
                    serde_json::to_string(&canonicalize(nested))?
                }
                scalar => scalar.to_string(),
            };
            Ok(format!("{key}={value}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(rendered.join("&"))
}

// == Hashing ==
/// SHA-256 of UTF-8 text, lowercase hex.
pub fn hash_text(text: &str) -> String {
    hash_bytes(text.as_bytes())
}

/// SHA-256 of raw bytes, lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hash of the canonical JSON form of `value`.
///
/// This is the usual way to key an expensive call: describe every input that
/// determines the result as a JSON-serializable value and fingerprint it.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(hash_text(&canonical_json(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_canonical_json_ignores_insertion_order() {
        let mut first = Map::new();
        first.insert("b".into(), json!(2));
        first.insert("a".into(), json!(1));
        let mut second = Map::new();
        second.insert("a".into(), json!(1));
        second.insert("b".into(), json!(2));

        let first = canonical_json(&first).unwrap();
        assert_eq!(first, canonical_json(&second).unwrap());
        assert_eq!(first, r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_canonical_json_sorts_nested_objects() {
        let value = json!({"z": {"y": 1, "x": [{"d": 1, "c": 2}]}, "a": "s"});
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"a":"s","z":{"x":[{"c":2,"d":1}],"y":1}}"#
        );
    }

    #[test]
    fn test_canonical_json_of_hashmap_is_stable() {
        let map: HashMap<&str, i32> = (0..32).map(|i| (["k", "j", "m"][i % 3], i as i32)).collect();
        let first = canonical_json(&map).unwrap();
        let second = canonical_json(&map.clone()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_canonical_json_rejects_non_string_keys() {
        let map: HashMap<(i32, i32), i32> = [((1, 2), 3)].into_iter().collect();
        assert!(matches!(
            canonical_json(&map),
            Err(CacheError::Serialization(_))
        ));
    }

    #[test]
    fn test_canonical_query_string_sorts_and_skips_null() {
        let params = json!({"b": 2, "a": 1, "c": null});
        assert_eq!(canonical_query_string(&params).unwrap(), "a=1&b=2");
    }

    #[test]
    fn test_canonical_query_string_value_rendering() {
        let params = json!({"q": "rust lang", "flag": true, "ids": [2, 1], "f": 1.5});
        assert_eq!(
            canonical_query_string(&params).unwrap(),
            "f=1.5&flag=true&ids=[2,1]&q=rust lang"
        );
    }

    #[test]
    fn test_canonical_query_string_empty() {
        assert_eq!(canonical_query_string(&json!({})).unwrap(), "");
        assert_eq!(canonical_query_string(&json!({"x": null})).unwrap(), "");
    }

    #[test]
    fn test_canonical_query_string_rejects_non_object() {
        assert!(canonical_query_string(&json!([1, 2])).is_err());
        assert!(canonical_query_string("a=1").is_err());
    }

    #[test]
    fn test_hash_text_matches_hash_bytes() {
        assert_eq!(hash_text("hello"), hash_bytes(b"hello"));
        assert_eq!(
            hash_text("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(hash_text("héllo ✓"), hash_bytes("héllo ✓".as_bytes()));
    }

    #[test]
    fn test_fingerprint_is_order_independent() {
        let a = fingerprint(&json!({"model": "m", "temperature": 0.2})).unwrap();
        let b = fingerprint(&json!({"temperature": 0.2, "model": "m"})).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, fingerprint(&json!({"model": "m", "temperature": 0.3})).unwrap());
    }
}
