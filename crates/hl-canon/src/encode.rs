//! The `json-sorted-v1` canonical encoding.
//!
//! Output is byte-compatible with a JSON encoder that sorts object keys, uses `", "` and
//! `": "` as separators, escapes every non-ASCII character, and prints floats as their
//! shortest round-trip representation.

use crate::error::CanonError;
use crate::finite::check_finite;
use serde::Serialize;
use serde_json::{Number, Value};

/// Name of the canonical encoding, recorded alongside the digest algorithm.
pub const ENCODING_NAME: &str = "json-sorted-v1";

/// Encode a structured value into its canonical text form.
pub fn to_canonical_string(value: &Value) -> Result<String, CanonError> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out)
}

/// Encode a structured value into canonical UTF-8 bytes (which are always ASCII).
pub fn to_canonical_bytes(value: &Value) -> Result<Vec<u8>, CanonError> {
    to_canonical_string(value).map(String::into_bytes)
}

/// Convert any serializable value into the structured value type that the encoder accepts.
///
/// Map keys must serialize as strings, and every float must be finite.
pub fn to_structured<T: Serialize + ?Sized>(value: &T) -> Result<Value, CanonError> {
    check_finite(value)?;
    serde_json::to_value(value).map_err(|e| CanonError::Serialization(e.to_string()))
}

fn write_value(out: &mut String, value: &Value) -> Result<(), CanonError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n)?,
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Sorted here regardless of the map's own iteration order.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (idx, key) in keys.into_iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_string(out, key);
                out.push_str(": ");
                write_value(out, &map[key.as_str()])?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_number(out: &mut String, n: &Number) -> Result<(), CanonError> {
    if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(f) = n.as_f64() {
        out.push_str(&format_float(f)?);
    } else {
        return Err(CanonError::UnrepresentableNumber(n.to_string()));
    }
    Ok(())
}

/// Format a float with the shortest digits that round-trip.
///
/// Decimal exponents in `-5 < e < 16` print in fixed notation (integral values get a
/// trailing `.0`); anything else prints as `d.ddde±XX`.
pub fn format_float(value: f64) -> Result<String, CanonError> {
    if !value.is_finite() {
        return Err(CanonError::NonFiniteNumber(value));
    }

    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .ok_or_else(|| CanonError::UnrepresentableNumber(scientific.clone()))?;
    let exponent: i32 = exponent
        .parse()
        .map_err(|_| CanonError::UnrepresentableNumber(scientific.clone()))?;
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::with_capacity(digits.len() + 8);
    if value.is_sign_negative() {
        out.push('-');
    }

    if !(-4..16).contains(&exponent) {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exponent.unsigned_abs()));
        return Ok(out);
    }

    let point = exponent + 1;
    if point <= 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat(point.unsigned_abs() as usize));
        out.push_str(&digits);
    } else {
        let point = point as usize;
        if point < digits.len() {
            out.push_str(&digits[..point]);
            out.push('.');
            out.push_str(&digits[point..]);
        } else {
            out.push_str(&digits);
            out.push_str(&"0".repeat(point - digits.len()));
            out.push_str(".0");
        }
    }
    Ok(out)
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(ch),
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_object_keys_are_sorted() {
        let value = json!({"zeta": 1, "alpha": 2, "mid": 3});
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            r#"{"alpha": 2, "mid": 3, "zeta": 1}"#
        );
    }

    #[test]
    fn test_nested_structures_use_default_separators() {
        let value = json!({"b": [1, 2.0, null, true], "a": {"z": false}});
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            r#"{"a": {"z": false}, "b": [1, 2.0, null, true]}"#
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(to_canonical_string(&json!({})).unwrap(), "{}");
        assert_eq!(to_canonical_string(&json!([])).unwrap(), "[]");
        assert_eq!(to_canonical_string(&json!({"a": []})).unwrap(), r#"{"a": []}"#);
    }

    #[test]
    fn test_reference_vector_matches_byte_for_byte() {
        let value = json!({
            "b": [1, 2.0, null, true],
            "a": {"z": "é😀\n\"\\/\u{01}\u{7f}"},
            "n": 1e16,
            "m": 1.5e-05,
            "k": -0.0,
            "big": 123456789.123
        });
        let expected = r#"{"a": {"z": "\u00e9\ud83d\ude00\n\"\\/\u0001\u007f"}, "b": [1, 2.0, null, true], "big": 123456789.123, "k": -0.0, "m": 1.5e-05, "n": 1e+16}"#;
        assert_eq!(to_canonical_string(&value).unwrap(), expected);
    }

    #[test]
    fn test_float_fixed_notation() {
        assert_eq!(format_float(1.0).unwrap(), "1.0");
        assert_eq!(format_float(0.1).unwrap(), "0.1");
        assert_eq!(format_float(2.5).unwrap(), "2.5");
        assert_eq!(format_float(0.0001).unwrap(), "0.0001");
        assert_eq!(format_float(1700000000.5).unwrap(), "1700000000.5");
        assert_eq!(format_float(1e15).unwrap(), "1000000000000000.0");
        assert_eq!(format_float(-89.25).unwrap(), "-89.25");
    }

    #[test]
    fn test_float_scientific_notation() {
        assert_eq!(format_float(1e16).unwrap(), "1e+16");
        assert_eq!(format_float(1.5e-5).unwrap(), "1.5e-05");
        assert_eq!(format_float(1e-7).unwrap(), "1e-07");
        assert_eq!(format_float(2.5e100).unwrap(), "2.5e+100");
        assert_eq!(format_float(-3e-10).unwrap(), "-3e-10");
    }

    #[test]
    fn test_signed_zero() {
        assert_eq!(format_float(0.0).unwrap(), "0.0");
        assert_eq!(format_float(-0.0).unwrap(), "-0.0");
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        assert!(matches!(
            format_float(f64::NAN),
            Err(CanonError::NonFiniteNumber(_))
        ));
        assert!(matches!(
            format_float(f64::INFINITY),
            Err(CanonError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn test_integers_print_plainly() {
        let value = json!([0, -7, 150, u64::MAX, i64::MIN]);
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            format!("[0, -7, 150, {}, {}]", u64::MAX, i64::MIN)
        );
    }

    #[test]
    fn test_string_escapes() {
        let value = json!("tab\there\r\u{08}\u{0c}");
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            r#""tab\there\r\b\f""#
        );
    }

    #[test]
    fn test_non_ascii_keys_sort_by_code_point() {
        let value = json!({"é": 1, "z": 2, "A": 3});
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            r#"{"A": 3, "z": 2, "\u00e9": 1}"#
        );
    }

    #[test]
    fn test_output_is_ascii() {
        let value = json!({"value": "9.2M km² · -89.2°C"});
        let bytes = to_canonical_bytes(&value).unwrap();
        assert!(bytes.is_ascii());
    }

    #[test]
    fn test_to_structured_accepts_string_keyed_maps() {
        let mut map = HashMap::new();
        map.insert("type".to_string(), "a".to_string());
        let value = to_structured(&map).unwrap();
        assert_eq!(value, json!({"type": "a"}));
    }

    #[test]
    fn test_to_structured_rejects_non_string_keys() {
        let mut map = HashMap::new();
        map.insert(vec![1u8, 2], 3);
        assert!(matches!(
            to_structured(&map),
            Err(CanonError::Serialization(_))
        ));
    }

    #[test]
    fn test_to_structured_rejects_nan_instead_of_nulling_it() {
        let mut map = HashMap::new();
        map.insert("ratio".to_string(), f64::NAN);
        assert!(matches!(
            to_structured(&map),
            Err(CanonError::NonFiniteNumber(v)) if v.is_nan()
        ));
    }
}
