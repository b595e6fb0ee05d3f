//! Total helpers for reading typed parameters out of a JSON object.
//!
//! A missing key or a value of the wrong type yields the supplied default,
//! so every engine can be built from an empty `{}`.

use serde_json::Value;

use crate::grid::GridRange;

/// `params[name]` as `f64`; integers are accepted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// `params[name]` as a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// `params[name]` as a grid range, given either as an
/// `{"xMin", "xMax", "yCenter"}` object or as an `xMin_xMax_yCenter` string.
///
/// Invalid ranges fall back to `default`.
pub fn param_range(params: &Value, name: &str, default: GridRange) -> GridRange {
    match params.get(name) {
        Some(Value::String(s)) => s.parse().unwrap_or(default),
        Some(v @ Value::Object(_)) => serde_json::from_value::<GridRange>(v.clone())
            .ok()
            .filter(|r| r.validate().is_ok())
            .unwrap_or(default),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fallback() -> GridRange {
        GridRange::new(0.0, 1.0, 0.0).unwrap()
    }

    #[test]
    fn param_f64_accepts_integers() {
        let params = json!({"escape_value": 2});
        assert_eq!(param_f64(&params, "escape_value", 1.0), 2.0);
    }

    #[test]
    fn param_f64_falls_back_on_wrong_type() {
        let params = json!({"strength": "strong"});
        assert_eq!(param_f64(&params, "strength", 3.6), 3.6);
    }

    #[test]
    fn param_f64_falls_back_for_non_object() {
        let params = json!([1, 2, 3]);
        assert_eq!(param_f64(&params, "strength", 3.6), 3.6);
    }

    #[test]
    fn param_usize_rejects_floats_and_negatives() {
        assert_eq!(param_usize(&json!({"max_iterations": 2.5}), "max_iterations", 255), 255);
        assert_eq!(param_usize(&json!({"max_iterations": -1}), "max_iterations", 255), 255);
        assert_eq!(param_usize(&json!({"max_iterations": 2000}), "max_iterations", 255), 2000);
    }

    #[test]
    fn param_u64_reads_large_seeds() {
        let params = json!({"seed": 18_000_000_000_000_000_000_u64});
        assert_eq!(param_u64(&params, "seed", 1), 18_000_000_000_000_000_000);
    }

    #[test]
    fn param_bool_and_string() {
        let params = json!({"obstacle": true, "bias": "bounds"});
        assert!(param_bool(&params, "obstacle", false));
        assert!(!param_bool(&params, "missing", false));
        assert_eq!(param_string(&params, "bias", "lower"), "bounds");
        assert_eq!(param_string(&params, "missing", "lower"), "lower");
    }

    #[test]
    fn param_range_reads_string_form() {
        let params = json!({"range": "-3_1.8_0"});
        let r = param_range(&params, "range", fallback());
        assert_eq!(r, GridRange::new(-3.0, 1.8, 0.0).unwrap());
    }

    #[test]
    fn param_range_reads_object_form() {
        let params = json!({"range": {"xMin": -180.0, "xMax": 180.0, "yCenter": 10.0}});
        let r = param_range(&params, "range", fallback());
        assert_eq!(r, GridRange::new(-180.0, 180.0, 10.0).unwrap());
    }

    #[test]
    fn param_range_falls_back_on_inverted_bounds() {
        let params = json!({
            "a": "5_1_0",
            "b": {"xMin": 5.0, "xMax": 1.0, "yCenter": 0.0},
            "c": 17
        });
        for key in ["a", "b", "c", "missing"] {
            assert_eq!(param_range(&params, key, fallback()), fallback(), "key {key}");
        }
    }
}
