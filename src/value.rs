//! Structural merge over the tagged value model
//!
//! Templates are authored as loosely-typed JSON, and inheritance, default
//! overlays and record data are all combined at that level before anything is
//! converted into typed definitions. The rules here are shared by every merge
//! step so a base template and a default overlay behave identically.

use serde_json::{Map, Value};

/// Truthiness as template authors expect it: `null`, `false`, `0`, `NaN` and
/// the empty string are falsy, everything else (including empty arrays and
/// objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Overlay `child` onto `base`, returning a fresh object.
///
/// For every key of `base`:
/// - array values take the child's value if it is truthy, else the base's
/// - object values recurse (a non-object child value counts as empty)
/// - scalar values take the child's value if truthy, else the base's if
///   truthy, else `null`
///
/// Keys that only exist in `child` are kept as they are.
pub fn merge_objects(child: &Map<String, Value>, base: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = child.clone();
    for (key, base_value) in base {
        let child_value = child.get(key);
        let value = match base_value {
            Value::Array(_) => match child_value {
                Some(v) if is_truthy(v) => v.clone(),
                _ => base_value.clone(),
            },
            Value::Object(base_map) => {
                let empty = Map::new();
                let child_map = match child_value {
                    Some(Value::Object(m)) => m,
                    _ => &empty,
                };
                Value::Object(merge_objects(child_map, base_map))
            }
            _ => match child_value {
                Some(v) if is_truthy(v) => v.clone(),
                _ if is_truthy(base_value) => base_value.clone(),
                _ => Value::Null,
            },
        };
        merged.insert(key.clone(), value);
    }
    merged
}

/// Shallow merge where later maps win.
pub fn assign(layers: &[&Map<String, Value>]) -> Map<String, Value> {
    let mut out = Map::new();
    for layer in layers {
        for (k, v) in layer.iter() {
            out.insert(k.clone(), v.clone());
        }
    }
    out
}

/// Parse a `#RRGGBB` (or bare hex) color into an integer.
pub fn parse_hex_color(s: &str) -> Option<u32> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

const COLOR_KEYS: [&str; 3] = ["color", "fill", "stroke"];

/// Replace hexadecimal color strings under `color`, `fill` and `stroke` keys
/// (at this level and inside nested objects) with integer values.
///
/// Returns the offending string if a color key holds something that is not
/// a hex color.
pub fn normalize_colors(map: &mut Map<String, Value>) -> Result<(), String> {
    for (key, value) in map.iter_mut() {
        match value {
            Value::String(s) if COLOR_KEYS.contains(&key.as_str()) => {
                if s.is_empty() {
                    *value = Value::Null;
                    continue;
                }
                let color = parse_hex_color(s).ok_or_else(|| s.clone())?;
                *value = Value::from(color);
            }
            Value::Object(nested) => normalize_colors(nested)?,
            _ => {}
        }
    }
    Ok(())
}

/// Human-readable description of a JSON value's kind, for error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(-1.5)));
    }

    #[test]
    fn test_nested_override_keeps_base_keys() {
        let base = obj(json!({"a": {"x": 1, "y": 2}}));
        let child = obj(json!({"a": {"x": 9}}));
        let merged = merge_objects(&child, &base);
        assert_eq!(Value::Object(merged), json!({"a": {"x": 9, "y": 2}}));
    }

    #[test]
    fn test_arrays_are_taken_whole() {
        let base = obj(json!({"position": [1, 2], "dash": [1, 0]}));
        let child = obj(json!({"position": [5]}));
        let merged = merge_objects(&child, &base);
        assert_eq!(merged["position"], json!([5]));
        assert_eq!(merged["dash"], json!([1, 0]));
    }

    #[test]
    fn test_falsy_scalars_fall_through() {
        let base = obj(json!({"rotate": 0, "bold": false, "size": 10}));
        let child = obj(json!({"rotate": 0, "bold": false, "size": 0}));
        let merged = merge_objects(&child, &base);
        assert_eq!(merged["rotate"], Value::Null);
        assert_eq!(merged["bold"], Value::Null);
        assert_eq!(merged["size"], json!(10));
    }

    #[test]
    fn test_child_only_keys_survive() {
        let base = obj(json!({"a": 1}));
        let child = obj(json!({"b": "x"}));
        let merged = merge_objects(&child, &base);
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": "x"}));
    }

    #[test]
    fn test_scalar_child_against_object_base() {
        let base = obj(json!({"font": {"size": 10}}));
        let child = obj(json!({"font": "big"}));
        let merged = merge_objects(&child, &base);
        assert_eq!(merged["font"], json!({"size": 10}));
    }

    #[test]
    fn test_assign_later_wins() {
        let a = obj(json!({"x": 1, "y": 1}));
        let b = obj(json!({"y": 2}));
        let out = assign(&[&a, &b]);
        assert_eq!(Value::Object(out), json!({"x": 1, "y": 2}));
    }

    #[test]
    fn test_normalize_colors_nested() {
        let mut m = obj(json!({
            "fill": "#ffffff",
            "stroke": 255,
            "font": {"color": "#FF0000"},
            "checkStyle": {"stroke": "#000000"}
        }));
        normalize_colors(&mut m).unwrap();
        assert_eq!(m["fill"], json!(0xffffff));
        assert_eq!(m["stroke"], json!(255));
        assert_eq!(m["font"]["color"], json!(0xff0000));
        assert_eq!(m["checkStyle"]["stroke"], json!(0));
    }

    #[test]
    fn test_normalize_colors_rejects_names() {
        let mut m = obj(json!({"color": "red"}));
        assert_eq!(normalize_colors(&mut m), Err("red".to_string()));
    }
}
