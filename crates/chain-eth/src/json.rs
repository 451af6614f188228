//! JSON value helpers shared with the remote client.

use serde_json::Value;

/// JavaScript truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&value), "{value} should be falsy");
        }
    }

    #[test]
    fn truthy_values() {
        for value in [json!(true), json!(1), json!("0"), json!("0x0"), json!([]), json!({})] {
            assert!(is_truthy(&value), "{value} should be truthy");
        }
    }
}
