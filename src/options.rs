use serde_json::Value;

use crate::error::CommandError;

/// Parses a repeatable `key=value` command-line property
pub fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("'{raw}' is not a valid key=value property")),
    }
}

/// Builds a PATCH payload from user-supplied properties.
///
/// Keys owned by a dedicated option are rejected before the merge so a
/// property can't silently fight the option that manages the same field.
pub fn build_property_payload(
    properties: &[(String, String)],
    reserved: &[&str],
) -> Result<Value, CommandError> {
    let mut payload = serde_json::Map::new();

    for (key, value) in properties {
        if reserved.contains(&key.as_str()) {
            return Err(CommandError::Validation(format!(
                "Property '{key}' is managed by a dedicated option; use that option instead"
            )));
        }
        payload.insert(key.clone(), coerce_scalar(value));
    }

    Ok(Value::Object(payload))
}

/// Booleans and integers pass through typed; everything else stays a string
fn coerce_scalar(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => value
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string())),
    }
}

/// Splits a comma-separated option value, trimming each entry
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_key_value_pairs() {
        assert_eq!(
            parse_property("notes=internal").unwrap(),
            ("notes".to_string(), "internal".to_string())
        );
        assert_eq!(
            parse_property("tags=a=b").unwrap(),
            ("tags".to_string(), "a=b".to_string())
        );
        assert!(parse_property("no-separator").is_err());
        assert!(parse_property("=value").is_err());
    }

    #[test]
    fn test_reserved_keys_are_rejected_before_merge() {
        let properties = vec![("web".to_string(), "{}".to_string())];
        let error = build_property_payload(&properties, &["web", "spa"]).unwrap_err();
        assert!(error.to_string().contains("'web'"));
    }

    #[test]
    fn test_scalars_are_coerced() {
        let properties = vec![
            ("isDeviceOnlyAuthSupported".to_string(), "true".to_string()),
            ("priority".to_string(), "7".to_string()),
            ("notes".to_string(), "7 dwarves".to_string()),
        ];
        let payload = build_property_payload(&properties, &[]).unwrap();

        assert_eq!(
            payload,
            json!({
                "isDeviceOnlyAuthSupported": true,
                "priority": 7,
                "notes": "7 dwarves",
            })
        );
    }

    #[test]
    fn test_splits_and_trims_lists() {
        assert_eq!(
            split_list("https://a, https://b ,https://c"),
            vec!["https://a", "https://b", "https://c"]
        );
        assert_eq!(split_list(""), Vec::<String>::new());
    }
}
