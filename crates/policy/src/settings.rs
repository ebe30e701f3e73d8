use serde_json::{Map, Value};
use thiserror::Error;

/// Loosely typed operator settings, as stored by the host platform.
pub type RawSettings = Map<String, Value>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Settings must be a mapping of keys to values")]
    NotAMapping,
}

/// Parse a YAML (or JSON) settings document into a raw settings map.
///
/// An empty document yields an empty map.
pub fn parse_settings(content: &str) -> Result<RawSettings, SettingsError> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_yaml::from_str::<Value>(content)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(SettingsError::NotAMapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_settings() {
        let raw = parse_settings("max_files: 800\nscan_mode: aggressive\n").unwrap();
        assert_eq!(raw.get("max_files").and_then(Value::as_u64), Some(800));
        assert_eq!(
            raw.get("scan_mode").and_then(Value::as_str),
            Some("aggressive")
        );
    }

    #[test]
    fn test_parse_json_settings() {
        let raw = parse_settings(r#"{"enabled": false}"#).unwrap();
        assert_eq!(raw.get("enabled"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_parse_empty_settings() {
        assert!(parse_settings("").unwrap().is_empty());
        assert!(parse_settings("~").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_sequence() {
        assert!(matches!(
            parse_settings("- a\n- b\n"),
            Err(SettingsError::NotAMapping)
        ));
    }
}
