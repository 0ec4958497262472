pub mod parameter;
pub mod ref_resolve;
pub mod security;
pub mod server;

use serde_json::Value;

use crate::error::ParseError;

/// Parse an API document from YAML.
pub fn from_yaml(input: &str) -> Result<Value, ParseError> {
    let document: Value = serde_yaml_ng::from_str(input)?;
    ensure_mapping(document)
}

/// Parse an API document from JSON.
pub fn from_json(input: &str) -> Result<Value, ParseError> {
    let document: Value = serde_json::from_str(input)?;
    ensure_mapping(document)
}

fn ensure_mapping(document: Value) -> Result<Value, ParseError> {
    if !document.is_object() {
        return Err(ParseError::NotAMapping);
    }
    Ok(document)
}

/// Which major revision of the format a document declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    /// `swagger: "2.0"`
    Swagger2,
    /// `openapi: "3.x"`
    OpenApi3,
}

impl SpecVersion {
    pub fn detect(document: &Value) -> Result<Self, ParseError> {
        if let Some(version) = document.get("openapi") {
            let version = version_string(version);
            if version.starts_with("3.") {
                return Ok(SpecVersion::OpenApi3);
            }
            return Err(ParseError::UnsupportedVersion(version));
        }
        if let Some(version) = document.get("swagger") {
            let version = version_string(version);
            if version.starts_with("2.") {
                return Ok(SpecVersion::Swagger2);
            }
            return Err(ParseError::UnsupportedVersion(version));
        }
        Err(ParseError::UnsupportedVersion("<missing>".to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecVersion::Swagger2 => "Swagger 2.0",
            SpecVersion::OpenApi3 => "OpenAPI 3.x",
        }
    }
}

// YAML authors frequently write `swagger: 2.0` unquoted.
fn version_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            let s = n.to_string();
            if s.contains('.') { s } else { format!("{s}.0") }
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_yaml_document() {
        let doc = from_yaml("swagger: '2.0'\nhost: api.example.com\npaths: {}\n").unwrap();
        assert_eq!(doc["host"], "api.example.com");
        assert!(doc["paths"].is_object());
    }

    #[test]
    fn parse_json_document() {
        let doc = from_json(r#"{"openapi":"3.0.0","paths":{}}"#).unwrap();
        assert_eq!(doc["openapi"], "3.0.0");
    }

    #[test]
    fn parse_rejects_non_mapping() {
        assert!(matches!(from_json("[1, 2]"), Err(ParseError::NotAMapping)));
        assert!(matches!(from_yaml("just a string"), Err(ParseError::NotAMapping)));
    }

    #[test]
    fn parse_reports_syntax_errors() {
        assert!(matches!(from_json("{"), Err(ParseError::Json(_))));
        assert!(matches!(from_yaml("a: [b"), Err(ParseError::Yaml(_))));
    }

    #[test]
    fn detect_versions() {
        assert_eq!(
            SpecVersion::detect(&json!({"swagger": "2.0"})).unwrap(),
            SpecVersion::Swagger2
        );
        assert_eq!(
            SpecVersion::detect(&json!({"openapi": "3.0.3"})).unwrap(),
            SpecVersion::OpenApi3
        );
        assert_eq!(
            SpecVersion::detect(&json!({"swagger": 2.0})).unwrap(),
            SpecVersion::Swagger2
        );
    }

    #[test]
    fn detect_rejects_unknown_versions() {
        let err = SpecVersion::detect(&json!({"openapi": "4.0"})).unwrap_err();
        assert!(err.to_string().contains("4.0"));
        assert!(SpecVersion::detect(&json!({"paths": {}})).is_err());
    }
}
