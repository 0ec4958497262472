use serde::Deserialize;
use serde_json::Value;

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    Body,
    #[serde(rename = "formData", alias = "formdata")]
    FormData,
    #[serde(other)]
    Unknown,
}

/// A resolved parameter of either format revision.
///
/// Swagger 2.0 puts primitive types directly on the parameter (`type`,
/// `default`), OpenAPI 3.0 nests them under `schema`. Both shapes are kept so
/// callers can fall back from one to the other.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "in")]
    pub location: Option<ParameterLocation>,

    #[serde(rename = "type")]
    pub param_type: Option<Value>,

    pub schema: Option<Value>,

    #[serde(rename = "default")]
    pub default_value: Option<Value>,

    pub example: Option<Value>,

    #[serde(default)]
    pub required: bool,

    pub description: Option<String>,
}

impl Parameter {
    pub fn is_in(&self, location: ParameterLocation) -> bool {
        self.location == Some(location)
    }

    /// The declared primitive type: `type`, else `schema.type`.
    pub fn type_name(&self) -> Option<&str> {
        self.param_type
            .as_ref()
            .and_then(first_type)
            .or_else(|| self.schema.as_ref()?.get("type").and_then(first_type))
    }

    pub fn schema_example(&self) -> Option<&Value> {
        self.schema.as_ref()?.get("example")
    }
}

/// Read a `type` keyword, taking the first non-`null` member of a type array.
pub fn first_type(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Parameter {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn reads_swagger2_primitive() {
        let p = parse(json!({"name": "limit", "in": "query", "type": "integer", "default": 20}));
        assert!(p.is_in(ParameterLocation::Query));
        assert_eq!(p.type_name(), Some("integer"));
        assert_eq!(p.default_value, Some(json!(20)));
        assert!(!p.required);
    }

    #[test]
    fn reads_openapi3_schema_type() {
        let p = parse(json!({
            "name": "X-Trace",
            "in": "header",
            "required": true,
            "schema": {"type": ["null", "string"], "example": "abc"}
        }));
        assert!(p.is_in(ParameterLocation::Header));
        assert_eq!(p.type_name(), Some("string"));
        assert_eq!(p.schema_example(), Some(&json!("abc")));
        assert!(p.required);
    }

    #[test]
    fn accepts_form_data_spellings() {
        assert!(parse(json!({"name": "a", "in": "formData"})).is_in(ParameterLocation::FormData));
        assert!(parse(json!({"name": "a", "in": "formdata"})).is_in(ParameterLocation::FormData));
    }

    #[test]
    fn unknown_location_and_missing_fields() {
        let p = parse(json!({"name": "a", "in": "matrix"}));
        assert!(p.is_in(ParameterLocation::Unknown));

        let empty = parse(json!({}));
        assert_eq!(empty.name, "");
        assert_eq!(empty.location, None);
        assert_eq!(empty.type_name(), None);
    }
}
