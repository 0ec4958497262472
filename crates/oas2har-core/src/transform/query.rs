use indexmap::IndexMap;
use serde_json::Value;

use crate::har::NameValue;
use crate::parse::parameter::{Parameter, ParameterLocation};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::security::{ApiKeyLocation, AuthCandidate};

use super::OperationContext;
use super::auth::security_candidates;
use super::params::{MergedEntries, operation_level, path_level, placeholder, stringify};

/// Caller-supplied query values, keyed by exact parameter name.
pub type QueryOverrides = IndexMap<String, Value>;

pub const API_KEY_PLACEHOLDER: &str = "REPLACE_KEY_VALUE";

/// Build the query string of one operation.
///
/// Path-level parameters come first; an operation-level parameter with the
/// same name (compared case-insensitively) replaces it and moves to the end.
/// Query-located API keys from the active security requirements are appended
/// last unless a parameter already supplies them.
pub fn query_string<'a>(
    ctx: &OperationContext<'a>,
    resolver: &mut RefResolver<'a>,
    overrides: Option<&QueryOverrides>,
) -> Vec<NameValue> {
    let mut merged = MergedEntries::default();

    for param in path_level(ctx, resolver) {
        if param.is_in(ParameterLocation::Query) {
            merged.insert(entry(&param, overrides));
        }
    }
    for param in operation_level(ctx, resolver) {
        if param.is_in(ParameterLocation::Query) {
            merged.override_with(entry(&param, overrides));
        }
    }

    for candidate in security_candidates(ctx, resolver) {
        if let AuthCandidate::ApiKey {
            location: ApiKeyLocation::Query,
            name,
        } = candidate
        {
            if !merged.contains(&name) {
                merged.insert(NameValue::new(name, API_KEY_PLACEHOLDER));
            }
        }
    }

    merged.into_vec()
}

fn entry(param: &Parameter, overrides: Option<&QueryOverrides>) -> NameValue {
    let value = overrides
        .and_then(|o| o.get(&param.name))
        .or(param.default_value.as_ref())
        .or_else(|| param.schema_example())
        .map(stringify)
        .unwrap_or_else(|| placeholder(param));
    NameValue::new(param.name.clone(), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::with_operation;
    use serde_json::json;

    fn build(doc: &Value, overrides: Option<&QueryOverrides>) -> Vec<NameValue> {
        with_operation(doc, "/pets", "get", |ctx, resolver| {
            query_string(ctx, resolver, overrides)
        })
    }

    #[test]
    fn value_precedence() {
        let doc = json!({"paths": {"/pets": {"get": {"parameters": [
            {"name": "limit", "in": "query", "type": "integer", "default": 20},
            {"name": "sort", "in": "query", "schema": {"type": "string", "example": "name"}},
            {"name": "since", "in": "query", "type": "string", "format": "date-time"},
            {"name": "tags", "in": "query", "schema": {"type": "array"}},
            {"name": "X-Trace", "in": "header", "type": "string"}
        ]}}}});

        assert_eq!(
            build(&doc, None),
            vec![
                NameValue::new("limit", "20"),
                NameValue::new("sort", "name"),
                NameValue::new("since", "SOME_STRING_VALUE"),
                NameValue::new("tags", "SOME_ARRAY_VALUE"),
            ]
        );

        let overrides: QueryOverrides =
            [("limit".to_string(), json!(5)), ("Sort".to_string(), json!("ignored"))]
                .into_iter()
                .collect();
        let query = build(&doc, Some(&overrides));
        assert_eq!(query[0], NameValue::new("limit", "5"));
        assert_eq!(query[1], NameValue::new("sort", "name"));
    }

    #[test]
    fn operation_level_wins_and_moves_to_end() {
        let doc = json!({"paths": {"/pets": {
            "parameters": [
                {"name": "Foo", "in": "query", "default": "path"},
                {"name": "bar", "in": "query", "default": "path"}
            ],
            "get": {"parameters": [{"name": "foo", "in": "query", "default": "operation"}]}
        }}});
        assert_eq!(
            build(&doc, None),
            vec![
                NameValue::new("bar", "path"),
                NameValue::new("foo", "operation"),
            ]
        );
    }

    #[test]
    fn appends_query_api_key() {
        let doc = json!({
            "securityDefinitions": {"key": {"type": "apiKey", "in": "query", "name": "api_key"}},
            "security": [{"key": []}],
            "paths": {"/pets": {"get": {"parameters": [
                {"name": "limit", "in": "query", "type": "integer"}
            ]}}}
        });
        assert_eq!(
            build(&doc, None),
            vec![
                NameValue::new("limit", "SOME_INTEGER_VALUE"),
                NameValue::new("api_key", API_KEY_PLACEHOLDER),
            ]
        );
    }

    #[test]
    fn declared_parameter_shadows_api_key() {
        let doc = json!({
            "securityDefinitions": {"key": {"type": "apiKey", "in": "query", "name": "api_key"}},
            "paths": {"/pets": {"get": {
                "security": [{"key": []}],
                "parameters": [{"name": "API_KEY", "in": "query", "default": "abc"}]
            }}}
        });
        assert_eq!(build(&doc, None), vec![NameValue::new("API_KEY", "abc")]);
    }

    #[test]
    fn no_parameters_yields_empty_query() {
        let doc = json!({"paths": {"/pets": {"get": {}}}});
        assert!(build(&doc, None).is_empty());
    }
}
