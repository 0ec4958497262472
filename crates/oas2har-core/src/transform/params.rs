use heck::ToShoutySnakeCase;
use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::har::NameValue;
use crate::parse::parameter::Parameter;
use crate::parse::ref_resolve::RefResolver;

use super::OperationContext;

/// Resolve and parse a `parameters` list. Entries whose reference cannot be
/// resolved, or that do not look like a parameter, are logged and dropped.
pub(crate) fn resolve_parameters<'a>(
    resolver: &mut RefResolver<'a>,
    list: Option<&'a Value>,
) -> Vec<Parameter> {
    let Some(entries) = list.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let value = match resolver.resolve_value(entry) {
                Ok(value) => value,
                Err(e) => {
                    warn!("skipping parameter: {e}");
                    return None;
                }
            };
            match Parameter::deserialize(value) {
                Ok(param) => Some(param),
                Err(e) => {
                    warn!("skipping malformed parameter: {e}");
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn path_level<'a>(
    ctx: &OperationContext<'a>,
    resolver: &mut RefResolver<'a>,
) -> Vec<Parameter> {
    resolve_parameters(resolver, ctx.path_item.get("parameters"))
}

pub(crate) fn operation_level<'a>(
    ctx: &OperationContext<'a>,
    resolver: &mut RefResolver<'a>,
) -> Vec<Parameter> {
    resolve_parameters(resolver, ctx.operation.get("parameters"))
}

/// Name/value pairs keyed by case-folded name, in insertion order.
///
/// Path-level entries go in with [`insert`](Self::insert); operation-level
/// entries go in with [`override_with`](Self::override_with), which replaces a
/// same-named entry and moves the winner to the end.
#[derive(Debug, Default)]
pub(crate) struct MergedEntries {
    entries: IndexMap<String, NameValue>,
}

impl MergedEntries {
    pub(crate) fn insert(&mut self, entry: NameValue) {
        self.entries.insert(entry.name.to_lowercase(), entry);
    }

    pub(crate) fn override_with(&mut self, entry: NameValue) {
        let key = entry.name.to_lowercase();
        self.entries.shift_remove(&key);
        self.entries.insert(key, entry);
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub(crate) fn into_vec(self) -> Vec<NameValue> {
        self.entries.into_values().collect()
    }
}

/// `SOME_<TYPE>_VALUE`, with `string` standing in for an undeclared type.
pub(crate) fn placeholder(param: &Parameter) -> String {
    placeholder_for(param.type_name().unwrap_or("string"))
}

pub(crate) fn placeholder_for(type_name: &str) -> String {
    format!("SOME_{}_VALUE", type_name.to_shouty_snake_case())
}

/// Render a JSON value as a HAR string: strings verbatim, everything else as JSON.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn override_moves_winner_to_end() {
        let mut merged = MergedEntries::default();
        merged.insert(NameValue::new("Foo", "path"));
        merged.insert(NameValue::new("bar", "path"));
        merged.override_with(NameValue::new("foo", "operation"));
        merged.override_with(NameValue::new("baz", "operation"));

        assert!(merged.contains("FOO"));
        assert_eq!(
            merged.into_vec(),
            vec![
                NameValue::new("bar", "path"),
                NameValue::new("foo", "operation"),
                NameValue::new("baz", "operation"),
            ]
        );
    }

    #[test]
    fn placeholders() {
        assert_eq!(placeholder_for("integer"), "SOME_INTEGER_VALUE");
        assert_eq!(placeholder_for("date-time"), "SOME_DATE_TIME_VALUE");
        let untyped: Parameter = serde_json::from_value(json!({"name": "q", "in": "query"})).unwrap();
        assert_eq!(placeholder(&untyped), "SOME_STRING_VALUE");
    }

    #[test]
    fn stringify_values() {
        assert_eq!(stringify(&json!("abc")), "abc");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn resolves_and_drops_bad_entries() {
        let doc = json!({
            "parameters": {"limit": {"name": "limit", "in": "query", "type": "integer"}},
            "list": [
                {"$ref": "#/parameters/limit"},
                {"$ref": "#/parameters/missing"},
                {"$ref": "#"},
                "not a parameter",
                {"name": "offset", "in": "query"}
            ]
        });
        let mut resolver = RefResolver::new(&doc);
        let params = resolve_parameters(&mut resolver, doc.get("list"));
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["limit", "offset"]);
    }
}
