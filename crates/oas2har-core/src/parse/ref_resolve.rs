use std::collections::HashMap;

use log::debug;
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::error::HarError;

/// Maximum number of `$ref` hops followed for a single lookup.
pub const MAX_REF_DEPTH: usize = 32;

/// Resolves local `#/...` references against one document.
///
/// The document is never modified. Resolved targets are remembered per
/// reference string, so repeated lookups of the same reference are a map hit.
/// A target that is itself a reference is followed until a non-reference value
/// is reached or [`MAX_REF_DEPTH`] hops have been taken, which also rejects
/// cyclic chains.
pub struct RefResolver<'a> {
    document: &'a Value,
    cache: HashMap<String, &'a Value>,
}

impl<'a> RefResolver<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self {
            document,
            cache: HashMap::new(),
        }
    }

    pub fn document(&self) -> &'a Value {
        self.document
    }

    /// Resolve a reference string such as `#/components/schemas/Pet`.
    pub fn resolve(&mut self, reference: &str) -> Result<&'a Value, HarError> {
        if let Some(hit) = self.cache.get(reference) {
            return Ok(*hit);
        }

        let mut current = reference;
        for _ in 0..MAX_REF_DEPTH {
            let target = lookup(self.document, current)?;
            match ref_of(target) {
                Some(next) => {
                    debug!("{current} points at {next}");
                    current = next;
                }
                None => {
                    self.cache.insert(reference.to_string(), target);
                    return Ok(target);
                }
            }
        }

        Err(HarError::ReferenceDepthExceeded(reference.to_string()))
    }

    /// Resolve `value` if it is a `{"$ref": ...}` object, otherwise return it unchanged.
    pub fn resolve_value(&mut self, value: &'a Value) -> Result<&'a Value, HarError> {
        match ref_of(value) {
            Some(reference) => self.resolve(reference),
            None => Ok(value),
        }
    }
}

/// The `$ref` string of a reference object, if `value` is one.
pub fn ref_of(value: &Value) -> Option<&str> {
    value.get("$ref")?.as_str()
}

fn lookup<'a>(document: &'a Value, reference: &str) -> Result<&'a Value, HarError> {
    let unresolvable = || HarError::ReferenceUnresolvable(reference.to_string());

    let pointer = reference.strip_prefix('#').ok_or_else(unresolvable)?;
    let segments: Vec<String> = pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(decode_segment)
        .collect();
    if segments.is_empty() {
        return Err(unresolvable());
    }

    let mut current = document;
    for segment in &segments {
        current = match current {
            Value::Object(map) => map.get(segment.as_str()),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(unresolvable)?;
    }
    Ok(current)
}

/// Decodes a JSON Pointer segment (`~1`, `~0`, then percent escapes).
fn decode_segment(segment: &str) -> String {
    let unescaped = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&unescaped)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "definitions": {
                "Pet": { "type": "object", "properties": { "name": { "type": "string" } } },
                "Alias": { "$ref": "#/definitions/Pet" },
                "AliasOfAlias": { "$ref": "#/definitions/Alias" },
                "Loop": { "$ref": "#/definitions/Loop" },
                "a/b": { "type": "string" },
                "til~de": { "type": "integer" }
            },
            "paths": {
                "/pets/{id}": {
                    "parameters": [
                        { "name": "id", "in": "path" },
                        { "name": "verbose", "in": "query" }
                    ]
                }
            }
        })
    }

    #[test]
    fn resolves_simple_pointer() {
        let doc = document();
        let mut resolver = RefResolver::new(&doc);
        let pet = resolver.resolve("#/definitions/Pet").unwrap();
        assert_eq!(pet["type"], "object");
    }

    #[test]
    fn follows_reference_chains() {
        let doc = document();
        let mut resolver = RefResolver::new(&doc);
        let pet = resolver.resolve("#/definitions/AliasOfAlias").unwrap();
        assert_eq!(pet["properties"]["name"]["type"], "string");
    }

    #[test]
    fn decodes_escaped_segments() {
        let doc = document();
        let mut resolver = RefResolver::new(&doc);
        assert_eq!(resolver.resolve("#/definitions/a~1b").unwrap()["type"], "string");
        assert_eq!(resolver.resolve("#/definitions/til~0de").unwrap()["type"], "integer");
        let param = resolver
            .resolve("#/paths/~1pets~1%7Bid%7D/parameters/1")
            .unwrap();
        assert_eq!(param["name"], "verbose");
    }

    #[test]
    fn rejects_cyclic_chain() {
        let doc = document();
        let mut resolver = RefResolver::new(&doc);
        let err = resolver.resolve("#/definitions/Loop").unwrap_err();
        assert!(matches!(err, HarError::ReferenceDepthExceeded(_)));
    }

    #[test]
    fn rejects_empty_pointer() {
        let doc = document();
        let mut resolver = RefResolver::new(&doc);
        assert!(matches!(
            resolver.resolve("#"),
            Err(HarError::ReferenceUnresolvable(_))
        ));
        assert!(matches!(
            resolver.resolve("#/"),
            Err(HarError::ReferenceUnresolvable(_))
        ));
    }

    #[test]
    fn rejects_external_and_missing_targets() {
        let doc = document();
        let mut resolver = RefResolver::new(&doc);
        assert!(matches!(
            resolver.resolve("common.yaml#/definitions/Pet"),
            Err(HarError::ReferenceUnresolvable(_))
        ));
        assert!(matches!(
            resolver.resolve("#/definitions/Missing"),
            Err(HarError::ReferenceUnresolvable(_))
        ));
        assert!(matches!(
            resolver.resolve("#/paths/~1pets~1%7Bid%7D/parameters/7"),
            Err(HarError::ReferenceUnresolvable(_))
        ));
    }

    #[test]
    fn repeated_lookups_return_same_target() {
        let doc = document();
        let mut resolver = RefResolver::new(&doc);
        let first = resolver.resolve("#/definitions/Alias").unwrap();
        let second = resolver.resolve("#/definitions/Alias").unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first, &doc["definitions"]["Pet"]));
    }

    #[test]
    fn resolve_value_passes_through_non_references() {
        let doc = document();
        let inline = json!({ "type": "string" });
        let reference = json!({ "$ref": "#/definitions/Pet" });
        let mut resolver = RefResolver::new(&doc);
        assert_eq!(resolver.resolve_value(&inline).unwrap(), &inline);
        assert_eq!(resolver.resolve_value(&reference).unwrap()["type"], "object");
    }
}
