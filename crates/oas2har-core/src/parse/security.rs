use serde::Deserialize;
use serde_json::{Map, Value};

/// Location of an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// A security scheme definition from `securityDefinitions` (2.0) or
/// `components.securitySchemes` (3.0).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type", default)]
    pub scheme_type: String,

    pub description: Option<String>,

    pub name: Option<String>,

    #[serde(rename = "in")]
    pub location: Option<String>,

    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat")]
    pub bearer_format: Option<String>,
}

/// The kind of credential a scheme asks the client to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCandidate {
    Basic,
    ApiKey {
        location: ApiKeyLocation,
        name: String,
    },
    Bearer,
}

impl SecurityScheme {
    /// Map the scheme onto the credential it needs. Schemes that carry no
    /// header or query credential (`openIdConnect`, `mutualTLS`, unknown
    /// http schemes) yield `None`.
    pub fn classify(&self) -> Option<AuthCandidate> {
        let http_scheme = self
            .scheme
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match self.scheme_type.to_ascii_lowercase().as_str() {
            "basic" => Some(AuthCandidate::Basic),
            "http" if http_scheme == "basic" => Some(AuthCandidate::Basic),
            "http" if http_scheme == "bearer" => Some(AuthCandidate::Bearer),
            "oauth2" => Some(AuthCandidate::Bearer),
            "apikey" => {
                let name = self.name.clone()?;
                let location = match self.location.as_deref()?.to_ascii_lowercase().as_str() {
                    "header" => ApiKeyLocation::Header,
                    "query" => ApiKeyLocation::Query,
                    "cookie" => ApiKeyLocation::Cookie,
                    _ => return None,
                };
                Some(AuthCandidate::ApiKey { location, name })
            }
            _ => None,
        }
    }
}

/// The document's scheme table, whichever revision declares it.
pub fn scheme_table(document: &Value) -> Option<&Map<String, Value>> {
    document
        .get("securityDefinitions")
        .or_else(|| document.pointer("/components/securitySchemes"))
        .and_then(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scheme(value: Value) -> SecurityScheme {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn classifies_basic_variants() {
        assert_eq!(scheme(json!({"type": "basic"})).classify(), Some(AuthCandidate::Basic));
        assert_eq!(
            scheme(json!({"type": "http", "scheme": "Basic"})).classify(),
            Some(AuthCandidate::Basic)
        );
    }

    #[test]
    fn classifies_bearer_variants() {
        assert_eq!(
            scheme(json!({"type": "http", "scheme": "bearer", "bearerFormat": "JWT"})).classify(),
            Some(AuthCandidate::Bearer)
        );
        assert_eq!(
            scheme(json!({"type": "oauth2", "flow": "implicit"})).classify(),
            Some(AuthCandidate::Bearer)
        );
    }

    #[test]
    fn classifies_api_keys() {
        assert_eq!(
            scheme(json!({"type": "apiKey", "in": "header", "name": "X-API-Key"})).classify(),
            Some(AuthCandidate::ApiKey {
                location: ApiKeyLocation::Header,
                name: "X-API-Key".to_string()
            })
        );
        assert_eq!(
            scheme(json!({"type": "apiKey", "in": "query", "name": "key"})).classify(),
            Some(AuthCandidate::ApiKey {
                location: ApiKeyLocation::Query,
                name: "key".to_string()
            })
        );
        assert_eq!(scheme(json!({"type": "apiKey", "in": "header"})).classify(), None);
    }

    #[test]
    fn ignores_schemes_without_credentials() {
        assert_eq!(
            scheme(json!({"type": "openIdConnect", "openIdConnectUrl": "https://x"})).classify(),
            None
        );
        assert_eq!(scheme(json!({"type": "http", "scheme": "digest"})).classify(), None);
    }

    #[test]
    fn finds_scheme_table_in_either_revision() {
        let v2 = json!({"securityDefinitions": {"basicAuth": {"type": "basic"}}});
        assert!(scheme_table(&v2).unwrap().contains_key("basicAuth"));

        let v3 = json!({"components": {"securitySchemes": {"bearer": {"type": "http"}}}});
        assert!(scheme_table(&v3).unwrap().contains_key("bearer"));

        assert!(scheme_table(&json!({})).is_none());
    }
}
