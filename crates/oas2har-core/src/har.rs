//! HAR request objects produced by the synthesizer.

use serde::{Deserialize, Serialize};

pub const HTTP_VERSION: &str = "HTTP/1.1";

/// A `{name, value}` pair used for headers, query strings, cookies and form params.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Request body of a HAR request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub mime_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<NameValue>,
}

impl PostData {
    pub fn json(text: String) -> Self {
        Self {
            mime_type: "application/json".to_string(),
            text: Some(text),
            params: Vec::new(),
        }
    }

    pub fn multipart() -> Self {
        Self {
            mime_type: "multipart/form-data".to_string(),
            text: None,
            params: Vec::new(),
        }
    }
}

/// One synthesized HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    pub http_version: String,
    pub cookies: Vec<NameValue>,
    pub headers: Vec<NameValue>,
    pub query_string: Vec<NameValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PostData>,
    pub headers_size: i64,
    pub body_size: i64,
}

impl HarRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// An entry of the document-wide listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointHar {
    pub method: String,
    pub url: String,
    pub description: String,
    pub har: HarRequest,
}
