use serde::Deserialize;
use serde_json::Value;

/// A server URL definition (3.0 `servers` entry).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    pub url: String,

    pub description: Option<String>,
}

/// The first declared server entry, if the document has a non-empty `servers` list.
pub fn first_server(document: &Value) -> Option<&Value> {
    document.get("servers")?.as_array()?.first()
}
