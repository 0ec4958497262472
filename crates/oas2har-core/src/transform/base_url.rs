use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::parse::server::{Server, first_server};

/// Scheme, host and base path every request URL starts with.
///
/// A 3.0 document's first `servers` entry is used verbatim. Otherwise the URL
/// is assembled from the 2.0 `schemes`/`host`/`basePath` fields, defaulting the
/// scheme to `http` and dropping a base path of `/`.
pub fn base_url(document: &Value) -> String {
    if let Some(server) = first_server(document) {
        return match Server::deserialize(server) {
            Ok(server) => server.url,
            Err(e) => {
                warn!("first server entry is malformed: {e}");
                String::new()
            }
        };
    }

    let scheme = document
        .get("schemes")
        .and_then(Value::as_array)
        .and_then(|schemes| schemes.first())
        .and_then(Value::as_str)
        .unwrap_or("http");
    let host = document
        .get("host")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match document.get("basePath").and_then(Value::as_str) {
        Some(base_path) if base_path != "/" => format!("{scheme}://{host}{base_path}"),
        _ => format!("{scheme}://{host}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn v3_server_is_verbatim() {
        let doc = json!({
            "servers": [{"url": "https://x.io"}, {"url": "https://y.io"}],
            "host": "ignored.example.com",
            "schemes": ["ftp"]
        });
        assert_eq!(base_url(&doc), "https://x.io");

        let templated = json!({"servers": [{"url": "https://{region}.x.io/v1/"}]});
        assert_eq!(base_url(&templated), "https://{region}.x.io/v1/");
    }

    #[test]
    fn v2_defaults_to_http() {
        let doc = json!({"host": "api.example.com", "basePath": "/v1"});
        assert_eq!(base_url(&doc), "http://api.example.com/v1");
    }

    #[test]
    fn v2_uses_first_scheme() {
        let doc = json!({"host": "api.example.com", "schemes": ["https", "http"]});
        assert_eq!(base_url(&doc), "https://api.example.com");
    }

    #[test]
    fn v2_drops_root_base_path() {
        let doc = json!({"host": "api.example.com", "basePath": "/"});
        assert_eq!(base_url(&doc), "http://api.example.com");
    }

    #[test]
    fn empty_servers_falls_back_to_v2_fields() {
        let doc = json!({"servers": [], "host": "h.io"});
        assert_eq!(base_url(&doc), "http://h.io");
    }

    #[test]
    fn malformed_server_yields_empty_base() {
        let doc = json!({"servers": [{"description": "no url"}]});
        assert_eq!(base_url(&doc), "");
    }
}
