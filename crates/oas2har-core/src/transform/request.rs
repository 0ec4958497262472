use log::{debug, error, warn};
use serde_json::Value;

use crate::error::HarError;
use crate::har::{EndpointHar, HTTP_VERSION, HarRequest};
use crate::parse::ref_resolve::RefResolver;
use crate::sampler::{DefaultSampler, SampleOptions, SchemaSampler};

use super::OperationContext;
use super::base_url::base_url;
use super::headers::headers;
use super::path::render_path;
use super::payload::payload;
use super::query::{QueryOverrides, query_string};

/// Path item keys that name operations, in the order they are listed.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

pub const NO_DESCRIPTION: &str = "No description available";

/// Synthesizes HAR requests from one API document.
///
/// The document is borrowed and never modified, so one synthesizer can serve
/// any number of calls.
pub struct Synthesizer<'a, S: SchemaSampler = DefaultSampler> {
    document: &'a Value,
    sampler: S,
    options: SampleOptions,
}

impl<'a> Synthesizer<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self {
            document,
            sampler: DefaultSampler,
            options: SampleOptions::default(),
        }
    }
}

impl<'a, S: SchemaSampler> Synthesizer<'a, S> {
    /// Replace the schema sampler used for request bodies.
    pub fn with_sampler<T: SchemaSampler>(self, sampler: T) -> Synthesizer<'a, T> {
        Synthesizer {
            document: self.document,
            sampler,
            options: self.options,
        }
    }

    pub fn with_sample_options(mut self, options: SampleOptions) -> Self {
        self.options = options;
        self
    }

    /// Synthesize the request for one path/method pair.
    pub fn endpoint(
        &self,
        path: &str,
        method: &str,
        overrides: Option<&QueryOverrides>,
    ) -> Result<HarRequest, HarError> {
        let not_found = || HarError::OperationNotFound {
            path: path.to_string(),
            method: method.to_string(),
        };
        let mut resolver = RefResolver::new(self.document);
        let (key, item) = self
            .paths()?
            .iter()
            .find(|(key, _)| key.as_str() == path)
            .ok_or_else(not_found)?;
        let path_item = resolver.resolve_value(item)?;
        let (method_key, operation) =
            lookup_operation(path_item, method).ok_or_else(not_found)?;

        let ctx = OperationContext {
            document: self.document,
            path: key.as_str(),
            method: method_key,
            path_item,
            operation,
        };
        Ok(self.build(&ctx, &mut resolver, overrides))
    }

    /// Synthesize every operation of the document, paths in document order
    /// and methods in declaration order.
    ///
    /// The first failure aborts the whole batch.
    pub fn all(&self) -> Result<Vec<EndpointHar>, HarError> {
        self.try_all().inspect_err(|e| error!("failed to synthesize requests: {e}"))
    }

    fn try_all(&self) -> Result<Vec<EndpointHar>, HarError> {
        let mut resolver = RefResolver::new(self.document);
        let mut entries = Vec::new();

        for (path, item) in self.paths()? {
            let path_item = resolver.resolve_value(item)?;
            let Some(operations) = path_item.as_object() else {
                return Err(HarError::DocumentMalformed(format!(
                    "path item `{path}` is not a mapping"
                )));
            };

            for (method, operation) in operations {
                if !HTTP_METHODS.contains(&method.as_str()) {
                    continue;
                }
                let ctx = OperationContext {
                    document: self.document,
                    path: path.as_str(),
                    method: method.as_str(),
                    path_item,
                    operation,
                };
                let har = self.build(&ctx, &mut resolver, None);
                let description = operation
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or(NO_DESCRIPTION)
                    .to_string();
                entries.push(EndpointHar {
                    method: har.method.clone(),
                    url: har.url.clone(),
                    description,
                    har,
                });
            }
        }

        debug!("synthesized {} requests", entries.len());
        Ok(entries)
    }

    fn build(
        &self,
        ctx: &OperationContext<'a>,
        resolver: &mut RefResolver<'a>,
        overrides: Option<&QueryOverrides>,
    ) -> HarRequest {
        let url = format!("{}{}", base_url(ctx.document), render_path(ctx, resolver));
        let headers = headers(ctx, resolver);
        let query_string = query_string(ctx, resolver, overrides);
        let post_data = match payload(ctx, resolver, &self.sampler, &self.options) {
            Ok(post_data) => post_data,
            Err(e) => {
                warn!("{} {}: omitting request body: {e}", ctx.path, ctx.method);
                None
            }
        };

        HarRequest {
            method: ctx.method.to_uppercase(),
            url,
            http_version: HTTP_VERSION.to_string(),
            cookies: Vec::new(),
            headers,
            query_string,
            post_data,
            headers_size: 0,
            body_size: 0,
        }
    }

    fn paths(&self) -> Result<&'a serde_json::Map<String, Value>, HarError> {
        self.document
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| HarError::DocumentMalformed("document has no `paths` mapping".into()))
    }
}

/// Find the operation for `method`: the exact key first, then lower-cased.
fn lookup_operation<'a>(path_item: &'a Value, method: &str) -> Option<(&'a str, &'a Value)> {
    let operations = path_item.as_object()?;
    let lowered = method.to_ascii_lowercase();
    [method, lowered.as_str()]
        .into_iter()
        .filter(|m| HTTP_METHODS.contains(&m.to_ascii_lowercase().as_str()))
        .find_map(|m| operations.iter().find(|(key, _)| key.as_str() == m))
        .map(|(key, operation)| (key.as_str(), operation))
}
