pub mod config;
pub mod error;
pub mod har;
pub mod parse;
pub mod sampler;
pub mod transform;

use serde_json::Value;

pub use error::HarError;
pub use har::{EndpointHar, HarRequest};
pub use sampler::{DefaultSampler, SampleOptions, SchemaSampler};
pub use transform::{QueryOverrides, Synthesizer};

/// Synthesize the HAR request for one path/method pair with the default sampler.
pub fn get_endpoint(
    document: &Value,
    path: &str,
    method: &str,
    query_overrides: Option<&QueryOverrides>,
) -> Result<HarRequest, HarError> {
    Synthesizer::new(document).endpoint(path, method, query_overrides)
}

/// Synthesize a HAR request for every operation in the document.
pub fn get_all(document: &Value) -> Result<Vec<EndpointHar>, HarError> {
    Synthesizer::new(document).all()
}
