use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document root must be a mapping")]
    NotAMapping,

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

/// Failures reported by a [`SchemaSampler`](crate::sampler::SchemaSampler).
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("cannot sample through reference: {0}")]
    Reference(String),

    #[error("schema nesting exceeds depth {0}")]
    DepthExceeded(usize),

    #[error("unsupported schema type: {0}")]
    UnsupportedType(String),

    #[error("`{keyword}` of {value} exceeds the sampling limit of {limit}")]
    LimitExceeded {
        keyword: &'static str,
        value: u64,
        limit: u64,
    },

    #[error("no {0} satisfies the declared bounds")]
    Unsatisfiable(&'static str),
}

#[derive(Debug, Error)]
pub enum HarError {
    #[error("unresolvable reference: {0}")]
    ReferenceUnresolvable(String),

    #[error("reference resolution depth exceeded: {0}")]
    ReferenceDepthExceeded(String),

    #[error("sampling failed: {0}")]
    SamplingFailed(#[from] SampleError),

    #[error("malformed document: {0}")]
    DocumentMalformed(String),

    #[error("no operation for {method} {path}")]
    OperationNotFound { path: String, method: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
