use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::sampler::SampleOptions;

/// Top-level project configuration loaded from `.oas2har.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Oas2HarConfig {
    pub input: String,
    pub format: OutputFormat,
    /// Query values applied to every `endpoint` invocation, keyed by parameter name.
    pub query: IndexMap<String, serde_json::Value>,
    pub sampler: SamplerConfig,
}

impl Default for Oas2HarConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            format: OutputFormat::Json,
            query: IndexMap::new(),
            sampler: SamplerConfig::default(),
        }
    }
}

/// How HAR output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Knobs forwarded to the schema sampler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub skip_read_only: bool,
    pub skip_write_only: bool,
    pub max_depth: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        let options = SampleOptions::default();
        Self {
            skip_read_only: options.skip_read_only,
            skip_write_only: options.skip_write_only,
            max_depth: options.max_depth,
        }
    }
}

impl SamplerConfig {
    pub fn to_options(&self) -> SampleOptions {
        SampleOptions {
            skip_read_only: self.skip_read_only,
            skip_write_only: self.skip_write_only,
            max_depth: self.max_depth,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oas2har.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<Oas2HarConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: Oas2HarConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oas2har configuration
input: openapi.yaml
format: json          # json | yaml

# Values substituted for query parameters of the same name.
query: {}
  # limit: 10
  # status: available

sampler:
  skip_read_only: true
  skip_write_only: false
  max_depth: 16
"#
}
