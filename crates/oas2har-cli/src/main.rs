use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_json::Value;

use oas2har_core::config::{self, CONFIG_FILE_NAME, Oas2HarConfig, OutputFormat};
use oas2har_core::parse::{self, SpecVersion};
use oas2har_core::transform::HTTP_METHODS;
use oas2har_core::{QueryOverrides, Synthesizer};

#[derive(Parser)]
#[command(name = "oas2har", about = "OpenAPI/Swagger to HAR request synthesizer", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the HAR request for one operation
    Endpoint {
        /// Path to the API document (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Path template as declared in the document, e.g. /pets/{id}
        #[arg(long)]
        path: String,

        /// HTTP method of the operation
        #[arg(long)]
        method: String,

        /// Query parameter value, as name=value (repeatable)
        #[arg(long = "query", value_parser = parse_query_pair)]
        query: Vec<(String, String)>,

        /// Output format
        #[arg(long)]
        format: Option<Format>,
    },

    /// Synthesize HAR requests for every operation
    All {
        /// Path to the API document (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long)]
        format: Option<Format>,
    },

    /// Validate an API document
    Validate {
        /// Path to the API document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Initialize a new oas2har configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Format::Json,
            OutputFormat::Yaml => Format::Yaml,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Endpoint {
            input,
            path,
            method,
            query,
            format,
        } => cmd_endpoint(input, &path, &method, query, format),

        Commands::All { input, format } => cmd_all(input, format),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oas2har", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<Oas2HarConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    let cfg = config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))?;
    if cfg.is_some() {
        log::debug!("loaded {}", config_path.display());
    }
    Ok(cfg)
}

/// A synthesizer carrying the sampler settings from `cfg`.
fn synthesizer<'a>(document: &'a Value, cfg: &Oas2HarConfig) -> Synthesizer<'a> {
    Synthesizer::new(document).with_sample_options(cfg.sampler.to_options())
}

fn parse_query_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got `{raw}`")),
    }
}

fn load_document(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let document = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(document)
}

fn print_output<T: serde::Serialize>(value: &T, format: Format) -> Result<()> {
    match format {
        Format::Yaml => {
            let yaml = serde_yaml_ng::to_string(value)?;
            print!("{}", yaml);
        }
        Format::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn cmd_endpoint(
    input: Option<PathBuf>,
    path: &str,
    method: &str,
    query: Vec<(String, String)>,
    format: Option<Format>,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let document = load_document(&input)?;

    // Config values first, command-line values on top.
    let mut overrides: QueryOverrides = cfg.query.clone();
    for (name, value) in query {
        overrides.insert(name, Value::String(value));
    }

    let har = synthesizer(&document, &cfg).endpoint(path, method, Some(&overrides))?;

    print_output(&har, format.unwrap_or_else(|| cfg.format.into()))
}

fn cmd_all(input: Option<PathBuf>, format: Option<Format>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let document = load_document(&input)?;

    let entries = synthesizer(&document, &cfg)
        .all()
        .with_context(|| format!("failed to synthesize requests for {}", input.display()))?;

    print_output(&entries, format.unwrap_or_else(|| cfg.format.into()))
}

fn cmd_validate(input: &Path) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let document = load_document(input)?;
    let version = SpecVersion::detect(&document)?;

    let title = document
        .pointer("/info/title")
        .and_then(Value::as_str)
        .unwrap_or("<untitled>");
    eprintln!("Valid {} document: {}", version.as_str(), title);

    let paths = document.get("paths").and_then(Value::as_object);
    let operations = paths
        .into_iter()
        .flat_map(|paths| paths.values())
        .filter_map(Value::as_object)
        .flat_map(|item| item.keys())
        .filter(|key| HTTP_METHODS.contains(&key.as_str()))
        .count();
    eprintln!("  Paths: {}", paths.map_or(0, |p| p.len()));
    eprintln!("  Operations: {}", operations);

    // Also check that every operation synthesizes.
    let entries = synthesizer(&document, &cfg).all()?;
    eprintln!("  Requests: {}", entries.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
