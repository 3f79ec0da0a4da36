use crate::contract::{ContractError, ContractValidator, RecordingSink};
use crate::exchange::{ContractRequest, ContractResponse};
use crate::otel::{init_logging_with_config, LogConfig};
use crate::runtime_config::ContractConfig;
use crate::spec_cache::{fingerprint_dir, spec_dir, SpecValidatorCache};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use http::Method;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line interface for BRRTRouter contract testing
#[derive(Parser, Debug)]
#[command(name = "brrtrouter-contract")]
#[command(about = "OpenAPI contract checks and spec cache tooling", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub cache: CacheArgs,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the spec cache configuration taken from the environment
#[derive(Args, Debug, Default)]
pub struct CacheArgs {
    /// Directory for durable cache entries (default: BRRTR_CONTRACT_CACHE_DIR or temp dir)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Execution-partition token (default: BRRTR_CONTRACT_PARTITION or TEST_TOKEN)
    #[arg(long, global = true)]
    pub partition: Option<String>,

    /// Keep validators in memory only
    #[arg(long, global = true, default_value_t = false)]
    pub no_cache: bool,
}

impl CacheArgs {
    pub fn config(&self) -> ContractConfig {
        if self.no_cache {
            return ContractConfig::memory_only();
        }
        let mut config = ContractConfig::from_env();
        if let Some(dir) = &self.cache_dir {
            config = config.with_cache_dir(dir);
        }
        if let Some(partition) = &self.partition {
            config = config.with_partition(partition);
        }
        config
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the fingerprint of the directory holding a spec document
    Fingerprint {
        /// Path to the OpenAPI specification file (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,
    },
    /// Print where the durable cache entry for a spec document lives
    CachePath {
        #[arg(short, long)]
        spec: PathBuf,
    },
    /// Build (or load) the validator for a spec and compile every body schema
    Warm {
        #[arg(short, long)]
        spec: PathBuf,
    },
    /// List the operations and documented bodies of a spec
    Check {
        #[arg(short, long)]
        spec: PathBuf,
    },
    /// Validate a recorded exchange against a spec
    ///
    /// The exchange file is JSON:
    /// `{"request": {"method", "uri", "route"?, "headers"?, "body"?},
    ///   "response": {"status", "headers"?, "body"?}}`.
    /// String bodies are sent as-is, any other JSON value is serialized.
    Validate {
        #[arg(short, long)]
        spec: PathBuf,

        /// Path to the recorded exchange
        #[arg(short, long)]
        exchange: PathBuf,

        /// Validate against this path template instead of the recorded route
        #[arg(long)]
        force_path: Option<String>,
    },
}

/// Parse arguments, set up logging and run the chosen command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = init_logging_with_config(&LogConfig::from_env("warn")) {
        eprintln!("Warning: {e:#}");
    }
    execute(&cli, &mut io::stdout().lock())
}

/// Run `cli`, writing command output to `out`.
///
/// # Errors
///
/// Spec load failures, unreadable exchange files and contract mismatches.
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = cli.cache.config();
    match &cli.command {
        Commands::Fingerprint { spec } => {
            let dir = spec_dir(spec);
            let fingerprint = fingerprint_dir(&dir)
                .with_context(|| format!("cannot fingerprint {}", dir.display()))?;
            writeln!(out, "{fingerprint}")?;
        }
        Commands::CachePath { spec } => {
            let cache: SpecValidatorCache = SpecValidatorCache::new(&config);
            let path = cache
                .entry_path(spec)
                .ok_or_else(|| anyhow!("the durable spec cache is disabled"))?;
            writeln!(out, "{}", path.display())?;
        }
        Commands::Warm { spec } => {
            let cache: SpecValidatorCache = SpecValidatorCache::new(&config);
            let validator = cache
                .from_path(spec)
                .with_context(|| format!("cannot load {}", spec.display()))?;
            let (compiled, failures) = validator.schemas().precompile(validator.operations());
            writeln!(
                out,
                "{}: {} operations, {} schemas compiled",
                validator.title(),
                validator.operations().len(),
                compiled
            )?;
            if let Some(entry) = cache.entry_path(spec) {
                writeln!(out, "cache entry: {}", entry.display())?;
            }
            if !failures.is_empty() {
                for failure in &failures {
                    writeln!(out, "  ✗ {failure}")?;
                }
                bail!("{} schema(s) failed to compile", failures.len());
            }
        }
        Commands::Check { spec } => {
            let cache: SpecValidatorCache = SpecValidatorCache::new(&config);
            let validator = cache
                .from_path(spec)
                .with_context(|| format!("cannot load {}", spec.display()))?;
            writeln!(out, "{} ({})", validator.title(), validator.document().display())?;
            for op in validator.operations() {
                let statuses: Vec<&str> = op.responses.keys().map(String::as_str).collect();
                writeln!(
                    out,
                    "  {:<7} {:<40} {:<24} request: {:<3} responses: {}",
                    op.method,
                    op.path_template,
                    op.operation_id.as_deref().unwrap_or("-"),
                    if op.request_body.is_some() { "yes" } else { "no" },
                    statuses.join(",")
                )?;
            }
        }
        Commands::Validate {
            spec,
            exchange,
            force_path,
        } => {
            let (request, response) = read_exchange(exchange)?;
            let mut contract = ContractValidator::new(spec.clone())
                .with_cache(Arc::new(SpecValidatorCache::new(&config)))
                .with_sink(RecordingSink::default());
            if let Some(path) = force_path {
                contract.force_openapi_path(path.as_str());
            }
            match contract.validate_exchange(&request, &response, &request.method) {
                Ok(()) => writeln!(out, "✓ {} {} conforms to {}", request.method, request.uri, spec.display())?,
                Err(ContractError::Mismatch(report)) => {
                    writeln!(out, "✗ {} {}", request.method, request.uri)?;
                    writeln!(out, "{}", report.message)?;
                    bail!("{} does not match the contract", report.kind);
                }
                Err(other) => return Err(other.into()),
            }
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RecordedExchange {
    request: RecordedRequest,
    response: RecordedResponse,
}

#[derive(Debug, Deserialize)]
struct RecordedRequest {
    method: String,
    uri: String,
    #[serde(default)]
    route: Option<String>,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    body: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RecordedResponse {
    status: u16,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    body: Option<Value>,
}

/// Body bytes and the content type implied by a recorded JSON body.
fn recorded_body(body: Option<Value>) -> (Vec<u8>, Option<&'static str>) {
    match body {
        None | Some(Value::Null) => (Vec::new(), None),
        Some(Value::String(s)) => (s.into_bytes(), None),
        Some(other) => (other.to_string().into_bytes(), Some("application/json")),
    }
}

fn read_exchange(path: &Path) -> Result<(ContractRequest, ContractResponse)> {
    let raw = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let recorded: RecordedExchange = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not a recorded exchange", path.display()))?;

    let method = Method::from_bytes(recorded.request.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid method {:?}", recorded.request.method))?;
    let mut request = ContractRequest::new(method, recorded.request.uri);
    if let Some(route) = recorded.request.route {
        request = request.with_route_template(route);
    }
    let (body, implied) = recorded_body(recorded.request.body);
    if let Some(content_type) = implied {
        request = request.with_header("content-type", content_type);
    }
    for (name, value) in recorded.request.headers {
        request = request.with_header(name, value);
    }
    request = request.with_body(body);

    let mut response = ContractResponse::new(recorded.response.status);
    let (body, implied) = recorded_body(recorded.response.body);
    if let Some(content_type) = implied {
        response = response.with_header("content-type", content_type);
    }
    for (name, value) in recorded.response.headers {
        response = response.with_header(name, value);
    }
    response = response.with_body(body);

    Ok((request, response))
}
