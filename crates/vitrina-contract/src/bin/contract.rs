//! vitrina-contract: verify that deployed facet schemas are fully wired to
//! the facet gate.
//!
//! Exit codes: 0 contract satisfied, 1 contract violation, 2 input error.
//!
//! Environment variables:
//!   LOG_FORMAT  - "json" or "text" (default: "text")
//!   RUST_LOG    - standard env filter (default: "warn")
//!   VITRINA_*   - client configuration used with `--api-base`

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrina_client::{ApiClient, ClientConfig, FacetSchemaClient};
use vitrina_contract::{check_contract, ContractError, ContractReport, RuleSource, SchemaPack};

const EXIT_VIOLATION: u8 = 1;
const EXIT_INPUT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "vitrina-contract")]
#[command(author, version, about = "Schema/UI contract checker for vitrina facet gating")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every declared facet type has a gating rule
    #[command(group(ArgGroup::new("input").required(true).args(["schema", "api_base"])))]
    Check {
        /// Schema pack file ({"<domain>": {"facets": [...]}})
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Fetch live schemas from this catalog API base URL
        #[arg(long)]
        api_base: Option<String>,

        /// Tenant for live schemas (default: VITRINA_TENANT_ID or "default")
        #[arg(long, requires = "api_base")]
        tenant: Option<String>,

        /// Gate source file to scan instead of the built-in rule table
        #[arg(long)]
        gate_source: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    // Reports go to stdout; logs stay on stderr.
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(report) if report.passed() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_VIOLATION),
        Err(e) => {
            if let Some(input) = e.downcast_ref::<ContractError>() {
                error!(error = %input, "Contract check input error");
            }
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ContractReport> {
    match cli.command {
        Commands::Check {
            schema,
            api_base,
            tenant,
            gate_source,
            format,
        } => {
            let pack = load_pack(schema, api_base, tenant).await?;
            let rules = match gate_source {
                Some(path) => RuleSource::from_file(&path)?,
                None => RuleSource::Builtin,
            };

            let report = check_contract(&pack, &rules);
            match format {
                OutputFormat::Text => print!("{}", report.render_text()),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialize report")?
                ),
            }
            Ok(report)
        }
    }
}

async fn load_pack(
    schema: Option<PathBuf>,
    api_base: Option<String>,
    tenant: Option<String>,
) -> anyhow::Result<SchemaPack> {
    if let Some(path) = schema {
        return Ok(SchemaPack::from_file(&path)?);
    }

    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(base) = api_base {
        config.api_base = base.trim_end_matches('/').to_string();
    }
    if let Some(tenant) = tenant {
        config.tenant_id = tenant;
    }
    config.validate().context("Invalid client configuration")?;
    // A check always wants fresh schemas.
    config.schema_ttl_secs = 0;

    debug!(api_base = %config.api_base, tenant_id = %config.tenant_id, "Fetching live schemas");
    let tenant_id = config.tenant_id.clone();
    let client = FacetSchemaClient::new(ApiClient::new(config)?);
    Ok(SchemaPack::fetch(&client, &tenant_id).await?)
}
