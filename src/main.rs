//! # ProfRAG: Professor Recommendation Chat Backend
//!
//! Streams answers about professors, grounded in reviews retrieved from a
//! vector index.
//!
//! Usage:
//!   profrag                          # Serve on 127.0.0.1:3000
//!   profrag --port 8080              # Custom port
//!   profrag --config ./profrag.toml  # Explicit config file
//!   profrag --print-config           # Show effective config (secrets masked)

use anyhow::Result;
use clap::Parser;
use profrag_core::ProfRagConfig;
use profrag_rag::RagPipeline;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "profrag",
    version,
    about = "🎓 ProfRAG: streaming professor recommendations"
)]
struct Cli {
    /// Config file (default: $PROFRAG_CONFIG, then ~/.profrag/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Bind address, overrides gateway.host
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides gateway.port
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective config with secrets masked and exit
    #[arg(long)]
    print_config: bool,
}

/// `--config` wins over `PROFRAG_CONFIG`, which wins over the default path.
fn config_path(flag: Option<&str>, env: Option<String>) -> PathBuf {
    match flag.map(str::to_string).or(env.filter(|v| !v.trim().is_empty())) {
        Some(p) => PathBuf::from(shellexpand::tilde(&p).to_string()),
        None => ProfRagConfig::default_path(),
    }
}

fn load_config(cli: &Cli) -> Result<ProfRagConfig> {
    let path = config_path(cli.config.as_deref(), std::env::var("PROFRAG_CONFIG").ok());
    let mut config = if path.exists() {
        tracing::info!("📄 Loading config from {}", path.display());
        ProfRagConfig::load_from(&path)?
    } else if cli.config.is_some() {
        anyhow::bail!("config file not found: {}", path.display());
    } else {
        tracing::info!("📄 No config at {}, using defaults", path.display());
        ProfRagConfig::default()
    };

    config.apply_env();
    if let Some(host) = &cli.host {
        config.gateway.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "profrag=debug,profrag_core=debug,profrag_providers=debug,profrag_rag=debug,profrag_gateway=debug,tower_http=debug"
    } else {
        "profrag=info,profrag_providers=info,profrag_rag=info,profrag_gateway=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = load_config(&cli)?;

    if cli.print_config {
        println!("{}", toml::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    if config.openai.api_key.is_empty() {
        tracing::warn!("⚠️  No OpenAI API key. Set OPENAI_API_KEY or openai.api_key; chat requests will fail with 503.");
    }
    if config.pinecone.api_key.is_empty() {
        tracing::warn!("⚠️  No Pinecone API key. Set PINECONE_API_KEY or pinecone.api_key; chat requests will fail with 503.");
    }

    let providers = profrag_providers::create_providers(&config)?;
    tracing::info!(
        "✅ Providers ready (embedder={}, index={}, chat={})",
        providers.embedder.name(),
        providers.index.name(),
        providers.chat.name()
    );

    let pipeline = RagPipeline::new(
        providers.embedder,
        providers.index,
        providers.chat,
        config.system_prompt.clone(),
        config.pinecone.namespace.clone(),
    );

    profrag_gateway::start(&config.gateway, pipeline).await
}
