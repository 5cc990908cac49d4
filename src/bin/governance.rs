//! `governance` — thin CLI harness exercising the Resolver, Proposal
//! Validator, and Enforcement Engine end to end. Not a production
//! orchestrator: a real host embeds these crates directly (spec.md §1).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use governance::GovernanceEngine;
use governance_core::{ExecutionContext, InMemoryRegistry, Protocol, SharedClock, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "governance", version, about = "Protocol-based behavioral governance demo harness")]
struct Cli {
    /// Path to governance.toml. Defaults used when absent.
    #[arg(long, value_name = "PATH", default_value = "governance.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a protocol read from a JSON file and print the assessment.
    Validate {
        /// Path to a JSON-encoded Protocol.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Resolve the effective constraint set for a protocol id against a
    /// JSON-encoded registry snapshot (an array of Protocols).
    Resolve {
        /// Path to a JSON array of Protocols forming the registry.
        #[arg(long, value_name = "FILE")]
        registry: PathBuf,
        /// Protocol id to resolve.
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Run pre-execution enforcement for an execution context read from a
    /// JSON file against a JSON-encoded registry snapshot.
    Check {
        #[arg(long, value_name = "FILE")]
        registry: PathBuf,
        /// Path to a JSON-encoded ExecutionContext.
        #[arg(value_name = "FILE")]
        context_file: PathBuf,
    },
    /// Parse free text into suggested constraints.
    Propose {
        /// The proposal text. Use `-` to read from stdin.
        #[arg(value_name = "TEXT")]
        text: String,
    },
}

fn main() -> Result<()> {
    initialize_tracing();
    let cli = Cli::parse();

    let clock: SharedClock = Arc::new(SystemClock);
    let engine = GovernanceEngine::from_config(&cli.config, clock)
        .context("failed to load governance configuration")?;
    tracing::info!(config = %cli.config.display(), "governance engine ready");

    match cli.command {
        Commands::Validate { file } => run_validate(&engine, &file),
        Commands::Resolve { registry, id } => run_resolve(&engine, &registry, &id),
        Commands::Check { registry, context_file } => run_check(&engine, &registry, &context_file),
        Commands::Propose { text } => run_propose(&engine, &text),
    }
}

fn initialize_tracing() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn run_validate(engine: &GovernanceEngine, file: &PathBuf) -> Result<()> {
    let protocol: Protocol = read_json(file)?;
    let result = engine.validate(&protocol);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn build_registry(path: &PathBuf) -> Result<InMemoryRegistry> {
    let protocols: Vec<Protocol> = read_json(path)?;
    let registry = InMemoryRegistry::new();
    for protocol in protocols {
        registry.activate(protocol.id.clone());
        registry.upsert_protocol(protocol);
    }
    Ok(registry)
}

fn run_resolve(engine: &GovernanceEngine, registry_path: &PathBuf, id: &str) -> Result<()> {
    let registry = build_registry(registry_path)?;
    let effective = engine.effective_constraints(id, &registry);
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}

fn run_check(engine: &GovernanceEngine, registry_path: &PathBuf, context_file: &PathBuf) -> Result<()> {
    let registry = build_registry(registry_path)?;
    let ctx: ExecutionContext = read_json(context_file)?;
    let result = engine.check_pre_execution(&ctx, &registry);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_propose(engine: &GovernanceEngine, text: &str) -> Result<()> {
    let text = if text == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read proposal text from stdin")?;
        buf
    } else {
        text.to_string()
    };

    let parsed = engine.propose(&text);
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
