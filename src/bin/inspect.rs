//! Envelope Inspector CLI
//!
//! Shows the header of captured envelopes and decodes them against the
//! configured schema generations.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use schema_envelope::{Envelope, EnvelopeConfig, Factory, FactoryRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envelope-inspect")]
#[command(about = "Inspect and decode schema envelopes")]
struct Cli {
    /// Config file (defaults to envelopes.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header and payload of an envelope
    Inspect {
        /// Envelope file, or "-" for stdin
        input: PathBuf,
        /// Input is hex text instead of raw bytes
        #[arg(long)]
        hex: bool,
    },

    /// Decode an envelope with the configured factories and print it as JSON
    Decode {
        /// Envelope file, or "-" for stdin
        input: PathBuf,
        /// Input is hex text instead of raw bytes
        #[arg(long)]
        hex: bool,
    },

    /// List the configured schema generations
    Identities,
}

fn main() {
    let cli = Cli::parse();
    let config = match EnvelopeConfig::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &EnvelopeConfig) -> Result<()> {
    match command {
        Commands::Inspect { input, hex } => {
            let envelope = read_envelope(&input, hex)?;
            println!("schema id:      {}", envelope.schema_id());
            println!("schema version: {}", envelope.schema_version());
            println!("payload:        {} bytes", envelope.payload().len());
            if envelope.has_payload() {
                println!("{}", hex::encode(envelope.payload()));
            }
            Ok(())
        }

        Commands::Decode { input, hex } => {
            let registry = FactoryRegistry::from_config(config)?;
            let envelope = read_envelope(&input, hex)?;
            match registry.extract(&envelope)? {
                Some(value) => {
                    let json = serde_json::Value::try_from(value)
                        .map_err(|e| anyhow!("value has no JSON form: {}", e))?;
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                None => println!("{} (no payload)", envelope.identity()),
            }
            Ok(())
        }

        Commands::Identities => {
            let registry = FactoryRegistry::from_config(config)?;
            if registry.is_empty() {
                println!("No schemas configured");
                return Ok(());
            }
            for identity in registry.identities() {
                match registry.get(&identity) {
                    Some(Factory::SchemaBound(factory)) => {
                        println!("  {:<12} {}", identity.to_string(), factory.fingerprint())
                    }
                    Some(Factory::Schemaless(_)) => println!("  {:<12} (schemaless)", identity.to_string()),
                    None => {}
                }
            }
            Ok(())
        }
    }
}

fn read_envelope(input: &Path, is_hex: bool) -> Result<Envelope> {
    let raw = if input.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        std::fs::read(input).with_context(|| format!("reading {}", input.display()))?
    };

    let bytes = if is_hex {
        let text = String::from_utf8(raw).context("hex input is not UTF-8")?;
        hex::decode(text.trim()).context("invalid hex input")?
    } else {
        raw
    };

    Envelope::decode(&bytes).ok_or_else(|| anyhow!("{} bytes is too short for an envelope header", bytes.len()))
}
