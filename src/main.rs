//! # docsort CLI
//!
//! ## Usage
//!
//! ```bash
//! docsort --config ./config/docsort.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docsort resolve <FILE> <FOLDER>` | Locate a file in the Deals / Accounts trees |
//! | `docsort classify <PATH>` | Classify one local document |
//! | `docsort file <FILE> <FOLDER>` | Resolve, classify, and rename one document |
//! | `docsort audit <DIR>` | Report page counts and password protection |
//! | `docsort prompt` | Print the classification contract prompt |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docsort::contract::ContractVersion;
use docsort::{audit, classify, config, engine, filing, logging, render, resolver};

/// docsort: classify scanned contract documents and file them in their
/// deal folder.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "docsort",
    about = "docsort: classify scanned contract documents and resolve their deal folder",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docsort.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate a file in the Deals tree, then in every account's Associated Deals.
    ///
    /// Prints informational logs to stderr and exactly one final line to
    /// stdout: `RESULT:<absolute-path>` or `RESULT:NOT_FOUND`.
    Resolve {
        /// File name as recorded (may contain `:`, `[` or `]`).
        file_name: String,

        /// Deal folder name.
        folder_name: String,

        /// Override `[paths].deals_root`.
        #[arg(long = "deals-path")]
        deals_path: Option<PathBuf>,

        /// Override `[paths].accounts_root`.
        #[arg(long = "accounts-path")]
        accounts_path: Option<PathBuf>,
    },

    /// Classify one local document and print the result as JSON.
    Classify {
        /// Path to a PDF, JPEG, or PNG file.
        path: PathBuf,

        /// Contract version (`v1`..`v4`); defaults to the configured one.
        #[arg(long = "contract")]
        contract: Option<ContractVersion>,
    },

    /// Resolve a file, classify it, and rename it after its content type.
    File {
        file_name: String,

        folder_name: String,

        #[arg(long = "deals-path")]
        deals_path: Option<PathBuf>,

        #[arg(long = "accounts-path")]
        accounts_path: Option<PathBuf>,

        /// Classify and report the target name without renaming.
        #[arg(long)]
        dry_run: bool,
    },

    /// Report page count and password protection for every PDF under a directory.
    Audit {
        root: PathBuf,
    },

    /// Print the prompt for a contract version.
    Prompt {
        #[arg(long = "contract")]
        contract: Option<ContractVersion>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `resolve` always ends with a RESULT: line, so a broken config or log
    // directory degrades to defaults there instead of aborting.
    let lenient = matches!(cli.command, Commands::Resolve { .. });

    let (cfg, config_error) = match config::load_or_minimal(&cli.config) {
        Ok(cfg) => (cfg, None),
        Err(e) if lenient => (config::Config::minimal(), Some(e)),
        Err(e) => return Err(e),
    };
    match logging::init(&cfg.logging) {
        Ok(Some(path)) => tracing::info!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(e) if lenient => {
            let _ = logging::init(&config::LoggingConfig::default());
            tracing::warn!("Logging setup failed, using stderr only: {:#}", e);
        }
        Err(e) => return Err(e),
    }
    if let Some(e) = config_error {
        tracing::warn!(
            "Ignoring config {}: {:#}; using defaults",
            cli.config.display(),
            e
        );
    }

    match cli.command {
        Commands::Resolve {
            file_name,
            folder_name,
            deals_path,
            accounts_path,
        } => {
            resolver::run_resolve(&cfg, &file_name, &folder_name, deals_path, accounts_path)?;
        }
        Commands::Classify { path, contract } => {
            classify::run_classify(&cfg, &path, contract).await?;
        }
        Commands::File {
            file_name,
            folder_name,
            deals_path,
            accounts_path,
            dry_run,
        } => {
            let engine = engine::create_engine(&cfg.classifier)?;
            filing::run_file(
                &cfg,
                engine.as_ref(),
                &render::SourceRenderer,
                &file_name,
                &folder_name,
                deals_path,
                accounts_path,
                dry_run,
            )
            .await?;
        }
        Commands::Audit { root } => {
            audit::run_audit(&root)?;
        }
        Commands::Prompt { contract } => {
            let version = match contract {
                Some(v) => v,
                None => cfg.classifier.version()?,
            };
            println!("{}", version.prompt());
        }
    }

    Ok(())
}
