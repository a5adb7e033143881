//! cli
//!
//! Command-line interface layer for taggu.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the logging subscriber
//! - Load configuration and delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that call into [`crate::engine`]. No metadata logic lives here.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::core::paths::Library;
use crate::engine::{Discovery, MetaCache, QueryOptions};
use crate::ui::output::{self, Verbosity};

/// Everything a command handler needs.
#[derive(Debug)]
pub struct Context {
    /// Library root as given (default: current directory)
    pub root: PathBuf,
    /// Loaded configuration
    pub config: Config,
    pub verbosity: Verbosity,
    pub json: bool,
}

impl Context {
    /// The library described by the configuration.
    pub fn library(&self) -> Result<Library> {
        self.config
            .library(&self.root)
            .with_context(|| format!("failed to open library at '{}'", self.root.display()))
    }

    /// A fresh metadata cache over the library.
    pub fn cache(&self) -> Result<MetaCache> {
        let discovery = Discovery::with_order(self.library()?, &self.config.source_order())?;
        Ok(MetaCache::new(discovery))
    }

    /// Query options from the configuration.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions::from_config(&self.config)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    init_tracing(verbosity);

    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => {
            let result = Config::load(&root).context("failed to load config")?;
            for warning in &result.warnings {
                output::warn(
                    format!("{} ({})", warning.message, warning.path.display()),
                    verbosity,
                );
            }
            result.config
        }
    };

    let ctx = Context {
        root,
        config,
        verbosity,
        json: cli.json,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` overrides the level picked from the flags.
fn init_tracing(verbosity: Verbosity) {
    let default = match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Debug => "taggu=debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
