//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--root <path>`: Library root directory (default: current directory)
//! - `--config <path>`: Use this config file instead of searching
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Errors only
//! - `--json`: Machine-readable output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// taggu - Resolve metadata for media libraries from sidecar YAML files
#[derive(Parser, Debug)]
#[command(name = "tg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Library root directory (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Config file to use instead of searching the default locations
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a metadata field for an item
    #[command(
        name = "field",
        long_about = "Resolve a metadata field for an item.\n\n\
            By default only the item's own metadata is consulted: the self metadata \
            file inside it (for directories) and the item metadata file next to it, \
            in the configured priority order. The first file that has the field wins.\n\n\
            With --parents, the nearest ancestor directory that has the field answers \
            instead. With --children, every descendant that has the field contributes, \
            in pre-order; descendants of a child that already answered are skipped.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Title of a track
    tg field ALBUM_01/TRACK_01.flac title

    # Genre inherited from the album directory
    tg field ALBUM_01/TRACK_01.flac genre --parents

    # Every artist appearing on any track of an album, two levels deep
    tg field ALBUM_01 artist --children --max-distance 2

    # Only consider items labelled TRACK or SUBTRACK
    tg field ALBUM_01 title --children --label TRACK --label SUBTRACK

    # JSON output for scripting
    tg --json field ALBUM_01 genre"
    )]
    Field {
        /// Item path, relative to the library root
        item: PathBuf,

        /// Field name
        field: String,

        /// Take the value from the nearest ancestor that has the field
        #[arg(long, conflicts_with = "children")]
        parents: bool,

        /// Collect the values of every descendant that has the field
        #[arg(long)]
        children: bool,

        /// Only resolve against items with this label (repeatable)
        #[arg(long = "label", value_name = "LABEL")]
        labels: Vec<String>,

        /// Maximum ancestor distance or descendant depth
        #[arg(long, value_name = "N")]
        max_distance: Option<usize>,
    },

    /// List the metadata files that could describe an item
    #[command(
        name = "meta-files",
        long_about = "List the metadata files that could describe an item.\n\n\
            Files are listed in priority order and only if they exist.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Where does an album directory get its metadata from?
    tg meta-files ALBUM_01"
    )]
    MetaFiles {
        /// Item path, relative to the library root
        item: PathBuf,
    },

    /// Show the items a metadata file describes
    #[command(
        name = "describe",
        long_about = "Show the items a metadata file describes, with their metadata.\n\n\
            Sequence-style item files are matched to the directory's items in sort \
            order; mapping-style item files by unique name prefix. Mismatches are \
            reported as warnings.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Check which track each block of an item file lands on
    tg describe ALBUM_01/taggu_item.yml

    # Same, as JSON
    tg --json describe ALBUM_01/taggu_item.yml"
    )]
    Describe {
        /// Metadata file path, relative to the library root
        meta_file: PathBuf,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for tg commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    tg completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    tg completion zsh >> ~/.zshrc

    # Fish
    tg completion fish > ~/.config/fish/completions/tg.fish

    # PowerShell
    tg completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
