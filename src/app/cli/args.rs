//! Command-line arguments
//!
//! Global options may appear before or after the subcommand. Every option is
//! optional here; unset values fall through to the configuration file and
//! then to built-in defaults (see [`super::config`]).

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "scanlog")]
#[command(about = "Barcode and QR scan log with deduplication and sync")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Scan store file, or 'memory' for a throwaway in-memory store
    #[arg(short = 's', long = "store", value_name = "PATH", global = true)]
    pub store: Option<String>,

    /// Keep scans on this device; sync reports a notice instead of uploading
    #[arg(long = "local-only", action = ArgAction::SetTrue, conflicts_with = "remote", global = true)]
    pub local_only: bool,

    /// Upload scans to the remote endpoint on sync
    #[arg(long = "remote", action = ArgAction::SetTrue, global = true)]
    pub remote: bool,

    /// Remote service base URL
    #[arg(short = 'u', long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Window in which the same payload is not accepted twice
    #[arg(long = "cooldown-ms", value_name = "MS", global = true)]
    pub cooldown_ms: Option<i64>,

    /// How long an accepted scan blocks further decode events
    #[arg(long = "processing-timeout-ms", value_name = "MS", global = true)]
    pub processing_timeout_ms: Option<i64>,

    /// Pause before reporting a local-only sync
    #[arg(long = "local-sync-delay-ms", value_name = "MS", global = true)]
    pub local_sync_delay_ms: Option<i64>,

    /// Per-request timeout for uploads
    #[arg(long = "http-timeout-secs", value_name = "SECS", global = true)]
    pub http_timeout_secs: Option<u64>,

    /// Force colored output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color", global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"], global = true)]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"], global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read decode events (one per line) and record accepted scans
    #[command(after_help = "Line format: PAYLOAD[<TAB>SYMBOLOGY[<TAB>DECODED_AT_MS]]")]
    Scan {
        /// Read events from this file instead of standard input
        #[arg(short = 'i', long = "input", value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// List stored scans, most recent first
    List {
        /// Show at most this many scans
        #[arg(short = 'n', long = "limit", value_name = "COUNT")]
        limit: Option<usize>,
    },
    /// Show scan statistics
    Stats {
        /// Include symbologies with no scans
        #[arg(short = 'a', long = "all")]
        all: bool,
    },
    /// Delete one scan by id
    Delete {
        #[arg(value_name = "ID")]
        id: u64,
    },
    /// Delete every stored scan
    Clear,
    /// Send stored scans to the remote endpoint
    Sync,
    /// Show version and build information
    Version,
}

impl Args {
    /// Color flag as a tri-state: Some(true) forced, Some(false) disabled, None auto
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Local-only flag as a tri-state; None leaves the configured mode alone
    pub fn local_only_override(&self) -> Option<bool> {
        match (self.local_only, self.remote) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
