//! CLI Tooling
//!
//! Command-line interface for mirroring operations. Paths and the pass
//! interval can come from the command line or from configuration; the
//! command line wins.

use crate::config::{ConfigLoader, SyncConfig};
use crate::daemon::SyncDaemon;
use crate::error::SyncError;
use crate::logging;
use crate::reconcile::Reconciler;
use crate::status;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Replica CLI - One-way directory mirroring
#[derive(Parser)]
#[command(name = "replica")]
#[command(about = "One-way directory mirroring with content-addressed reconciliation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single reconciliation pass
    Sync {
        /// Source directory (falls back to configuration)
        source: Option<PathBuf>,
        /// Replica directory (falls back to configuration)
        replica: Option<PathBuf>,
    },
    /// Run the periodic mirroring daemon
    Run {
        /// Source directory (falls back to configuration)
        source: Option<PathBuf>,
        /// Replica directory (falls back to configuration)
        replica: Option<PathBuf>,
        /// Seconds between passes (falls back to configuration)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Report divergence without mutating the replica
    Status {
        /// Source directory (falls back to configuration)
        source: Option<PathBuf>,
        /// Replica directory (falls back to configuration)
        replica: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Execution context carrying loaded configuration
pub struct CliContext {
    config: SyncConfig,
}

impl CliContext {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, SyncError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Merge CLI log overrides into the loaded config and initialize the
    /// logging system. Call at most once per process.
    pub fn init_logging(&self, cli: &Cli) -> Result<(), SyncError> {
        let mut logging = self.config.logging.clone();
        if let Some(level) = &cli.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &cli.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &cli.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &cli.log_file {
            logging.file = Some(file.clone());
        }
        logging::init_logging(Some(&logging))
    }

    /// Execute a command, returning its printable output
    pub fn execute(&self, command: &Commands) -> Result<String, SyncError> {
        match command {
            Commands::Sync { source, replica } => {
                let (source, replica) = self.resolve_pair(source, replica)?;
                Reconciler::new().reconcile(&source, &replica)?;
                Ok(format!(
                    "Synchronized {} -> {}",
                    source.display(),
                    replica.display()
                ))
            }
            Commands::Run {
                source,
                replica,
                interval,
            } => {
                let (source, replica) = self.resolve_pair(source, replica)?;
                // A source that never existed is an unrecoverable startup
                // error; a source that vanishes later is a pass-level error
                // retried on the next tick.
                if !source.is_dir() {
                    return Err(SyncError::PathNotFound(source));
                }
                let interval = interval.unwrap_or(self.config.interval_secs);
                if interval == 0 {
                    return Err(SyncError::Config(
                        "interval must be at least 1 second".to_string(),
                    ));
                }
                let daemon = SyncDaemon::new(
                    Reconciler::new(),
                    source,
                    replica,
                    Duration::from_secs(interval),
                );
                daemon.start();
                Ok(String::new())
            }
            Commands::Status {
                source,
                replica,
                format,
            } => {
                let (source, replica) = self.resolve_pair(source, replica)?;
                let report = status::status_report(&source, &replica)?;
                match format.as_str() {
                    "json" => serde_json::to_string_pretty(&report)
                        .map_err(|e| SyncError::Config(e.to_string())),
                    "text" => Ok(status::format_status_text(&report)),
                    other => Err(SyncError::Config(format!(
                        "Invalid output format: {} (must be 'text' or 'json')",
                        other
                    ))),
                }
            }
        }
    }

    fn resolve_pair(
        &self,
        source: &Option<PathBuf>,
        replica: &Option<PathBuf>,
    ) -> Result<(PathBuf, PathBuf), SyncError> {
        let source = source
            .clone()
            .or_else(|| self.config.source.clone())
            .ok_or_else(|| {
                SyncError::Config(
                    "source directory not given on the command line or in configuration"
                        .to_string(),
                )
            })?;
        let replica = replica
            .clone()
            .or_else(|| self.config.replica.clone())
            .ok_or_else(|| {
                SyncError::Config(
                    "replica directory not given on the command line or in configuration"
                        .to_string(),
                )
            })?;
        ensure_disjoint(&source, &replica)?;
        Ok((source, replica))
    }
}

/// Reject nested or identical source/replica pairs.
///
/// A replica inside its own source would be re-enumerated as source content
/// on every pass and the recursion would never terminate.
fn ensure_disjoint(source: &Path, replica: &Path) -> Result<(), SyncError> {
    if let (Some(s), Some(r)) = (canonical_best_effort(source), canonical_best_effort(replica)) {
        if s.starts_with(&r) || r.starts_with(&s) {
            return Err(SyncError::Config(format!(
                "source and replica must be disjoint directories: {} vs {}",
                source.display(),
                replica.display()
            )));
        }
    }
    Ok(())
}

/// Canonicalize a path that may not exist yet by canonicalizing its parent
fn canonical_best_effort(path: &Path) -> Option<PathBuf> {
    if let Ok(p) = path.canonicalize() {
        return Some(p);
    }
    let parent = path.parent()?;
    let name = path.file_name()?;
    parent.canonicalize().ok().map(|p| p.join(name))
}
