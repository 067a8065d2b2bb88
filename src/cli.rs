//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// HazardWatch - wildlife hazard analytics for airport operations
///
/// Gathers sightings, hazard reports and tasks over rolling windows
/// (2 days to 1 year), then writes an AI-written or templated analysis.
///
/// Examples:
///   hazardwatch --store-url https://xyz.supabase.co
///   hazardwatch --data snapshot.json --offline --format json
///   hazardwatch --serve --bind 0.0.0.0:8080
///   hazardwatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// URL of the hosted record store
    #[arg(long, value_name = "URL", env = "HAZARDWATCH_STORE_URL")]
    pub store_url: Option<String>,

    /// API key for the record store
    #[arg(long, value_name = "KEY", env = "HAZARDWATCH_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Read records from a JSON snapshot instead of the hosted store
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Completion model name
    #[arg(short, long, env = "HAZARDWATCH_MODEL")]
    pub model: Option<String>,

    /// Base URL of the chat completions API
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// API key for the completion service
    #[arg(long, value_name = "KEY", env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Temperature for LLM responses (0.0 - 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Completion request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Never call the completion service; always use the templated summary
    #[arg(long)]
    pub offline: bool,

    /// 30-day sighting count above which activity is reported as increased
    #[arg(long, value_name = "COUNT")]
    pub threshold: Option<usize>,

    /// Output file path for the report (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Run the HTTP API instead of a one-shot analysis
    #[arg(long)]
    pub serve: bool,

    /// Address for the HTTP API
    #[arg(long, value_name = "ADDR", requires = "serve")]
    pub bind: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .hazardwatch.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .hazardwatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.store_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Store URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref url) = self.api_base {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref data) = self.data {
            if !data.is_file() {
                return Err(format!("Data file does not exist: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
