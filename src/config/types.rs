//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use strum_macros::{Display, EnumIter};

use crate::config::constants::{
    API_KEY_ENV, BULK_PAGE_DELAY, DEFAULT_ENDPOINT, DEFAULT_ROWS_PER_PAGE, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, PAGE_DELAY,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Datastore core (collection) to export from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Core {
    /// One document per IATI activity
    Activity,
    /// One document per activity transaction
    Transaction,
    /// One document per activity budget
    Budget,
}

impl Core {
    /// Name of the core as it appears in the request path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Core::Activity => "activity",
            Core::Transaction => "transaction",
            Core::Budget => "budget",
        }
    }

    /// Output formats the core can be exported in.
    ///
    /// Only activity documents carry the original XML and JSON renderings.
    pub fn allowed_formats(&self) -> &'static [OutputFormat] {
        match self {
            Core::Activity => &[
                OutputFormat::Solr,
                OutputFormat::Xml,
                OutputFormat::Json,
                OutputFormat::Csv,
                OutputFormat::FlatCsv,
            ],
            Core::Transaction | Core::Budget => {
                &[OutputFormat::Solr, OutputFormat::Csv, OutputFormat::FlatCsv]
            }
        }
    }
}

/// Output format of the exported page files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    /// Index documents as returned by the API (JSON)
    Solr,
    /// Reconstructed `<iati-activities>` XML documents
    Xml,
    /// Activities reconstructed from their embedded JSON rendering
    Json,
    /// CSV rendered by the index itself
    Csv,
    /// CSV built locally from the documents, multi-valued fields flattened
    FlatCsv,
}

/// How grouping filters are turned into parentheses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FilterMode {
    /// Parse filters into a clause tree; malformed input is an error
    #[default]
    Structured,
    /// Positional grouping heuristic of the datastore search UI; unsupported
    /// operators are dropped silently
    Legacy,
}

/// Command-line options.
///
/// This struct is automatically generated by `clap` from the field attributes.
/// Validation that spans several options (format allowed for the core, non-empty
/// key and directory) happens in [`Config::validate`].
///
/// # Examples
///
/// ```bash
/// # Export all activities as Solr documents
/// datastore_export -a $KEY -o ./out
///
/// # Export filtered transactions as CSV
/// datastore_export -a $KEY -f filters.json -c transaction --format csv -o ./out
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "datastore_export",
    about = "Exports records from the IATI Datastore into local files."
)]
pub struct Opt {
    /// API key from https://developer.iatistandard.org/
    #[arg(short = 'a', long = "apikey", env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// JSON filters file downloaded from the advanced search of https://datastore.iatistandard.org/
    #[arg(short = 'f', long = "filtersfile")]
    pub filters_file: Option<PathBuf>,

    /// Core to export from
    #[arg(short = 'c', long, value_enum, default_value_t = Core::Activity)]
    pub core: Core,

    /// Output format (must be valid for the selected core)
    #[arg(long, value_enum, default_value_t = OutputFormat::Solr)]
    pub format: OutputFormat,

    /// Output directory, created if missing
    #[arg(short = 'o', long = "outputdir")]
    pub output_dir: Option<PathBuf>,

    /// Documents requested per page
    #[arg(long, default_value_t = DEFAULT_ROWS_PER_PAGE)]
    pub rows_per_page: u32,

    /// Datastore API base URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Grouping interpretation for the filters file
    #[arg(long, value_enum, default_value_t = FilterMode::Structured)]
    pub filter_mode: FilterMode,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use datastore_export::{Config, Core, OutputFormat};
/// use std::path::PathBuf;
///
/// let config = Config {
///     api_key: "my-key".to_string(),
///     core: Core::Budget,
///     format: OutputFormat::Csv,
///     output_dir: PathBuf::from("./budgets"),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// API subscription key
    pub api_key: String,

    /// Optional filters file
    pub filters_file: Option<PathBuf>,

    /// Core to export from
    pub core: Core,

    /// Output format
    pub format: OutputFormat,

    /// Directory receiving the page files
    pub output_dir: PathBuf,

    /// Documents per page, also the single-request threshold for bulk formats
    pub rows_per_page: u32,

    /// Datastore API base URL
    pub endpoint: String,

    /// Grouping interpretation for the filters file
    pub filter_mode: FilterMode,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Pause between cursor-native pages
    pub page_delay: Duration,

    /// Pause between manually paged bulk pages
    pub bulk_page_delay: Duration,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            filters_file: None,
            core: Core::Activity,
            format: OutputFormat::Solr,
            output_dir: PathBuf::new(),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            filter_mode: FilterMode::Structured,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_delay: PAGE_DELAY,
            bulk_page_delay: BULK_PAGE_DELAY,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            api_key: opt.api_key.unwrap_or_default(),
            filters_file: opt.filters_file,
            core: opt.core,
            format: opt.format,
            output_dir: opt.output_dir.unwrap_or_default(),
            rows_per_page: opt.rows_per_page,
            endpoint: opt.endpoint,
            filter_mode: opt.filter_mode,
            timeout_seconds: opt.timeout_seconds,
            log_level: opt.log_level,
            log_format: opt.log_format,
            ..Default::default()
        }
    }
}

impl Config {
    /// Checks option combinations that clap cannot express.
    ///
    /// Runs before any network access so that a bad invocation never costs a request.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        if !self.core.allowed_formats().contains(&self.format) {
            let valid = self
                .core
                .allowed_formats()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ConfigError::FormatNotAllowed {
                format: self.format,
                core: self.core,
                valid,
            });
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutputDirectory);
        }

        if self.rows_per_page == 0 {
            return Err(ConfigError::InvalidRowsPerPage);
        }

        Ok(())
    }
}
