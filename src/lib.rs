//! datastore_export library: bulk export from the IATI Datastore
//!
//! This library compiles a filters file downloaded from the Datastore's advanced
//! search into a Solr query, then pages through the matching documents of one
//! core and writes each page to a file in the requested format.
//!
//! # Example
//!
//! ```no_run
//! use datastore_export::{run_export, Config, Core, OutputFormat};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     api_key: std::env::var("DATASTORE_API_KEY")?,
//!     core: Core::Transaction,
//!     format: OutputFormat::Csv,
//!     output_dir: std::path::PathBuf::from("./out"),
//!     ..Default::default()
//! };
//!
//! let report = run_export(config).await?;
//! println!("Wrote {} page file(s)", report.pages_written());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod config;
mod error_handling;
pub mod export;
pub mod fetch;
pub mod filter;
pub mod initialization;
pub mod query;
mod utils;

// Re-export public API
pub use config::{Config, Core, FilterMode, LogFormat, LogLevel, OutputFormat};
pub use error_handling::{ConfigError, ExportError, FetchError, FilterError, InitializationError};
pub use export::ExportReport;
pub use run::{compile_query, run_export};

// Internal run module (wires configuration, filters, client and pipeline together)
mod run {
    use anyhow::{Context, Result};
    use log::info;

    use crate::config::{Config, MATCH_ALL_QUERY};
    use crate::error_handling::FilterError;
    use crate::export::{ExportPipeline, ExportReport, FormatDescriptor, PipelineOptions};
    use crate::fetch::HttpFetcher;
    use crate::filter::{compile, load_filters};
    use crate::initialization::init_client;
    use crate::query::SelectQuery;

    /// Builds the `q` parameter for a configuration.
    ///
    /// Without a filters file, or when the filters compile to nothing, the query
    /// matches every document.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the filters file cannot be read or compiled.
    pub fn compile_query(config: &Config) -> Result<String, FilterError> {
        let Some(path) = &config.filters_file else {
            return Ok(MATCH_ALL_QUERY.to_string());
        };

        let filters = load_filters(path)?;
        info!("Loaded {} filter(s) from {}", filters.len(), path.display());
        let query = compile(&filters, config.filter_mode)?;

        if query.trim().is_empty() {
            Ok(MATCH_ALL_QUERY.to_string())
        } else {
            Ok(query)
        }
    }

    /// Runs one export with the provided configuration.
    ///
    /// This is the main entry point for the library. It validates the
    /// configuration, compiles the filters, creates the output directory and
    /// pages through the datastore until the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the filters cannot be
    /// compiled, the output directory cannot be created, or any request or page
    /// write fails. Pages written before a failure are left in place.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use datastore_export::{run_export, Config};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config {
    ///     api_key: "key".to_string(),
    ///     output_dir: std::path::PathBuf::from("./out"),
    ///     ..Default::default()
    /// };
    /// let report = run_export(config).await?;
    /// println!("{} request(s)", report.requests);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_export(config: Config) -> Result<ExportReport> {
        config.validate()?;

        let query = compile_query(&config)?;
        info!("Query: {}", query);

        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                config.output_dir.display()
            )
        })?;

        let select = SelectQuery::new(&config.endpoint, config.core, query)?;
        let client = init_client(&config).context("Failed to initialize HTTP client")?;
        let descriptor = FormatDescriptor::for_format(config.format);

        info!(
            "Exporting {} core as {} into {}",
            config.core,
            config.format,
            config.output_dir.display()
        );

        let pipeline = ExportPipeline::new(
            HttpFetcher::new(client),
            select,
            descriptor,
            PipelineOptions::from(&config),
        );
        Ok(pipeline.run().await?)
    }
}
