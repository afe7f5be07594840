//! Paginated export.
//!
//! The pipeline walks one export through the states
//! `CountPending → { SinglePage | Paging(cursor) } → Done`, one request (or
//! metadata + data pair) per step. Formats whose responses carry a cursor start
//! directly in `Paging`; bulk formats count the matches first.
//!
//! Any non-success response ends the run with an error. Pages written before
//! the failure stay on disk.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::{Config, CURSOR_SORT};
use crate::error_handling::{ExportError, FetchError};
use crate::fetch::{Fetch, FetchedBody, SelectResponse};
use crate::query::SelectQuery;
use crate::utils::sanitize_and_truncate_error_message;

use super::cursor::CursorState;
use super::format::{FormatDescriptor, PayloadKind};
use super::types::{ExportReport, PagePayload};
use super::writers::{writer_for, PageWriter};

/// Step of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    /// Bulk format; the number of matches is not known yet
    CountPending,
    /// Bulk format with fewer matches than a page; fetch them in one request
    SinglePage {
        /// Number of matching documents
        rows: u64,
    },
    /// Walking pages with a cursor
    Paging(CursorState),
    /// Nothing left to fetch
    Done,
}

/// Settings the pipeline takes from [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Documents per page, also the single-request threshold for bulk formats
    pub rows_per_page: u32,
    /// Directory receiving the page files (must exist)
    pub output_dir: PathBuf,
    /// Pause between cursor-native pages
    pub page_delay: Duration,
    /// Pause between manually paged bulk pages
    pub bulk_page_delay: Duration,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            rows_per_page: config.rows_per_page,
            output_dir: config.output_dir.clone(),
            page_delay: config.page_delay,
            bulk_page_delay: config.bulk_page_delay,
        }
    }
}

/// One export run.
pub struct ExportPipeline<F: Fetch> {
    fetcher: F,
    query: SelectQuery,
    descriptor: FormatDescriptor,
    writer: Box<dyn PageWriter>,
    options: PipelineOptions,
    report: ExportReport,
}

impl<F: Fetch> ExportPipeline<F> {
    /// Creates a pipeline for `query`, written according to `descriptor`.
    pub fn new(
        fetcher: F,
        query: SelectQuery,
        descriptor: FormatDescriptor,
        options: PipelineOptions,
    ) -> Self {
        Self {
            fetcher,
            query,
            writer: writer_for(descriptor.writer),
            descriptor,
            options,
            report: ExportReport::default(),
        }
    }

    /// State the export starts in.
    pub fn initial_state(&self) -> PipelineState {
        if self.descriptor.paginates_natively {
            PipelineState::Paging(CursorState::new())
        } else {
            PipelineState::CountPending
        }
    }

    /// Runs the export to completion.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or write error; nothing is retried.
    pub async fn run(mut self) -> Result<ExportReport, ExportError> {
        let start = Instant::now();
        let mut state = self.initial_state();

        if self.descriptor.paginates_natively {
            self.query
                .set("rows", self.options.rows_per_page)
                .set("sort", CURSOR_SORT);
            self.apply_field_list();
        }

        loop {
            state = match state {
                PipelineState::Done => break,
                PipelineState::CountPending => self.count().await?,
                PipelineState::SinglePage { rows } => self.single_page(rows).await?,
                PipelineState::Paging(cursor) if self.descriptor.paginates_natively => {
                    self.cursor_page(cursor).await?
                }
                PipelineState::Paging(cursor) => self.bulk_page(cursor).await?,
            };
        }

        self.report.elapsed_seconds = start.elapsed().as_secs_f64();
        info!(
            "Finished: {} page file(s), {} request(s) in {:.1}s",
            self.report.pages_written(),
            self.report.requests,
            self.report.elapsed_seconds
        );
        Ok(self.report)
    }

    /// Count-only request deciding between one bulk request and manual paging.
    async fn count(&mut self) -> Result<PipelineState, ExportError> {
        info!("Getting meta data");
        self.query.set("rows", 0).set("wt", "json").remove("fl");

        let (url, fetched) = self.fetch_checked().await?;
        let total = SelectResponse::parse(&fetched.body, &url)?.num_found(&url)?;
        self.report.documents_found = Some(total);
        info!("Docs found: {}", total);

        Ok(if total == 0 {
            PipelineState::Done
        } else if total < u64::from(self.options.rows_per_page) {
            PipelineState::SinglePage { rows: total }
        } else {
            PipelineState::Paging(CursorState::new())
        })
    }

    /// All matches of a bulk format in one request.
    async fn single_page(&mut self, rows: u64) -> Result<PipelineState, ExportError> {
        info!("Getting data");
        self.query.set("rows", rows);
        self.apply_response_writer();
        self.apply_field_list();

        let (url, fetched) = self.fetch_checked().await?;
        self.write_response(1, &url, &fetched)?;
        Ok(PipelineState::Done)
    }

    /// One page of a format whose responses carry the next cursor.
    async fn cursor_page(&mut self, mut cursor: CursorState) -> Result<PipelineState, ExportError> {
        info!("Getting page {}", cursor.page_number);
        self.query.set("cursorMark", &cursor.current);

        let (url, fetched) = self.fetch_checked().await?;
        let response = SelectResponse::parse(&fetched.body, &url)?;
        self.write_documents(cursor.page_number, response.docs())?;

        if cursor.advance(response.next_cursor(&url)?) {
            return Ok(PipelineState::Done);
        }
        tokio::time::sleep(self.options.page_delay).await;
        Ok(PipelineState::Paging(cursor))
    }

    /// One page of a bulk format: a metadata request for the cursor, then the
    /// data request for the same page.
    async fn bulk_page(&mut self, mut cursor: CursorState) -> Result<PipelineState, ExportError> {
        info!("Getting page {}", cursor.page_number);
        self.query
            .set("rows", self.options.rows_per_page)
            .set("sort", CURSOR_SORT)
            .set("cursorMark", &cursor.current)
            .set("wt", "json")
            .set("fl", "id");

        let (url, fetched) = self.fetch_checked().await?;
        let meta = SelectResponse::parse(&fetched.body, &url)?;
        let next = meta.next_cursor(&url)?.to_string();

        // an empty page would only yield a header-only file, so no data request
        if meta.docs().is_empty() {
            debug!("Page {} is empty, skipping data request", cursor.page_number);
        } else {
            self.apply_response_writer();
            self.apply_field_list();
            let (url, fetched) = self.fetch_checked().await?;
            self.write_response(cursor.page_number, &url, &fetched)?;
        }

        if cursor.advance(&next) {
            return Ok(PipelineState::Done);
        }
        tokio::time::sleep(self.options.bulk_page_delay).await;
        Ok(PipelineState::Paging(cursor))
    }

    fn apply_field_list(&mut self) {
        match self.descriptor.field_list {
            Some(fields) => self.query.set("fl", fields),
            None => self.query.remove("fl"),
        };
    }

    fn apply_response_writer(&mut self) {
        match self.descriptor.response_writer {
            Some(wt) => self.query.set("wt", wt),
            None => self.query.remove("wt"),
        };
    }

    /// Sends the current request; any non-2xx status is an error.
    async fn fetch_checked(&mut self) -> Result<(String, FetchedBody), ExportError> {
        let url = self.query.url();
        debug!("Requesting {}", url);
        self.report.requests += 1;

        let fetched = self.fetcher.fetch(&url).await?;
        if !fetched.is_success() {
            return Err(FetchError::HttpStatus {
                status: fetched.status,
                url: url.to_string(),
                excerpt: sanitize_and_truncate_error_message(&fetched.body),
            }
            .into());
        }
        Ok((url.to_string(), fetched))
    }

    /// Writes a data response in the shape the descriptor declares.
    fn write_response(
        &mut self,
        page_number: u32,
        url: &str,
        fetched: &FetchedBody,
    ) -> Result<(), ExportError> {
        match self.descriptor.payload {
            PayloadKind::Tabular => {
                self.write_payload(page_number, &PagePayload::Tabular(&fetched.body))
            }
            PayloadKind::Documents => {
                let response = SelectResponse::parse(&fetched.body, url)?;
                self.write_documents(page_number, response.docs())
            }
        }
    }

    /// Writes documents, unless there are none.
    fn write_documents(
        &mut self,
        page_number: u32,
        docs: &[serde_json::Value],
    ) -> Result<(), ExportError> {
        if docs.is_empty() {
            debug!("Page {} has no documents, nothing written", page_number);
            return Ok(());
        }
        self.write_payload(page_number, &PagePayload::Documents(docs))?;
        self.report.documents_written += docs.len() as u64;
        Ok(())
    }

    fn write_payload(
        &mut self,
        page_number: u32,
        payload: &PagePayload<'_>,
    ) -> Result<(), ExportError> {
        let path = self.options.output_dir.join(format!(
            "page{}.{}",
            page_number, self.descriptor.extension
        ));
        self.writer.write_page(payload, &path)?;
        info!("Wrote {} ({} writer)", path.display(), self.writer.name());
        self.report.files.push(path);
        Ok(())
    }
}
