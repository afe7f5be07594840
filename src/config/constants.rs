//! Configuration constants.
//!
//! This module defines the constants used throughout the exporter, including the
//! default API endpoint, paging limits, courtesy delays, and the names of the
//! index fields the writers read.

use std::time::Duration;

/// Base URL of the IATI Datastore API. The core name and `/select` are appended.
pub const DEFAULT_ENDPOINT: &str = "https://api.iatistandard.org/datastore";

/// Header carrying the API subscription key on every request.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Environment variable consulted when `--apikey` is not given.
pub const API_KEY_ENV: &str = "DATASTORE_API_KEY";

/// Default number of documents requested per page.
pub const DEFAULT_ROWS_PER_PAGE: u32 = 100;

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Pause between pages on the cursor-native path.
pub const PAGE_DELAY: Duration = Duration::from_millis(1000);

/// Pause between pages when a bulk format has to be paged manually.
pub const BULK_PAGE_DELAY: Duration = Duration::from_millis(2000);

/// Cursor token that starts a cursor walk.
pub const INITIAL_CURSOR: &str = "*";

/// Sort order required by cursor paging (must include the unique key).
pub const CURSOR_SORT: &str = "id asc";

/// Query used when no filters are supplied.
pub const MATCH_ALL_QUERY: &str = "*:*";

/// Index field holding the original activity XML.
pub const RAW_XML_FIELD: &str = "iati_xml";

/// Index field holding the activity serialized as JSON.
pub const EMBEDDED_JSON_FIELD: &str = "iati_json";

/// `version` attribute written on the reconstructed `<iati-activities>` root.
pub const IATI_XML_VERSION: &str = "2.03";

/// Separator used when flattening multi-valued fields into a single CSV cell.
pub const CSV_MULTIVALUE_SEPARATOR: &str = ",";

/// User-Agent header sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("datastore_export/", env!("CARGO_PKG_VERSION"));

// Error message size limits
/// Maximum length of a response-body excerpt carried in an error message.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 500;
