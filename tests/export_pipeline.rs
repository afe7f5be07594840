//! Integration tests for run_export against a mock datastore
//!
//! These tests verify the request sequence and the files written for:
//! - Cursor-native formats (solr, xml, json)
//! - Bulk formats (csv): empty results, single request, manual paging
//! - Failures that abort the export

use datastore_export::{
    run_export, Config, ConfigError, Core, FilterMode, LogFormat, LogLevel, OutputFormat,
};
use serde_json::{json, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-subscription-key";

/// Helper function to create a Config pointed at the mock server
fn create_test_config(
    endpoint: String,
    output_dir: PathBuf,
    core: Core,
    format: OutputFormat,
    rows_per_page: u32,
) -> Config {
    Config {
        api_key: API_KEY.to_string(),
        filters_file: None,
        core,
        format,
        output_dir,
        rows_per_page,
        endpoint,
        filter_mode: FilterMode::Structured,
        timeout_seconds: 5,
        user_agent: "datastore_export_test/1.0".to_string(),
        page_delay: Duration::ZERO,
        bulk_page_delay: Duration::ZERO,
        log_level: LogLevel::Error, // Reduce noise in tests
        log_format: LogFormat::Plain,
    }
}

/// Helper function to build a select response body
fn select_body(num_found: u64, docs: Value, next_cursor: Option<&str>) -> Value {
    let mut body = json!({
        "responseHeader": {"status": 0},
        "response": {"numFound": num_found, "start": 0, "docs": docs},
    });
    if let Some(next) = next_cursor {
        body["nextCursorMark"] = json!(next);
    }
    body
}

/// Helper function to list the files of a directory, sorted by name
fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read output directory")
        .map(|entry| {
            entry
                .expect("Failed to read directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

async fn mount_cursor_page(
    server: &MockServer,
    core: &str,
    cursor: &str,
    docs: Value,
    next: &str,
) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/select", core)))
        .and(query_param("cursorMark", cursor))
        .respond_with(ResponseTemplate::new(200).set_body_json(select_body(
            100,
            docs,
            Some(next),
        )))
        .expect(1)
        .mount(server)
        .await;
}

/// Test that a cursor walk requests every page once and stops on a repeated cursor
#[tokio::test]
async fn test_solr_cursor_walk_writes_one_file_per_page() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    mount_cursor_page(&mock_server, "activity", "*", json!([{"id": "A"}, {"id": "B"}]), "c1").await;
    mount_cursor_page(&mock_server, "activity", "c1", json!([{"id": "C"}, {"id": "D"}]), "c2").await;
    mount_cursor_page(&mock_server, "activity", "c2", json!([{"id": "E"}]), "c3").await;
    mount_cursor_page(&mock_server, "activity", "c3", json!([]), "c3").await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().join("export"),
        Core::Activity,
        OutputFormat::Solr,
        2,
    );
    let report = run_export(config).await.expect("export should succeed");

    assert_eq!(report.requests, 4);
    assert_eq!(report.pages_written(), 3);
    assert_eq!(report.documents_written, 5);
    assert_eq!(
        list_files(&out.path().join("export")),
        ["page1.json", "page2.json", "page3.json"]
    );

    let page2: Vec<Value> = serde_json::from_str(
        &std::fs::read_to_string(out.path().join("export/page2.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(page2, vec![json!({"id": "C"}), json!({"id": "D"})]);
}

/// Test that a walk ends without an extra request when the last full page repeats its cursor
#[tokio::test]
async fn test_solr_cursor_walk_ends_on_repeated_cursor_of_last_page() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    mount_cursor_page(&mock_server, "activity", "*", json!([{"id": "A"}, {"id": "B"}]), "c1").await;
    mount_cursor_page(&mock_server, "activity", "c1", json!([{"id": "C"}, {"id": "D"}]), "c2").await;
    mount_cursor_page(&mock_server, "activity", "c2", json!([{"id": "E"}]), "c2").await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Activity,
        OutputFormat::Solr,
        2,
    );
    let report = run_export(config).await.expect("export should succeed");

    assert_eq!(report.requests, 3);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    assert_eq!(
        list_files(out.path()),
        ["page1.json", "page2.json", "page3.json"]
    );
}

/// Test that every request carries the subscription key and the paging parameters
#[tokio::test]
async fn test_requests_carry_key_and_paging_parameters() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    Mock::given(method("GET"))
        .and(path("/activity/select"))
        .and(header("Ocp-Apim-Subscription-Key", API_KEY))
        .and(query_param("q", "*:*"))
        .and(query_param("rows", "50"))
        .and(query_param("sort", "id asc"))
        .and(query_param("cursorMark", "*"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(select_body(1, json!([{"id": "A"}]), Some("*"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Activity,
        OutputFormat::Solr,
        50,
    );
    let report = run_export(config).await.expect("export should succeed");
    assert_eq!(report.requests, 1);
}

/// Test that the xml format wraps the stored XML of each activity
#[tokio::test]
async fn test_xml_export() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    Mock::given(method("GET"))
        .and(path("/activity/select"))
        .and(query_param("fl", "iati_xml"))
        .respond_with(ResponseTemplate::new(200).set_body_json(select_body(
            2,
            json!([
                {"iati_xml": "<iati-activity><iati-identifier>A</iati-identifier></iati-activity>"},
                {"iati_xml": "<iati-activity><iati-identifier>B</iati-identifier></iati-activity>"}
            ]),
            Some("*"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Activity,
        OutputFormat::Xml,
        10,
    );
    run_export(config).await.expect("export should succeed");

    let content = std::fs::read_to_string(out.path().join("page1.xml")).unwrap();
    assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<iati-activities version=\"2.03\""));
    assert!(content.contains("<iati-identifier>A</iati-identifier>"));
    assert!(content.contains("<iati-identifier>B</iati-identifier>"));
    assert!(content.trim_end().ends_with("</iati-activities>"));
}

/// Test that the json format parses each activity's embedded JSON
#[tokio::test]
async fn test_json_export() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    Mock::given(method("GET"))
        .and(path("/activity/select"))
        .and(query_param("fl", "iati_json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(select_body(
            1,
            json!([{"iati_json": "{\"iati-identifier\":\"A\",\"title\":{\"narrative\":[\"Water\"]}}"}]),
            Some("*"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Activity,
        OutputFormat::Json,
        10,
    );
    run_export(config).await.expect("export should succeed");

    let activities: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(out.path().join("page1.json")).unwrap())
            .unwrap();
    assert_eq!(
        activities,
        vec![json!({"iati-identifier": "A", "title": {"narrative": ["Water"]}})]
    );
}

/// Test that a bulk export with no matches stops after the count request
#[tokio::test]
async fn test_bulk_export_without_matches_writes_nothing() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    Mock::given(method("GET"))
        .and(path("/transaction/select"))
        .and(query_param("rows", "0"))
        .and(query_param("wt", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(select_body(0, json!([]), None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().join("empty"),
        Core::Transaction,
        OutputFormat::Csv,
        100,
    );
    let report = run_export(config).await.expect("export should succeed");

    assert_eq!(report.requests, 1);
    assert_eq!(report.documents_found, Some(0));
    assert!(list_files(&out.path().join("empty")).is_empty());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

/// Test that a bulk export below one page fetches everything in one data request
#[tokio::test]
async fn test_bulk_export_single_request() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");
    let csv_body = "id,transaction_value\nA-1,100\nA-2,250\n";

    Mock::given(method("GET"))
        .and(path("/budget/select"))
        .and(query_param("rows", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(select_body(2, json!([]), None)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/budget/select"))
        .and(query_param("rows", "2"))
        .and(query_param("wt", "csv"))
        .and(query_param_is_missing("cursorMark"))
        .respond_with(ResponseTemplate::new(200).set_body_string(csv_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Budget,
        OutputFormat::Csv,
        100,
    );
    let report = run_export(config).await.expect("export should succeed");

    assert_eq!(report.requests, 2);
    assert_eq!(report.documents_found, Some(2));
    assert_eq!(
        std::fs::read_to_string(out.path().join("page1.csv")).unwrap(),
        csv_body
    );
}

/// Test that a bulk export at or above one page pages with metadata requests
#[tokio::test]
async fn test_bulk_export_manual_paging() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    // count
    Mock::given(method("GET"))
        .and(path("/transaction/select"))
        .and(query_param("rows", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(select_body(3, json!([]), None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    // metadata: ids only, one per page
    for (cursor, docs, next) in [
        ("*", json!([{"id": "A"}, {"id": "B"}]), "c1"),
        ("c1", json!([{"id": "C"}]), "c2"),
        ("c2", json!([]), "c2"),
    ] {
        Mock::given(method("GET"))
            .and(path("/transaction/select"))
            .and(query_param("fl", "id"))
            .and(query_param("wt", "json"))
            .and(query_param("rows", "2"))
            .and(query_param("cursorMark", cursor))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(select_body(3, docs, Some(next))),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    // data: server-rendered CSV for the same cursor
    for (cursor, body) in [("*", "id\nA\nB\n"), ("c1", "id\nC\n")] {
        Mock::given(method("GET"))
            .and(path("/transaction/select"))
            .and(query_param("wt", "csv"))
            .and(query_param("cursorMark", cursor))
            .and(query_param_is_missing("fl"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Transaction,
        OutputFormat::Csv,
        2,
    );
    let report = run_export(config).await.expect("export should succeed");

    assert_eq!(report.requests, 6);
    assert_eq!(list_files(out.path()), ["page1.csv", "page2.csv"]);
    assert_eq!(
        std::fs::read_to_string(out.path().join("page2.csv")).unwrap(),
        "id\nC\n"
    );
}

/// Test that flat-csv flattens multi-valued fields locally
#[tokio::test]
async fn test_flat_csv_export() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    Mock::given(method("GET"))
        .and(path("/activity/select"))
        .and(query_param("rows", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(select_body(1, json!([]), None)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/activity/select"))
        .and(query_param("rows", "1"))
        .and(query_param("wt", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(select_body(
            1,
            json!([{"iati_identifier": "GB-1-1", "sector_code": ["11110", "12220"]}]),
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Activity,
        OutputFormat::FlatCsv,
        100,
    );
    run_export(config).await.expect("export should succeed");

    assert_eq!(
        std::fs::read_to_string(out.path().join("page1.csv")).unwrap(),
        "iati_identifier,sector_code\nGB-1-1,\"11110,12220\"\n"
    );
}

/// Test that a rejected key aborts the export with the status in the message
#[tokio::test]
async fn test_unauthorized_aborts_export() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("Access denied due to invalid subscription key."),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Activity,
        OutputFormat::Solr,
        10,
    );
    let err = run_export(config).await.expect_err("export should fail");

    let message = format!("{:#}", err);
    assert!(message.contains("status: 401"), "unexpected message: {message}");
    assert!(message.contains("invalid subscription key"));
    assert!(list_files(out.path()).is_empty());
}

/// Test that a failure mid-walk keeps the pages already written
#[tokio::test]
async fn test_failure_keeps_earlier_pages() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    mount_cursor_page(&mock_server, "activity", "*", json!([{"id": "A"}]), "c1").await;
    Mock::given(method("GET"))
        .and(query_param("cursorMark", "c1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Activity,
        OutputFormat::Solr,
        1,
    );
    let err = run_export(config).await.expect_err("export should fail");

    assert!(format!("{:#}", err).contains("status: 500"));
    assert_eq!(list_files(out.path()), ["page1.json"]);
}

/// Test that a format the core does not offer is rejected before any request
#[tokio::test]
async fn test_invalid_format_for_core_sends_nothing() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    let config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Budget,
        OutputFormat::Xml,
        10,
    );
    let err = run_export(config).await.expect_err("export should fail");

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::FormatNotAllowed { .. })
    ));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

/// Test that the filters file is compiled into the q parameter
#[tokio::test]
async fn test_filters_file_becomes_query() {
    let mock_server = MockServer::start().await;
    let out = TempDir::new().expect("Failed to create temp directory");

    let mut filters = NamedTempFile::new().expect("Failed to create temp file");
    write!(
        filters,
        r#"{{"data": [
            {{"id": 1, "field": "reporting_org_ref", "type": "combo", "operator": "equals", "value": "GB-GOV-1"}},
            {{"id": 2, "field": "activity_date_iso_date", "type": "date", "operator": "greaterThan", "value": "2020-01-01", "joinOperator": "AND"}}
        ]}}"#
    )
    .expect("Failed to write filters");
    filters.flush().expect("Failed to flush file");

    Mock::given(method("GET"))
        .and(path("/activity/select"))
        .and(query_param(
            "q",
            "reporting_org_ref:(GB-GOV-1) AND activity_date_iso_date:[2020-01-01T00:00:00Z TO *]",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(select_body(0, json!([]), Some("*"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(
        mock_server.uri(),
        out.path().to_path_buf(),
        Core::Activity,
        OutputFormat::Solr,
        10,
    );
    config.filters_file = Some(filters.path().to_path_buf());
    let report = run_export(config).await.expect("export should succeed");

    assert_eq!(report.requests, 1);
    assert_eq!(report.pages_written(), 0);
}
