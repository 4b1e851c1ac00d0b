//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small three-level archive and run the
//! full harvest end-to-end against it.

use paper_harvest::config::Config;
use paper_harvest::crawler::{Coordinator, CrawlReport};
use paper_harvest::output::load_statistics;
use paper_harvest::storage::parse_rows;
use paper_harvest::HarvestError;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEADER: [&str; 4] = ["Title", "Year", "Authors", "PDF Link"];

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.source.base_url = format!("{}/", server.uri());
    config.http.timeout_secs = 5;
    config.crawler.max_attempts = 3;
    config.crawler.retry_delay_ms = 10;
    config.crawler.max_concurrent_periods = 4;
    config.output.metadata_path = dir.path().join("papers_metadata.csv");
    config.output.attachments_dir = dir.path().join("papers");
    config.output.summary_path = dir.path().join("papers_summary.md");
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><head></head><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn period_path(year: &str) -> String {
    format!("/paper_files/paper/{}", year)
}

fn document_path(year: &str, id: &str) -> String {
    format!("/paper_files/paper/{}/hash/{}-Abstract.html", year, id)
}

fn attachment_path(year: &str, id: &str) -> String {
    format!("/paper_files/paper/{}/file/{}-Paper.pdf", year, id)
}

fn attachment_bytes(id: &str) -> Vec<u8> {
    format!("%PDF-1.4 {}", id).into_bytes()
}

/// Mounts the root index listing the given years
async fn mount_root(server: &MockServer, years: &[&str]) {
    let items: String = years
        .iter()
        .map(|year| format!(r#"<li><a href="{}">NeurIPS {}</a></li>"#, period_path(year), year))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<div class="container-fluid"><div class="col-sm"><ul>{}</ul></div></div>
               <a href="/admin/login">Login</a>"#,
            items
        )))
        .mount(server)
        .await;
}

/// Mounts a period index listing the given document ids
async fn mount_period(server: &MockServer, year: &str, ids: &[&str]) {
    let items: String = ids
        .iter()
        .map(|id| format!(r#"<li><a href="{}">Paper {}</a></li>"#, document_path(year, id), id))
        .collect();

    Mock::given(method("GET"))
        .and(path(period_path(year)))
        .respond_with(html(&format!(
            r#"<a href="/">Home</a><ul class="paper-list">{}</ul>"#,
            items
        )))
        .mount(server)
        .await;
}

/// Mounts a document page and its attachment
async fn mount_document(server: &MockServer, year: &str, id: &str, authors: Option<&str>) {
    let authors = authors
        .map(|a| format!("<h4>Authors</h4><p><i>{}</i></p>", a))
        .unwrap_or_default();

    Mock::given(method("GET"))
        .and(path(document_path(year, id)))
        .respond_with(html(&format!(
            r#"<div class="container-fluid"><div class="col">
               <h4>Paper {id} Title</h4>
               <a class="btn" href="{pdf}">Paper</a>
               {authors}
               <h4>Abstract</h4><p>Text.</p></div></div>"#,
            id = id,
            pdf = attachment_path(year, id),
            authors = authors
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(attachment_path(year, id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(attachment_bytes(id))
                .insert_header("content-type", "application/pdf"),
        )
        .mount(server)
        .await;
}

async fn run(config: Config) -> Result<CrawlReport, HarvestError> {
    let coordinator = Coordinator::new(config).await?;
    coordinator.run().await
}

/// Reads the metadata file, asserting the header and returning the data rows
fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let text = std::fs::read_to_string(path).expect("Failed to read metadata file");
    assert!(text.is_empty() || text.ends_with('\n'), "partial line in sink");

    let mut rows = parse_rows(&text).into_iter();
    let header = rows.next().expect("Missing header row");
    assert_eq!(header, HEADER);
    rows.collect()
}

fn rows_for_year<'a>(rows: &'a [Vec<String>], year: &str) -> Vec<&'a Vec<String>> {
    rows.iter().filter(|row| row[1] == year).collect()
}

#[tokio::test]
async fn test_full_harvest_two_periods() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["2020", "2021"]).await;
    mount_period(&server, "2020", &["a1", "a2"]).await;
    mount_period(&server, "2021", &["b1"]).await;
    mount_document(&server, "2020", "a1", Some("Ada Lovelace, Alan Turing")).await;
    mount_document(&server, "2020", "a2", Some("Grace Hopper")).await;
    mount_document(&server, "2021", "b1", Some("Alan Turing")).await;

    let config = create_test_config(&server, &dir);
    let report = run(config.clone()).await.expect("Crawl failed");

    assert!(!report.root_given_up);
    assert_eq!(report.periods_discovered, 2);
    assert_eq!(report.periods_completed, 2);
    assert_eq!(report.documents_discovered, 3);
    assert_eq!(report.records_written, 3);
    assert_eq!(report.documents_skipped, 0);

    let rows = read_rows(&config.output.metadata_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows_for_year(&rows, "2020").len(), 2);
    assert_eq!(rows_for_year(&rows, "2021").len(), 1);

    let b1 = rows_for_year(&rows, "2021")[0];
    assert_eq!(b1[0], "Paper b1 Title");
    assert_eq!(b1[2], "Alan Turing");
    assert_eq!(b1[3], format!("{}{}", server.uri(), attachment_path("2021", "b1")));

    let papers = &config.output.attachments_dir;
    assert_eq!(
        std::fs::read(papers.join("2020").join("a1-Paper.pdf")).unwrap(),
        attachment_bytes("a1")
    );
    assert!(papers.join("2020").join("a2-Paper.pdf").exists());
    assert!(papers.join("2021").join("b1-Paper.pdf").exists());

    // Statistics over the harvested file
    let stats = load_statistics(&config.output.metadata_path).unwrap();
    assert_eq!(stats.total_rows, 3);
    assert_eq!(stats.rows_per_year.get(&2020), Some(&2));
    assert_eq!(stats.top_authors[0], ("Alan Turing".to_string(), 2));
}

#[tokio::test]
async fn test_documents_within_period_are_sequential() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["2020"]).await;
    mount_period(&server, "2020", &["d1", "d2", "d3"]).await;
    for id in ["d1", "d2", "d3"] {
        mount_document(&server, "2020", id, Some("Someone")).await;
    }

    let config = create_test_config(&server, &dir);
    run(config.clone()).await.expect("Crawl failed");

    let requested: Vec<String> = server
        .received_requests()
        .await
        .expect("Request recording disabled")
        .into_iter()
        .map(|request| request.url.path().to_string())
        .filter(|p| p.contains("/hash/") || p.contains("/file/"))
        .collect();

    let expected: Vec<String> = ["d1", "d2", "d3"]
        .iter()
        .flat_map(|id| [document_path("2020", id), attachment_path("2020", id)])
        .collect();
    assert_eq!(requested, expected);

    let titles: Vec<_> = read_rows(&config.output.metadata_path)
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(titles, vec!["Paper d1 Title", "Paper d2 Title", "Paper d3 Title"]);
}

#[tokio::test]
async fn test_missing_authors_written_as_not_available() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["2020"]).await;
    mount_period(&server, "2020", &["x1"]).await;
    mount_document(&server, "2020", "x1", None).await;

    let config = create_test_config(&server, &dir);
    run(config.clone()).await.expect("Crawl failed");

    let text = std::fs::read_to_string(&config.output.metadata_path).unwrap();
    let expected_line = format!(
        "\"Paper x1 Title\",2020,\"N/A\",{}{}\n",
        server.uri(),
        attachment_path("2020", "x1")
    );
    assert!(text.ends_with(&expected_line), "unexpected sink: {}", text);
}

#[tokio::test]
async fn test_document_without_attachment_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["2020"]).await;
    mount_period(&server, "2020", &["n1", "ok"]).await;
    mount_document(&server, "2020", "ok", Some("Someone")).await;
    Mock::given(method("GET"))
        .and(path(document_path("2020", "n1")))
        .respond_with(html("<h4>Orphan</h4><h4>Authors</h4><p>Nobody</p>"))
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let report = run(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.records_written, 1);
    assert_eq!(report.documents_skipped, 1);

    let rows = read_rows(&config.output.metadata_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Paper ok Title");

    let files: Vec<_> = std::fs::read_dir(config.output.attachments_dir.join("2020"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(files, vec!["ok-Paper.pdf"]);
}

#[tokio::test]
async fn test_failing_period_does_not_affect_siblings() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["2020", "2021"]).await;
    mount_period(&server, "2020", &["s1"]).await;
    mount_document(&server, "2020", "s1", Some("Someone")).await;

    // Exactly max_attempts requests, verified when the server drops
    Mock::given(method("GET"))
        .and(path(period_path("2021")))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let report = run(config.clone()).await.expect("Crawl should still succeed");

    assert_eq!(report.periods_completed, 1);
    assert_eq!(report.periods_given_up, 1);
    assert_eq!(report.records_written, 1);

    let rows = read_rows(&config.output.metadata_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "2020");
    assert!(!config.output.attachments_dir.join("2021").exists());
}

#[tokio::test]
async fn test_failing_attachment_skips_only_that_document() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["2020"]).await;
    mount_period(&server, "2020", &["bad", "good"]).await;
    mount_document(&server, "2020", "good", Some("Someone")).await;

    Mock::given(method("GET"))
        .and(path(document_path("2020", "bad")))
        .respond_with(html(&format!(
            r#"<h4>Bad</h4><a href="{}">Paper</a>"#,
            attachment_path("2020", "bad")
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(attachment_path("2020", "bad")))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let report = run(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.records_written, 1);
    assert_eq!(report.documents_skipped, 1);

    let rows = read_rows(&config.output.metadata_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Paper good Title");
    assert!(!config
        .output
        .attachments_dir
        .join("2020")
        .join("bad-Paper.pdf")
        .exists());
}

#[tokio::test]
async fn test_unreachable_root_writes_header_only() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let report = run(config.clone()).await.expect("Root give-up is not an error");

    assert!(report.root_given_up);
    assert_eq!(report.records_written, 0);

    let text = std::fs::read_to_string(&config.output.metadata_path).unwrap();
    assert_eq!(text, "Title,Year,Authors,PDF Link\n");
}

#[tokio::test]
async fn test_root_without_periods_completes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &[]).await;

    let config = create_test_config(&server, &dir);
    let report = run(config.clone()).await.expect("Crawl failed");

    assert!(!report.root_given_up);
    assert_eq!(report.periods_discovered, 0);
    assert!(read_rows(&config.output.metadata_path).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_period_concurrency_is_bounded() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let years = ["2015", "2016", "2017", "2018", "2019", "2020"];
    mount_root(&server, &years).await;
    for year in years {
        Mock::given(method("GET"))
            .and(path(period_path(year)))
            .respond_with(html("<p>No papers yet</p>").set_delay(Duration::from_millis(200)))
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(&server, &dir);
    config.crawler.max_concurrent_periods = 2;

    let start = Instant::now();
    let report = run(config).await.expect("Crawl failed");
    let elapsed = start.elapsed();

    assert_eq!(report.periods_empty, 6);
    assert!(report.peak_concurrent_periods >= 1);
    assert!(report.peak_concurrent_periods <= 2);
    // Six 200ms periods, two at a time
    assert!(elapsed >= Duration::from_millis(600), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_storage_failure_aborts_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["2020"]).await;
    mount_period(&server, "2020", &["f1"]).await;
    mount_document(&server, "2020", "f1", Some("Someone")).await;

    let mut config = create_test_config(&server, &dir);
    // A regular file where the attachments directory should be
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    config.output.attachments_dir = blocker;

    let result = run(config.clone()).await;
    assert!(matches!(result, Err(HarvestError::Storage(_))));
    assert!(read_rows(&config.output.metadata_path).is_empty());
}

#[tokio::test]
async fn test_failing_document_page_is_retried_then_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_root(&server, &["2020"]).await;
    mount_period(&server, "2020", &["down", "up"]).await;
    mount_document(&server, "2020", "up", Some("Someone")).await;

    // Exactly max_attempts requests, verified when the server drops
    Mock::given(method("GET"))
        .and(path(document_path("2020", "down")))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let report = run(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.periods_completed, 1);
    assert_eq!(report.records_written, 1);
    assert_eq!(report.documents_skipped, 1);

    let rows = read_rows(&config.output.metadata_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Paper up Title");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_storage_failure_leaves_no_unpaired_attachment() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let slow_ids = ["s1", "s2", "s3", "s4", "s5"];
    mount_root(&server, &["2020", "2021"]).await;
    mount_period(&server, "2020", &["f1"]).await;
    mount_document(&server, "2020", "f1", Some("Someone")).await;
    mount_period(&server, "2021", &slow_ids).await;

    for id in slow_ids {
        Mock::given(method("GET"))
            .and(path(document_path("2021", id)))
            .respond_with(
                html(&format!(
                    r#"<h4>Slow {}</h4><a href="{}">Paper</a>"#,
                    id,
                    attachment_path("2021", id)
                ))
                .set_delay(Duration::from_millis(150)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(attachment_path("2021", id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(attachment_bytes(id))
                    .set_delay(Duration::from_millis(150)),
            )
            .mount(&server)
            .await;
    }

    let config = create_test_config(&server, &dir);
    // A regular file where the 2020 directory should be; 2021 stays writable
    std::fs::create_dir_all(&config.output.attachments_dir).unwrap();
    std::fs::write(config.output.attachments_dir.join("2020"), b"blocker").unwrap();

    let result = run(config.clone()).await;
    assert!(matches!(result, Err(HarvestError::Storage(_))));

    let rows = read_rows(&config.output.metadata_path);
    let mut row_files: Vec<String> = rows_for_year(&rows, "2021")
        .iter()
        .map(|row| row[3].rsplit('/').next().unwrap().to_string())
        .collect();
    row_files.sort();

    let period_dir = config.output.attachments_dir.join("2021");
    let mut disk_files: Vec<String> = if period_dir.exists() {
        std::fs::read_dir(&period_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect()
    } else {
        Vec::new()
    };
    disk_files.sort();

    // Every attachment on disk has its row and the period stopped early
    assert_eq!(disk_files, row_files);
    assert!(row_files.len() < slow_ids.len(), "period was not stopped");
}
