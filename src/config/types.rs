use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Paper-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub http: HttpConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Where to crawl and how to recognise the interesting parts of each page
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Root index page listing every period
    pub base_url: String,

    /// CSS selector for period links on the root page
    pub period_link_selector: String,

    /// Substring an href must contain to count as a document link
    pub document_link_pattern: String,

    /// CSS selector for the title heading on a document page
    pub title_selector: String,

    /// Marker text of the heading that precedes the author list
    pub authors_marker: String,

    /// Marker text of the anchor pointing at the attachment
    pub attachment_marker: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://papers.nips.cc/".to_string(),
            period_link_selector: "body > div.container-fluid > div.col-sm > ul > li > a"
                .to_string(),
            document_link_pattern: "/paper/".to_string(),
            title_selector: "h4".to_string(),
            authors_marker: "Authors".to_string(),
            attachment_marker: "Paper".to_string(),
        }
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Total per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/94.0.4606.61 Safari/537.36"
                .to_string(),
            timeout_secs: 60,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Attempts per fetch before giving up on a branch
    pub max_attempts: u32,

    /// Base delay between attempts (milliseconds), multiplied by the attempt number
    pub retry_delay_ms: u64,

    /// Maximum number of period pages processed concurrently
    pub max_concurrent_periods: usize,
}

impl CrawlerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_ms: 1000,
            max_concurrent_periods: 4,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the CSV metadata file
    pub metadata_path: PathBuf,

    /// Directory under which one folder per period is created
    pub attachments_dir: PathBuf,

    /// Path to the markdown statistics summary
    pub summary_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            metadata_path: PathBuf::from("papers_metadata.csv"),
            attachments_dir: PathBuf::from("."),
            summary_path: PathBuf::from("papers_summary.md"),
        }
    }
}
