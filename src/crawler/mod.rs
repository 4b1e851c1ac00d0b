//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with linear-backoff retry
//! - HTML extraction for the root, period and document pages
//! - The period concurrency gate
//! - Overall crawl coordination and the run report

mod coordinator;
mod extractor;
mod fetcher;
mod limiter;
mod report;
mod retry;

pub use coordinator::{run_crawl, Coordinator};
pub use extractor::{
    DocumentExtractor, DocumentPage, ExtractError, PageExtractor, PeriodExtractor, RootExtractor,
};
pub use fetcher::{build_http_client, fetch_url, FetchError, FetchOutcome, Fetcher};
pub use limiter::{ConcurrencyLimiter, LimiterPermit};
pub use report::{CrawlReport, PeriodStatus, PeriodSummary};
pub use retry::{with_retry, IsRetryable, RetryOutcome, RetryPolicy};

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create a fresh metadata file with the header row
/// 2. Build the HTTP client and page extractors
/// 3. Fetch the root page and discover periods
/// 4. Harvest every period under the concurrency bound
/// 5. Return the run report
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished (possibly with per-branch give-ups)
/// * `Err(HarvestError)` - Setup failed or a storage write failed
pub async fn crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    run_crawl(config).await
}
