//! Crawler coordinator - main crawl orchestration logic
//!
//! Drives the three-level traversal:
//! 1. Fetch the root page and extract period links
//! 2. Spawn one task per period; at most `max-concurrent-periods` run at once
//! 3. Within a period, process documents strictly one after another:
//!    fetch page, extract, download attachment, write attachment, append row
//!
//! Remote failures (after retries) and parse failures end only their own
//! branch. Storage failures end the whole run: the remaining period tasks are
//! told to stop and are drained, so none of them is cut off between writing
//! an attachment and appending its row.

use crate::config::Config;
use crate::crawler::extractor::{DocumentExtractor, PageExtractor, PeriodExtractor, RootExtractor};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::crawler::report::{CrawlReport, PeriodStatus, PeriodSummary};
use crate::crawler::retry::{with_retry, RetryOutcome, RetryPolicy};
use crate::model::{CrawlTarget, DocumentLink, MetadataRecord, PeriodLink};
use crate::storage::{Persister, StorageError};
use crate::url::attachment_file_name;
use crate::HarvestError;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// What happened to a single document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentStatus {
    Harvested,
    Skipped,
}

/// Everything a period task needs, shared across tasks
struct CrawlContext {
    fetcher: Fetcher,
    persister: Persister,
    retry: RetryPolicy,
    root_extractor: RootExtractor,
    period_extractor: PeriodExtractor,
    document_extractor: DocumentExtractor,
    /// Set after a fatal storage failure; period tasks stop at the next document
    stopping: AtomicBool,
}

impl CrawlContext {
    fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Fetches a URL with retry; `None` once the retry budget is exhausted
    async fn fetch(&self, url: &Url, what: &str, period: Option<&str>) -> Option<Vec<u8>> {
        let outcome = with_retry(&self.retry, url.as_str(), period, |attempt| async move {
            tracing::info!(url = %url, period, attempt, "Fetching {}", what);
            self.fetcher.fetch(url.as_str()).await.into_result()
        })
        .await;

        match outcome {
            RetryOutcome::Completed(body) => Some(body),
            RetryOutcome::GivenUp {
                attempts,
                last_error,
            } => {
                tracing::warn!(
                    url = %url,
                    period,
                    attempts,
                    error = %last_error,
                    "Giving up on {}",
                    what
                );
                None
            }
        }
    }

    async fn fetch_page(&self, target: &CrawlTarget) -> Option<Vec<u8>> {
        self.fetch(
            &target.url,
            &format!("{} page", target.kind),
            target.period.as_deref(),
        )
        .await
    }

    /// Fetches the root page and extracts period links
    ///
    /// Returns `None` if the root page could not be fetched.
    async fn discover_periods(&self, root: &CrawlTarget) -> Option<Vec<PeriodLink>> {
        let body = self.fetch_page(root).await?;
        let html = String::from_utf8_lossy(&body);

        match self.root_extractor.extract(&html, &root.url) {
            Ok(links) => Some(links),
            Err(e) => {
                tracing::error!(url = %root.url, error = %e, "Failed to parse root page");
                Some(Vec::new())
            }
        }
    }

    /// Processes one period: fetch its index, then each document in order
    async fn process_period(&self, link: PeriodLink) -> Result<PeriodSummary, StorageError> {
        let period = link.period.clone();
        if self.is_stopping() {
            tracing::info!(period = %period, "Crawl stopping, period not started");
            return Ok(PeriodSummary::new(&period, PeriodStatus::GivenUp));
        }

        let target = CrawlTarget::period(link);
        tracing::info!(period = %period, url = %target.url, "Processing period");

        let Some(body) = self.fetch_page(&target).await else {
            return Ok(PeriodSummary::new(&period, PeriodStatus::GivenUp));
        };

        let documents = {
            let html = String::from_utf8_lossy(&body);
            match self.period_extractor.extract(&html, &target.url) {
                Ok(documents) => documents,
                Err(e) => {
                    tracing::warn!(
                        period = %period,
                        url = %target.url,
                        error = %e,
                        "Failed to parse period page"
                    );
                    Vec::new()
                }
            }
        };

        if documents.is_empty() {
            tracing::info!(period = %period, url = %target.url, "No document links found");
            return Ok(PeriodSummary::new(&period, PeriodStatus::Empty));
        }

        let mut summary = PeriodSummary::new(&period, PeriodStatus::Completed);
        summary.documents_discovered = documents.len();
        tracing::info!(period = %period, documents = documents.len(), "Discovered documents");

        for document in documents {
            if self.is_stopping() {
                tracing::info!(period = %period, "Crawl stopping, remaining documents left");
                break;
            }
            match self.process_document(&period, document).await? {
                DocumentStatus::Harvested => summary.records_written += 1,
                DocumentStatus::Skipped => summary.documents_skipped += 1,
            }
        }

        tracing::info!(
            period = %period,
            records = summary.records_written,
            skipped = summary.documents_skipped,
            "Completed period"
        );
        Ok(summary)
    }

    /// Processes one document; only storage failures are returned as errors
    ///
    /// The attachment is written before the metadata row, and the row is only
    /// appended once the attachment is on disk.
    async fn process_document(
        &self,
        period: &str,
        link: DocumentLink,
    ) -> Result<DocumentStatus, StorageError> {
        let target = CrawlTarget::document(link, period);

        let Some(body) = self.fetch_page(&target).await else {
            return Ok(DocumentStatus::Skipped);
        };

        let page = {
            let html = String::from_utf8_lossy(&body);
            match self.document_extractor.extract(&html, &target.url) {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        period,
                        url = %target.url,
                        error = %e,
                        "Failed to parse document page"
                    );
                    return Ok(DocumentStatus::Skipped);
                }
            }
        };

        let Some(attachment_url) = page.attachment_url else {
            tracing::warn!(period, url = %target.url, "No attachment link found");
            return Ok(DocumentStatus::Skipped);
        };

        if attachment_file_name(&attachment_url).is_none() {
            tracing::warn!(
                period,
                url = %target.url,
                attachment = %attachment_url,
                "Attachment URL has no file name"
            );
            return Ok(DocumentStatus::Skipped);
        }

        let Some(bytes) = self.fetch(&attachment_url, "attachment", Some(period)).await else {
            return Ok(DocumentStatus::Skipped);
        };

        // Nothing of this document is written once the crawl is stopping
        if self.is_stopping() {
            return Ok(DocumentStatus::Skipped);
        }

        self.persister
            .write_attachment(period, &attachment_url, &bytes)
            .await?;

        let record = MetadataRecord::new(page.title, period, page.authors, attachment_url);
        self.persister.append_record(&record).await?;
        tracing::info!(period, title = %record.title, "Metadata written");

        Ok(DocumentStatus::Harvested)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    context: Arc<CrawlContext>,
    limiter: ConcurrencyLimiter,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the shared HTTP client, compiles the page selectors and creates
    /// a fresh metadata file containing only the header row.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Bad selectors, client construction or file creation failed
    pub async fn new(config: Config) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(&config.http)?;
        let root_extractor = RootExtractor::new(&config.source)?;
        let period_extractor = PeriodExtractor::new(&config.source)?;
        let document_extractor = DocumentExtractor::new(&config.source)?;
        let persister =
            Persister::create(&config.output.metadata_path, &config.output.attachments_dir).await?;

        let retry = RetryPolicy::new(config.crawler.max_attempts, config.crawler.retry_delay());
        let limiter = ConcurrencyLimiter::new(config.crawler.max_concurrent_periods);

        Ok(Self {
            config: Arc::new(config),
            context: Arc::new(CrawlContext {
                fetcher,
                persister,
                retry,
                root_extractor,
                period_extractor,
                document_extractor,
                stopping: AtomicBool::new(false),
            }),
            limiter,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Returns a report even when the root page could not be fetched
    /// (`root_given_up`). Returns an error only for fatal storage failures,
    /// once every other period task has stopped at a document boundary.
    pub async fn run(&self) -> Result<CrawlReport, HarvestError> {
        let mut report = CrawlReport::new(Utc::now());
        let root = CrawlTarget::root(Url::parse(&self.config.source.base_url)?);

        tracing::info!(url = %root.url, "Starting crawl");

        let Some(periods) = self.context.discover_periods(&root).await else {
            tracing::error!(url = %root.url, "Root page unavailable, nothing harvested");
            report.root_given_up = true;
            report.finish();
            return Ok(report);
        };

        if periods.is_empty() {
            tracing::warn!(url = %root.url, "No period links found");
        }
        report.periods_discovered = periods.len();

        let mut tasks = JoinSet::new();
        for link in periods {
            tracing::info!(period = %link.period, "Adding period to queue");
            let context = self.context.clone();
            let limiter = self.limiter.clone();

            tasks.spawn(async move {
                let _permit = limiter.acquire().await;
                context.process_period(link).await
            });
        }

        let mut fatal = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(summary)) => report.record_period(&summary),
                Ok(Err(e)) if fatal.is_none() => {
                    tracing::error!(error = %e, "Storage failure, stopping crawl");
                    self.context.stopping.store(true, Ordering::SeqCst);
                    fatal = Some(e);
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Further storage failure while stopping");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Period task aborted");
                    report.periods_aborted += 1;
                }
            }
        }

        if let Some(e) = fatal {
            return Err(e.into());
        }

        report.peak_concurrent_periods = self.limiter.peak();
        report.finish();
        report.log_summary();

        Ok(report)
    }

    /// Path of the metadata file written by this run
    pub fn metadata_path(&self) -> &std::path::Path {
        self.context.persister.metadata_path()
    }
}

/// Builds a coordinator and runs the crawl
///
/// # Example
///
/// ```no_run
/// use paper_harvest::config::Config;
/// use paper_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("{} records written", report.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    let coordinator = Coordinator::new(config).await?;
    coordinator.run().await
}
