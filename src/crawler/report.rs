//! Run report produced by the coordinator

use chrono::{DateTime, Utc};

/// How one period branch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodStatus {
    /// Every discovered document was processed (harvested or skipped)
    Completed,
    /// The period page listed no documents
    Empty,
    /// The period page could not be fetched within the retry budget
    GivenUp,
}

/// Per-period counters returned by a period task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSummary {
    pub period: String,
    pub status: PeriodStatus,
    pub documents_discovered: usize,
    pub records_written: usize,
    pub documents_skipped: usize,
}

impl PeriodSummary {
    pub fn new(period: &str, status: PeriodStatus) -> Self {
        Self {
            period: period.to_string(),
            status,
            documents_discovered: 0,
            records_written: 0,
            documents_skipped: 0,
        }
    }
}

/// Outcome of a whole crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// The root page could not be fetched; nothing was harvested
    pub root_given_up: bool,

    pub periods_discovered: usize,
    pub periods_completed: usize,
    pub periods_empty: usize,
    pub periods_given_up: usize,
    /// Period tasks that panicked
    pub periods_aborted: usize,

    pub documents_discovered: usize,
    pub records_written: usize,
    pub documents_skipped: usize,

    /// Highest number of period branches observed running at once
    pub peak_concurrent_periods: usize,
}

impl CrawlReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            root_given_up: false,
            periods_discovered: 0,
            periods_completed: 0,
            periods_empty: 0,
            periods_given_up: 0,
            periods_aborted: 0,
            documents_discovered: 0,
            records_written: 0,
            documents_skipped: 0,
            peak_concurrent_periods: 0,
        }
    }

    /// Folds one period's counters into the report
    pub fn record_period(&mut self, summary: &PeriodSummary) {
        match summary.status {
            PeriodStatus::Completed => self.periods_completed += 1,
            PeriodStatus::Empty => self.periods_empty += 1,
            PeriodStatus::GivenUp => self.periods_given_up += 1,
        }
        self.documents_discovered += summary.documents_discovered;
        self.records_written += summary.records_written;
        self.documents_skipped += summary.documents_skipped;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Logs the report at info level
    pub fn log_summary(&self) {
        tracing::info!(
            periods = self.periods_discovered,
            completed = self.periods_completed,
            empty = self.periods_empty,
            given_up = self.periods_given_up,
            aborted = self.periods_aborted,
            peak_concurrent = self.peak_concurrent_periods,
            "Periods processed"
        );
        tracing::info!(
            documents = self.documents_discovered,
            records = self.records_written,
            skipped = self.documents_skipped,
            duration_secs = self.duration_seconds().unwrap_or_default(),
            "Documents processed"
        );
    }
}
