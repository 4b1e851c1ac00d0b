use crate::url::extract_period_id;
use std::fmt;
use url::Url;

/// Role of a page in the archive hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Top-level index listing every period
    Root,
    /// Per-period index listing documents
    Period,
    /// Detail page of a single document
    Document,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Period => write!(f, "period"),
            Self::Document => write!(f, "document"),
        }
    }
}

/// A link to a period index page
///
/// Can only be constructed from a URL that carries a 4-digit period segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodLink {
    pub url: Url,
    pub period: String,
}

impl PeriodLink {
    /// Builds a period link, failing closed when the URL has no period segment
    pub fn from_url(url: Url) -> Option<Self> {
        let period = extract_period_id(&url)?;
        Some(Self { url, period })
    }
}

/// A link to a document detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    pub url: Url,
}

/// A page scheduled for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,
    pub kind: PageKind,
    /// Unknown for the root page, resolved for every level below it
    pub period: Option<String>,
}

impl CrawlTarget {
    pub fn root(url: Url) -> Self {
        Self {
            url,
            kind: PageKind::Root,
            period: None,
        }
    }

    pub fn period(link: PeriodLink) -> Self {
        Self {
            url: link.url,
            kind: PageKind::Period,
            period: Some(link.period),
        }
    }

    pub fn document(link: DocumentLink, period: &str) -> Self {
        Self {
            url: link.url,
            kind: PageKind::Document,
            period: Some(period.to_string()),
        }
    }
}
