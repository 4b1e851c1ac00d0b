use url::Url;

/// Placeholder written when a document lists no authors
pub const NOT_AVAILABLE: &str = "N/A";

/// One harvested document, as persisted in the metadata file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub title: String,
    pub period: String,
    /// Comma-joined author list, exactly as shown on the page
    pub authors: String,
    pub attachment_url: Url,
}

impl MetadataRecord {
    /// Builds a record once the attachment link is known
    ///
    /// Missing authors fall back to [`NOT_AVAILABLE`].
    pub fn new(title: String, period: &str, authors: Option<String>, attachment_url: Url) -> Self {
        Self {
            title,
            period: period.to_string(),
            authors: authors.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            attachment_url,
        }
    }
}
