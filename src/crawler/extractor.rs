//! Page extractors
//!
//! One `PageExtractor` implementation per page kind:
//! - `RootExtractor`: root index → period links
//! - `PeriodExtractor`: period index → document links
//! - `DocumentExtractor`: document page → title, authors, attachment link
//!
//! Selectors are compiled once at construction. Extraction is pure: the same
//! markup and page URL always produce the same output.
//!
//! # Marker matching
//!
//! "Text contains marker" means: the element's descendant text with runs of
//! whitespace collapsed to one space and the ends trimmed contains the marker
//! as a case-sensitive substring. The first matching element in document
//! order wins.

use crate::config::SourceConfig;
use crate::model::{DocumentLink, PeriodLink};
use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while extracting data from a page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Missing {element} on {url}")]
    MissingElement { element: &'static str, url: String },
}

/// Capability to turn one page's markup into a typed result
pub trait PageExtractor: Send + Sync {
    type Output;

    /// Extracts data from `html`, resolving relative links against `page_url`
    fn extract(&self, html: &str, page_url: &Url) -> Result<Self::Output, ExtractError>;
}

/// Data found on a document page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPage {
    pub title: String,
    pub authors: Option<String>,
    pub attachment_url: Option<Url>,
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Collapses whitespace runs to single spaces and trims the ends
fn normalized_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Extracts period links from the root index page
pub struct RootExtractor {
    link_selector: Selector,
}

impl RootExtractor {
    pub fn new(config: &SourceConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            link_selector: compile(&config.period_link_selector)?,
        })
    }
}

impl PageExtractor for RootExtractor {
    type Output = Vec<PeriodLink>;

    /// Links without a 4-digit period segment are dropped
    fn extract(&self, html: &str, page_url: &Url) -> Result<Vec<PeriodLink>, ExtractError> {
        let document = Html::parse_document(html);

        let links = document
            .select(&self.link_selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, page_url))
            .filter_map(|url| {
                let link = PeriodLink::from_url(url.clone());
                if link.is_none() {
                    tracing::debug!(url = %url, "Dropping link without period identifier");
                }
                link
            })
            .collect();

        Ok(links)
    }
}

/// Extracts document links from a period index page
pub struct PeriodExtractor {
    anchor_selector: Selector,
    document_pattern: String,
}

impl PeriodExtractor {
    pub fn new(config: &SourceConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            anchor_selector: compile("a[href]")?,
            document_pattern: config.document_link_pattern.clone(),
        })
    }
}

impl PageExtractor for PeriodExtractor {
    type Output = Vec<DocumentLink>;

    /// Anchors whose href contains the document pattern, in page order
    fn extract(&self, html: &str, page_url: &Url) -> Result<Vec<DocumentLink>, ExtractError> {
        let document = Html::parse_document(html);

        let links = document
            .select(&self.anchor_selector)
            .filter_map(|element| element.value().attr("href"))
            .filter(|href| href.contains(&self.document_pattern))
            .filter_map(|href| resolve_link(href, page_url))
            .map(|url| DocumentLink { url })
            .collect();

        Ok(links)
    }
}

/// Extracts title, authors and attachment link from a document page
pub struct DocumentExtractor {
    heading_selector: Selector,
    anchor_selector: Selector,
    authors_marker: String,
    attachment_marker: String,
}

impl DocumentExtractor {
    pub fn new(config: &SourceConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            heading_selector: compile(&config.title_selector)?,
            anchor_selector: compile("a[href]")?,
            authors_marker: config.authors_marker.clone(),
            attachment_marker: config.attachment_marker.clone(),
        })
    }

    fn title(&self, document: &Html) -> Option<String> {
        document
            .select(&self.heading_selector)
            .next()
            .map(normalized_text)
            .filter(|title| !title.is_empty())
    }

    /// Text of the element right after the first heading mentioning the marker
    fn authors(&self, document: &Html) -> Option<String> {
        let heading = document
            .select(&self.heading_selector)
            .find(|element| normalized_text(*element).contains(&self.authors_marker))?;

        heading
            .next_siblings()
            .find_map(ElementRef::wrap)
            .map(normalized_text)
            .filter(|authors| !authors.is_empty())
    }

    fn attachment_url(&self, document: &Html, page_url: &Url) -> Option<Url> {
        document
            .select(&self.anchor_selector)
            .find(|element| normalized_text(*element).contains(&self.attachment_marker))
            .and_then(|element| element.value().attr("href"))
            .and_then(|href| resolve_link(href, page_url))
    }
}

impl PageExtractor for DocumentExtractor {
    type Output = DocumentPage;

    /// A missing title is an error; missing authors or attachment are `None`
    fn extract(&self, html: &str, page_url: &Url) -> Result<DocumentPage, ExtractError> {
        let document = Html::parse_document(html);

        let title = self
            .title(&document)
            .ok_or_else(|| ExtractError::MissingElement {
                element: "title",
                url: page_url.to_string(),
            })?;

        Ok(DocumentPage {
            title,
            authors: self.authors(&document),
            attachment_url: self.attachment_url(&document, page_url),
        })
    }
}
