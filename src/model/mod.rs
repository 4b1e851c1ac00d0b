//! Data model for a harvest
//!
//! - `CrawlTarget`: one page queued for fetching, tagged with its role
//! - `PeriodLink` / `DocumentLink`: links produced by the extractors
//! - `MetadataRecord`: one row of the metadata file

mod links;
mod record;

pub use links::{CrawlTarget, DocumentLink, PageKind, PeriodLink};
pub use record::{MetadataRecord, NOT_AVAILABLE};
