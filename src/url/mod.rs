//! URL handling module for Paper-Harvest
//!
//! This module provides link resolution, period identifier extraction and
//! attachment file naming.

mod file_name;
mod period;
mod resolve;

// Re-export main functions
pub use file_name::attachment_file_name;
pub use period::extract_period_id;
pub use resolve::resolve_link;
