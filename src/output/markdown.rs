//! Markdown summary generation
//!
//! Renders `MetadataStatistics` as a human-readable markdown report.

use crate::output::stats::{MetadataStatistics, TOP_AUTHORS};
use crate::storage::{StorageError, StorageResult};
use std::path::Path;

/// Generates a markdown summary file from metadata statistics
///
/// # Arguments
///
/// * `stats` - The statistics to render
/// * `source` - The metadata file the statistics were computed from
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(StorageError)` - Failed to write summary
pub fn generate_markdown_summary(
    stats: &MetadataStatistics,
    source: &Path,
    output_path: &Path,
) -> StorageResult<()> {
    let markdown = format_markdown_summary(stats, source);

    std::fs::write(output_path, markdown).map_err(|source| StorageError::Write {
        path: output_path.to_path_buf(),
        source,
    })
}

// Pipes would split table cells
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Formats metadata statistics as markdown
pub fn format_markdown_summary(stats: &MetadataStatistics, source: &Path) -> String {
    let mut md = String::new();

    md.push_str("# Paper Harvest Summary\n\n");
    md.push_str(&format!("- **Source**: `{}`\n", source.display()));
    md.push_str(&format!(
        "- **Generated**: {}\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Papers**: {}\n", stats.total_rows));
    md.push_str(&format!("- **Unique Titles**: {}\n", stats.unique_titles));
    md.push_str(&format!(
        "- **Invalid Years**: {}\n\n",
        stats.invalid_years.len()
    ));

    md.push_str("## Missing Data\n\n");
    md.push_str("| Column | Missing |\n");
    md.push_str("|--------|---------|\n");
    for (column, count) in &stats.missing_values {
        md.push_str(&format!("| {} | {} |\n", column, count));
    }
    md.push('\n');

    if !stats.rows_per_year.is_empty() {
        md.push_str("## Papers per Year\n\n");
        md.push_str("| Year | Papers |\n");
        md.push_str("|------|--------|\n");
        for (year, count) in &stats.rows_per_year {
            md.push_str(&format!("| {} | {} |\n", year, count));
        }
        md.push('\n');
    }

    if !stats.top_authors.is_empty() {
        md.push_str(&format!("## Top {} Authors\n\n", TOP_AUTHORS));
        md.push_str("| Author | Papers |\n");
        md.push_str("|--------|--------|\n");
        for (author, count) in &stats.top_authors {
            md.push_str(&format!("| {} | {} |\n", cell(author), count));
        }
        md.push('\n');
    }

    if !stats.invalid_years.is_empty() {
        md.push_str("## Rows with Invalid Year\n\n");
        md.push_str("| Title | Year |\n");
        md.push_str("|-------|------|\n");
        for (title, year) in &stats.invalid_years {
            md.push_str(&format!("| {} | {} |\n", cell(title), cell(year)));
        }
        md.push('\n');
    }

    md
}
