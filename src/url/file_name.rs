use url::Url;

/// Derives the on-disk file name for an attachment from its URL
///
/// The name is the URL's final path segment, taken verbatim (no extension
/// normalization). Returns `None` when the final segment is empty, as for
/// `https://example.com/files/`.
///
/// # Examples
///
/// ```
/// use paper_harvest::url::attachment_file_name;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/file/abc-Paper.pdf").unwrap();
/// assert_eq!(attachment_file_name(&url), Some("abc-Paper.pdf".to_string()));
/// ```
pub fn attachment_file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
