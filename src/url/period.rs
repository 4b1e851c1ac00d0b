use url::Url;

/// Number of ASCII digits that make up a period identifier
const PERIOD_ID_LEN: usize = 4;

/// Extracts the period identifier from a URL path
///
/// The identifier is the first path segment consisting of exactly four ASCII
/// digits. Extraction fails closed: a URL without such a segment yields
/// `None` and must not be crawled.
///
/// # Examples
///
/// ```
/// use paper_harvest::url::extract_period_id;
/// use url::Url;
///
/// let url = Url::parse("https://papers.nips.cc/paper_files/paper/2021").unwrap();
/// assert_eq!(extract_period_id(&url), Some("2021".to_string()));
///
/// let url = Url::parse("https://papers.nips.cc/about").unwrap();
/// assert_eq!(extract_period_id(&url), None);
/// ```
pub fn extract_period_id(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|segment| is_period_segment(segment))
        .map(str::to_string)
}

fn is_period_segment(segment: &str) -> bool {
    segment.len() == PERIOD_ID_LEN && segment.bytes().all(|b| b.is_ascii_digit())
}
