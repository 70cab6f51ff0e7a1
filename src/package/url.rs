//! Download URL normalization.

use reqwest::Url;

/// Join path or URL segments with single `/` separators.
///
/// Leading and trailing whitespace and slashes are stripped from every
/// segment and empty segments are dropped, so
/// `join_path(["http://host/root/", "/plugins/a.zip"])` gives
/// `http://host/root/plugins/a.zip`.
pub fn join_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .filter_map(|segment| {
            let trimmed = segment
                .as_ref()
                .trim_matches(|c: char| c == '/' || c.is_whitespace());
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve an artifact reference to an absolute download URL.
///
/// References that already carry a network location (`https://cdn/...`)
/// pass through untouched; anything else is joined onto `root_url`.
pub fn absolute_download_url(reference: &str, root_url: &str) -> String {
    match Url::parse(reference) {
        Ok(url) if url.has_host() => reference.to_string(),
        _ => join_path([root_url, reference]),
    }
}
