use url::Url;

/// Path suffixes that never point at an HTML page worth fetching.
const DISALLOWED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".mp4", ".mp3", ".avi", ".mov", ".webm",
    ".zip", ".rar", ".tar", ".gz", ".7z", ".exe", ".dmg", ".iso", ".apk", ".deb", ".rpm",
];

/// Canonical form used for all identity comparisons: same URL minus query
/// string and fragment. Idempotent.
pub fn normalize(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// True iff both URLs share a host and port. URLs without a host
/// (mailto:, data:) never match anything.
pub fn same_domain(base: &Url, candidate: &Url) -> bool {
    match (base.host_str(), candidate.host_str()) {
        (Some(a), Some(b)) => {
            a == b && base.port_or_known_default() == candidate.port_or_known_default()
        }
        _ => false,
    }
}

pub fn has_disallowed_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    DISALLOWED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
