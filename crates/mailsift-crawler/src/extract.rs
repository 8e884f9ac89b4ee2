use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use select::document::Document;
use select::predicate::Name;
use url::Url;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap();
}

/// All anchor targets on the page, resolved against the page URL. No
/// normalization or filtering happens here; the crawl state decides what is
/// worth visiting.
pub fn extract_links(page_url: &Url, html: &str) -> Vec<Url> {
    Document::from(html)
        .find(Name("a"))
        .filter_map(|node| node.attr("href"))
        .filter_map(|href| page_url.join(href).ok())
        .collect()
}

/// Email addresses matched on the raw page text, markup included. Matches
/// are case-preserved and deduplicated by exact string equality only.
pub fn extract_emails(html: &str) -> HashSet<String> {
    EMAIL_RE
        .find_iter(html)
        .map(|m| m.as_str().to_string())
        .collect()
}
