use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use crate::models::{DomainMetrics, SearchResult};

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("scheme pattern is valid"));

/// Resolves the hostname of a result URL.
///
/// Never fails: a URL the parser rejects (or one without a host) degrades to
/// the text between the scheme and the first `/`.
pub fn resolve_hostname(raw_url: &str) -> String {
    if let Ok(url) = url::Url::parse(raw_url) {
        if let Some(host) = url.host_str() {
            return host.to_string();
        }
    }

    warn!(action = "parse", component = "hostname", url = raw_url, "Invalid URL format, deriving hostname from text");
    let stripped = SCHEME_PREFIX.replace(raw_url, "");
    stripped.split('/').next().unwrap_or_default().to_string()
}

/// Whether a hostname is worth asking a metrics provider about.
pub fn is_lookup_candidate(host: &str) -> bool {
    let Some((name, tld)) = host.rsplit_once('.') else {
        return false;
    };
    if name.is_empty() || tld.len() < 2 {
        return false;
    }
    match tld.strip_prefix("xn--") {
        Some(encoded) => {
            !encoded.is_empty() && encoded.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        None => tld.chars().all(|c| c.is_ascii_alphabetic()),
    }
}

/// Distinct lookup-worthy hostnames of `results`, in first-seen order.
pub fn unique_hostnames(results: &[SearchResult]) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    for result in results {
        let host = resolve_hostname(&result.url).to_lowercase();
        if is_lookup_candidate(&host) && !hosts.contains(&host) {
            hosts.push(host);
        }
    }
    hosts
}

/// Finds the metrics entry for a result.
///
/// The first entry whose domain occurs in the URL, or which itself contains the
/// hostname, wins. Empty domains and hostnames never match anything. Without a
/// match the default authority is substituted.
pub fn find_domain_metrics(url: &str, hostname: &str, metrics: &[DomainMetrics]) -> DomainMetrics {
    metrics
        .iter()
        .filter(|m| !m.domain.is_empty())
        .find(|m| {
            url.contains(m.domain.as_str()) || (!hostname.is_empty() && m.domain.contains(hostname))
        })
        .map(|m| DomainMetrics {
            domain_authority: m.domain_authority.min(100),
            ..m.clone()
        })
        .unwrap_or_else(|| DomainMetrics::fallback(hostname))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(domain: &str, da: u8) -> DomainMetrics {
        DomainMetrics {
            domain: domain.to_string(),
            domain_authority: da,
            page_authority: None,
            spam_score: None,
            backlinks: None,
        }
    }

    #[test]
    fn parses_hostname_from_valid_url() {
        assert_eq!(resolve_hostname("https://linkedin.com/in/taro-tanaka"), "linkedin.com");
        assert_eq!(resolve_hostname("http://www.asahi.com/articles/1"), "www.asahi.com");
    }

    #[test]
    fn malformed_url_falls_back_to_text() {
        assert_eq!(resolve_hostname("example.com/path/page"), "example.com");
        assert_eq!(resolve_hostname("https://exa mple.com/x"), "exa mple.com");
        assert_eq!(resolve_hostname(""), "");
    }

    #[test]
    fn punycode_tlds_are_lookup_candidates() {
        assert!(is_lookup_candidate("example.xn--p1ai"));
        assert!(is_lookup_candidate("xn--eckwd4c7c.xn--zckzah"));
        assert!(!is_lookup_candidate("example.xn--"));
        assert!(!is_lookup_candidate("example.c0m"));
    }

    #[test]
    fn lookup_candidates_need_an_alphabetic_tld() {
        assert!(is_lookup_candidate("qiita.com"));
        assert!(is_lookup_candidate("example-university.ac.jp"));
        assert!(!is_lookup_candidate("localhost"));
        assert!(!is_lookup_candidate("127.0.0.1"));
        assert!(!is_lookup_candidate("example."));
    }

    #[test]
    fn unique_hostnames_keeps_first_seen_order() {
        let results: Vec<SearchResult> = ["https://b.com/1", "https://a.com/", "https://b.com/2"]
            .iter()
            .enumerate()
            .map(|(i, url)| SearchResult {
                rank: i as u32 + 1,
                url: url.to_string(),
                title: String::new(),
                snippet: None,
                display_url: None,
            })
            .collect();
        assert_eq!(unique_hostnames(&results), vec!["b.com", "a.com"]);
    }

    #[test]
    fn metrics_match_in_either_direction() {
        let table = vec![metrics("asahi.com", 80), metrics("www.note.com", 60)];
        let by_url = find_domain_metrics("https://www.asahi.com/a", "www.asahi.com", &table);
        assert_eq!(by_url.domain_authority, 80);

        let by_host = find_domain_metrics("https://note.com/taro", "note.com", &table);
        assert_eq!(by_host.domain_authority, 60);
    }

    #[test]
    fn earliest_matching_entry_wins() {
        let table = vec![metrics("e.com", 10), metrics("note.com", 90)];
        let found = find_domain_metrics("https://note.com/x", "note.com", &table);
        assert_eq!(found.domain, "e.com");
        assert_eq!(found.domain_authority, 10);
    }

    #[test]
    fn unmatched_result_gets_default_authority() {
        let found = find_domain_metrics("https://linkedin.com/in/x", "linkedin.com", &[]);
        assert_eq!(found.domain, "linkedin.com");
        assert_eq!(found.domain_authority, DomainMetrics::DEFAULT_AUTHORITY);
    }

    #[test]
    fn out_of_range_authority_is_clamped() {
        let found = find_domain_metrics("https://x.com/", "x.com", &[metrics("x.com", 250)]);
        assert_eq!(found.domain_authority, 100);
    }
}
