use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::models::{DomainMetrics, SearchResult};

pub const DEFAULT_METRICS_BATCH_SIZE: usize = 10;

/// Source of ranked search results for a person's name.
pub trait SearchProvider {
    fn search(&self, name: &str, location: Option<&str>, count: usize) -> Result<Vec<SearchResult>>;
}

/// Source of authority scores for a batch of hostnames.
pub trait DomainMetricsProvider {
    fn domain_metrics(&mut self, domains: &[String]) -> Result<Vec<DomainMetrics>>;

    /// Delay between consecutive batches in [`batch_domain_metrics`].
    fn batch_pause(&self) -> Duration {
        Duration::ZERO
    }
}

/// The query string sent to a search backend: the quoted name, then the location.
pub fn build_query(name: &str, location: Option<&str>) -> String {
    match location.map(str::trim).filter(|l| !l.is_empty()) {
        Some(location) => format!("\"{}\" {}", name, location),
        None => format!("\"{}\"", name),
    }
}

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

fn slug(name: &str, separator: &str) -> String {
    WHITESPACE.replace_all(&name.trim().to_lowercase(), separator).into_owned()
}

/// Deterministic offline results, used when no real search backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSearchProvider;

impl MockSearchProvider {
    pub const MAX_RESULTS: usize = 10;
}

impl SearchProvider for MockSearchProvider {
    fn search(&self, name: &str, location: Option<&str>, count: usize) -> Result<Vec<SearchResult>> {
        info!(action = "search", component = "mock_search", query = %build_query(name, location), count, "Generating mock search results");

        let hyphen = slug(name, "-");
        let underscore = slug(name, "_");
        let dotted = slug(name, ".");
        let joined = slug(name, "");

        let entries = [
            (
                format!("https://linkedin.com/in/{}", hyphen),
                format!("{} - LinkedIn プロフィール", name),
                format!("{}のプロフィールをLinkedInで表示。経歴、学歴、つながりを確認できます。", name),
                "linkedin.com",
            ),
            (
                format!("https://twitter.com/{}", underscore),
                format!("{} (@{}) / X", name, underscore),
                format!("{}の最新ツイートをチェック。", name),
                "twitter.com",
            ),
            (
                format!("https://example-company.com/team/{}", hyphen),
                format!("{} - チームメンバー | Example Company", name),
                format!("Example Companyのチームメンバー{}についてご紹介します。", name),
                "example-company.com",
            ),
            (
                format!("https://facebook.com/{}", dotted),
                format!("{} | Facebook", name),
                format!("{}さんのFacebookプロフィール。", name),
                "facebook.com",
            ),
            (
                format!("https://qiita.com/{}", underscore),
                format!("{} - Qiita", name),
                format!("{}が投稿した記事一覧です。プログラミングに関する知見を共有しています。", name),
                "qiita.com",
            ),
            (
                format!("https://note.com/{}", underscore),
                format!("{}｜note", name),
                format!("{}です。日々の気づきや学びを記録しています。", name),
                "note.com",
            ),
            (
                format!("https://github.com/{}", hyphen),
                format!("{} - GitHub", name),
                format!("{}のGitHubプロフィール。オープンソースプロジェクトへの貢献が確認できます。", name),
                "github.com",
            ),
            (
                format!("https://example-blog.com/author/{}", hyphen),
                format!("{}の記事一覧 | Tech Blog", name),
                format!("{}が執筆した技術記事の一覧ページです。", name),
                "example-blog.com",
            ),
            (
                format!("https://youtube.com/@{}", joined),
                format!("{} - YouTube", name),
                format!("{}のYouTubeチャンネル。技術解説動画を配信中。", name),
                "youtube.com",
            ),
            (
                format!("https://example-university.ac.jp/staff/{}", hyphen),
                format!("{} | Example University", name),
                format!("Example University所属の{}の研究者プロフィール。", name),
                "example-university.ac.jp",
            ),
        ];

        Ok(entries
            .into_iter()
            .take(count.min(Self::MAX_RESULTS))
            .enumerate()
            .map(|(index, (url, title, snippet, display_url))| SearchResult {
                rank: index as u32 + 1,
                url,
                title,
                snippet: Some(snippet),
                display_url: Some(display_url.to_string()),
            })
            .collect())
    }
}

/// Search results exported to a JSON file (an array of `SearchResult`).
#[derive(Debug, Clone)]
pub struct FileSearchProvider {
    path: PathBuf,
}

impl FileSearchProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SearchProvider for FileSearchProvider {
    fn search(&self, name: &str, _location: Option<&str>, count: usize) -> Result<Vec<SearchResult>> {
        info!(action = "load", component = "file_search", file_path = ?self.path, name, "Loading search results from file");
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read search results from {:?}", self.path))?;
        let mut results: Vec<SearchResult> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid search result JSON in {:?}", self.path))?;

        results.sort_by_key(|r| r.rank);
        results.dedup_by_key(|r| r.rank);
        if let Some(bad) = results.iter().find(|r| r.rank == 0) {
            anyhow::bail!("Search result {} has rank 0; ranks start at 1", bad.url);
        }
        results.truncate(count);
        Ok(results)
    }
}

const KNOWN_HIGH_AUTHORITY: &[&str] = &[
    "wikipedia.org",
    "facebook.com",
    "twitter.com",
    "linkedin.com",
    "instagram.com",
    "youtube.com",
    "github.com",
    "qiita.com",
    "zenn.dev",
    "note.com",
];

const KNOWN_NEWS_AUTHORITY: &[&str] = &[
    "asahi.com",
    "mainichi.jp",
    "yomiuri.co.jp",
    "sankei.com",
    "nikkei.com",
    "jiji.com",
    "kyodo.co.jp",
];

const KNOWN_MEDIUM_AUTHORITY: &[&str] = &[
    "wordpress.com",
    "medium.com",
    "hatena",
    "ameblo.jp",
    "yahoo.co.jp",
    "google.com",
];

/// Guesses domain authority from well-known domain lists.
///
/// Values are drawn at random inside a band picked by the domain, so repeated
/// calls differ. Seed it for reproducible output.
#[derive(Debug)]
pub struct HeuristicDomainMetrics {
    rng: StdRng,
}

impl Default for HeuristicDomainMetrics {
    fn default() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl HeuristicDomainMetrics {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The half-open authority range a domain is drawn from.
    pub fn authority_band(domain: &str) -> (u8, u8) {
        let domain = domain.to_lowercase();
        let known = |list: &[&str]| list.iter().any(|d| domain.contains(d));

        if known(KNOWN_HIGH_AUTHORITY) {
            (85, 100)
        } else if known(KNOWN_NEWS_AUTHORITY) {
            (75, 95)
        } else if known(KNOWN_MEDIUM_AUTHORITY) {
            (50, 75)
        } else if domain.contains(".edu") || domain.contains(".gov") {
            (70, 90)
        } else if domain.contains(".com") || domain.contains(".jp") {
            (20, 60)
        } else {
            (10, 40)
        }
    }

    fn estimate(&mut self, domain: &str) -> DomainMetrics {
        let (low, high) = Self::authority_band(domain);
        let domain_authority = self.rng.random_range(low..high);
        DomainMetrics {
            domain: domain.to_string(),
            domain_authority,
            page_authority: Some(domain_authority.saturating_sub(5)),
            spam_score: Some(0),
            backlinks: None,
        }
    }
}

impl DomainMetricsProvider for HeuristicDomainMetrics {
    fn domain_metrics(&mut self, domains: &[String]) -> Result<Vec<DomainMetrics>> {
        Ok(domains.iter().map(|d| self.estimate(d)).collect())
    }
}

/// Authority scores exported to a JSON file (an array of `DomainMetrics`).
///
/// Domains missing from the file are left out of the response; wrap it in
/// [`FallbackDomainMetrics`] to estimate them.
#[derive(Debug, Clone)]
pub struct FileDomainMetrics {
    entries: Vec<DomainMetrics>,
}

impl FileDomainMetrics {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read domain metrics from {:?}", path))?;
        let entries: Vec<DomainMetrics> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid domain metrics JSON in {:?}", path))?;
        if let Some(bad) = entries.iter().find(|m| m.domain_authority > 100) {
            anyhow::bail!(
                "Domain authority {} for {} is outside 0-100",
                bad.domain_authority,
                bad.domain
            );
        }
        info!(action = "loaded", component = "file_metrics", entry_count = entries.len(), file_path = ?path, "Loaded domain metrics");
        Ok(Self { entries })
    }
}

impl DomainMetricsProvider for FileDomainMetrics {
    fn domain_metrics(&mut self, domains: &[String]) -> Result<Vec<DomainMetrics>> {
        Ok(domains
            .iter()
            .filter_map(|d| self.entries.iter().find(|m| m.domain.eq_ignore_ascii_case(d)))
            .cloned()
            .collect())
    }
}

/// Uses `primary` and falls back to the heuristic for every domain it fails
/// on or leaves out.
pub struct FallbackDomainMetrics<P> {
    primary: Option<P>,
    fallback: HeuristicDomainMetrics,
}

impl<P: DomainMetricsProvider> FallbackDomainMetrics<P> {
    pub fn new(primary: Option<P>, fallback: HeuristicDomainMetrics) -> Self {
        Self { primary, fallback }
    }
}

impl<P: DomainMetricsProvider> DomainMetricsProvider for FallbackDomainMetrics<P> {
    fn domain_metrics(&mut self, domains: &[String]) -> Result<Vec<DomainMetrics>> {
        let mut metrics = match self.primary.as_mut().map(|p| p.domain_metrics(domains)) {
            Some(Ok(metrics)) => metrics,
            Some(Err(e)) => {
                warn!(action = "fallback", component = "domain_metrics", error = %e, "Domain metrics provider failed, using heuristic estimates");
                Vec::new()
            }
            None => Vec::new(),
        };

        let missing: Vec<String> = domains
            .iter()
            .filter(|d| !metrics.iter().any(|m| m.domain.eq_ignore_ascii_case(d)))
            .cloned()
            .collect();
        if !missing.is_empty() {
            if self.primary.is_some() {
                debug!(action = "fallback", component = "domain_metrics", missing_count = missing.len(), "Estimating domains the provider did not cover");
            }
            metrics.extend(self.fallback.domain_metrics(&missing)?);
        }
        Ok(metrics)
    }

    fn batch_pause(&self) -> Duration {
        self.primary
            .as_ref()
            .map(|p| p.batch_pause())
            .unwrap_or_default()
    }
}

/// Requests metrics in chunks of `batch_size`, pausing between chunks as the
/// provider asks.
pub fn batch_domain_metrics<P: DomainMetricsProvider + ?Sized>(
    provider: &mut P,
    domains: &[String],
    batch_size: usize,
) -> Result<Vec<DomainMetrics>> {
    let start_time = Instant::now();
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(domains.len());

    for (index, batch) in domains.chunks(batch_size).enumerate() {
        if index > 0 {
            let pause = provider.batch_pause();
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        }
        results.extend(provider.domain_metrics(batch)?);
    }

    info!(
        action = "complete",
        component = "domain_metrics",
        domain_count = domains.len(),
        metrics_count = results.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Domain metrics collected"
    );
    Ok(results)
}
