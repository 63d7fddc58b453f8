use anyhow::Result;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::args::Args;
use crate::models::AnalysisRequest;

pub const MIN_SEARCH_COUNT: usize = 10;
pub const MAX_SEARCH_COUNT: usize = 20;
pub const MAX_NAME_CHARS: usize = 100;

/// Latin letters, hiragana, katakana, CJK ideographs, the iteration mark,
/// whitespace and hyphens.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z\x{3040}-\x{309F}\x{30A0}-\x{30FF}\x{4E00}-\x{9FAF}\x{3005}\s\-]+$")
        .expect("name pattern is valid")
});

pub fn validate_name(name: &str) -> Result<()> {
    let chars = name.chars().count();
    if name.trim().is_empty() {
        anyhow::bail!("Name must not be empty");
    }
    if chars > MAX_NAME_CHARS {
        anyhow::bail!("Name must be at most {} characters, got {}", MAX_NAME_CHARS, chars);
    }
    if !NAME_PATTERN.is_match(name) {
        anyhow::bail!("Name may only contain letters, kana, kanji, spaces and hyphens: '{}'", name);
    }
    Ok(())
}

pub fn validate_search_count(count: usize) -> Result<()> {
    if !(MIN_SEARCH_COUNT..=MAX_SEARCH_COUNT).contains(&count) {
        anyhow::bail!(
            "--count must be between {} and {}, got {}",
            MIN_SEARCH_COUNT,
            MAX_SEARCH_COUNT,
            count
        );
    }
    Ok(())
}

/// Validated settings for one analysis run.
#[derive(Debug, Clone)]
pub struct Config {
    pub request: AnalysisRequest,
    pub db_path: PathBuf,
    pub keyword_file: Option<PathBuf>,
    pub results_file: Option<PathBuf>,
    pub metrics_file: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        let Some(name) = args.name.as_deref() else {
            anyhow::bail!("A name to analyze is required");
        };
        let name = name.trim();
        validate_name(name)?;
        validate_search_count(args.count)?;

        let location = args
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Ok(Self {
            request: AnalysisRequest {
                name: name.to_string(),
                location,
                search_count: args.count,
            },
            db_path: args.db.clone(),
            keyword_file: args.keywords.clone(),
            results_file: args.results.clone(),
            metrics_file: args.metrics.clone(),
            seed: args.seed,
        })
    }
}
