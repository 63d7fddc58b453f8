use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

pub const DEFAULT_KEYWORD_FILE: &str = "keywords.txt";

/// Profile paths and tokens that mark a page as being about a person.
pub const PERSON_INDICATORS: &[&str] = &[
    "linkedin.com/in/",
    "facebook.com/",
    "twitter.com/",
    "instagram.com/",
    "profile",
    "プロフィール",
    "経歴",
    "about",
];

pub const SOCIAL_DOMAINS: &[&str] = &[
    "twitter.com",
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
    "tiktok.com",
];

pub const NEWS_DOMAINS: &[&str] = &[
    "asahi.com",
    "mainichi.jp",
    "yomiuri.co.jp",
    "sankei.com",
    "nikkei.com",
    "jiji.com",
    "kyodo.co.jp",
    "news.",
    "press",
];

pub const NEWS_KEYWORDS: &[&str] = &["ニュース", "news", "記事", "article", "報道", "press"];

/// Title tokens suggesting the page is owned by the person it names.
pub const PERSONAL_INDICATORS: &[&str] = &[
    "my",
    "portfolio",
    "blog",
    "ポートフォリオ",
    "ブログ",
    "公式",
    "official",
];

/// Encyclopedia, government and academic domains.
pub const HIGH_AUTHORITY_DOMAINS: &[&str] = &["wikipedia.org", "gov.jp", "edu", ".ac.jp"];

/// The indicator sets the classifier and scorer match against.
///
/// All tokens are stored lower-cased; matching is plain substring containment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTables {
    pub person_indicators: Vec<String>,
    pub social_domains: Vec<String>,
    pub news_domains: Vec<String>,
    pub news_keywords: Vec<String>,
    pub personal_indicators: Vec<String>,
    pub high_authority_domains: Vec<String>,
}

fn owned(table: &[&str]) -> Vec<String> {
    table.iter().map(|s| s.to_lowercase()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            person_indicators: owned(PERSON_INDICATORS),
            social_domains: owned(SOCIAL_DOMAINS),
            news_domains: owned(NEWS_DOMAINS),
            news_keywords: owned(NEWS_KEYWORDS),
            personal_indicators: owned(PERSONAL_INDICATORS),
            high_authority_domains: owned(HIGH_AUTHORITY_DOMAINS),
        }
    }
}

const SECTIONS: &[&str] = &[
    "person",
    "social",
    "news_domains",
    "news_keywords",
    "personal",
    "high_authority",
];

impl KeywordTables {
    fn section_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        match name {
            "person" => Some(&mut self.person_indicators),
            "social" => Some(&mut self.social_domains),
            "news_domains" => Some(&mut self.news_domains),
            "news_keywords" => Some(&mut self.news_keywords),
            "personal" => Some(&mut self.personal_indicators),
            "high_authority" => Some(&mut self.high_authority_domains),
            _ => None,
        }
    }

    fn section(&self, name: &str) -> &[String] {
        match name {
            "person" => &self.person_indicators,
            "social" => &self.social_domains,
            "news_domains" => &self.news_domains,
            "news_keywords" => &self.news_keywords,
            "personal" => &self.personal_indicators,
            _ => &self.high_authority_domains,
        }
    }

    /// Renders the tables in the sectioned keyword file format.
    pub fn to_file_contents(&self) -> String {
        let mut out = String::from("# namerank keyword tables\n# One token per line, grouped under [section] headers.\n");
        for name in SECTIONS {
            out.push_str(&format!("\n[{}]\n", name));
            for token in self.section(name) {
                out.push_str(token);
                out.push('\n');
            }
        }
        out
    }
}

/// Parses a sectioned keyword file on top of the built-in tables.
///
/// Every section present in `content` replaces the matching default table;
/// sections the file leaves out keep their defaults. In strict mode an unknown
/// section or a token outside any section is an error, otherwise it is skipped
/// with a warning.
pub fn parse_keyword_tables(content: &str, strict: bool) -> Result<KeywordTables> {
    let mut tables = KeywordTables::default();
    let mut replaced: Vec<&'static str> = Vec::new();
    let mut current: Option<&'static str> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim();
            match SECTIONS.iter().find(|s| **s == name) {
                Some(section) => current = Some(*section),
                None if strict => {
                    anyhow::bail!("Unknown keyword section '{}' at line {}", name, line_num + 1)
                }
                None => {
                    warn!(action = "parse", component = "keyword_section", line_number = line_num + 1, section = name, "Unknown keyword section");
                    current = None;
                }
            }
            continue;
        }

        let Some(section) = current else {
            if strict {
                anyhow::bail!("Keyword outside of any section at line {}", line_num + 1);
            }
            warn!(action = "parse", component = "keyword_token", line_number = line_num + 1, "Keyword outside of any section");
            continue;
        };

        if let Some(table) = tables.section_mut(section) {
            if !replaced.contains(&section) {
                table.clear();
                replaced.push(section);
            }
            table.push(line.to_lowercase());
        }
    }

    Ok(tables)
}

pub fn load_keyword_tables(keyword_file_path: Option<&Path>) -> Result<KeywordTables> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "keyword_loading",
        "Starting keyword table loading"
    );

    let tables = if let Some(path) = keyword_file_path {
        info!(action = "load", component = "keyword_file", file_path = ?path, "Loading keywords from specified file");
        if !path.exists() {
            anyhow::bail!("Keyword file not found: {:?}", path);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword file {:?}", path))?;
        parse_keyword_tables(&content, true)?
    } else {
        let default_file = Path::new(DEFAULT_KEYWORD_FILE);
        if default_file.exists() {
            info!(action = "load", component = "default_keyword_file", file_path = ?default_file, "Loading keywords from default file");
            let content = fs::read_to_string(default_file)?;
            parse_keyword_tables(&content, false)?
        } else {
            info!(
                action = "load",
                component = "builtin_keywords",
                "Using built-in keyword tables"
            );
            KeywordTables::default()
        }
    };

    info!(
        action = "complete",
        component = "keyword_loading",
        person_indicators = tables.person_indicators.len(),
        social_domains = tables.social_domains.len(),
        news_domains = tables.news_domains.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Keyword tables ready"
    );
    Ok(tables)
}

/// Writes the built-in tables to `path` so they can be edited.
pub fn init_default_keywords(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first if you want to reinitialize.",
            path.display()
        );
    }

    fs::write(path, KeywordTables::default().to_file_contents())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(action = "init", component = "keyword_file", file_path = ?path, "Wrote default keyword tables");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_defaults_parse_back_to_defaults() {
        let rendered = KeywordTables::default().to_file_contents();
        let parsed = parse_keyword_tables(&rendered, true).unwrap();
        assert_eq!(parsed, KeywordTables::default());
    }

    #[test]
    fn present_sections_replace_and_absent_sections_keep_defaults() {
        let content = "# custom\n[social]\nMastodon.social\nbsky.app\n";
        let tables = parse_keyword_tables(content, true).unwrap();
        assert_eq!(tables.social_domains, vec!["mastodon.social", "bsky.app"]);
        assert_eq!(tables.news_domains, owned(NEWS_DOMAINS));
    }

    #[test]
    fn strict_mode_rejects_unknown_sections() {
        assert!(parse_keyword_tables("[weather]\nsunny\n", true).is_err());
        assert!(parse_keyword_tables("orphan\n", true).is_err());
    }

    #[test]
    fn lenient_mode_skips_unknown_sections() {
        let tables = parse_keyword_tables("[weather]\nsunny\n[personal]\nhomepage\n", false).unwrap();
        assert_eq!(tables.personal_indicators, vec!["homepage"]);
        assert_eq!(tables.person_indicators, owned(PERSON_INDICATORS));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(load_keyword_tables(Some(&missing)).is_err());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_KEYWORD_FILE);
        init_default_keywords(&path).unwrap();
        assert!(init_default_keywords(&path).is_err());

        let loaded = load_keyword_tables(Some(&path)).unwrap();
        assert_eq!(loaded, KeywordTables::default());
    }
}
