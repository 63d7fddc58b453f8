use crate::classifier::{classify_content_type, is_target_person};
use crate::models::{CompetitiveStrength, ContentType, DomainMetrics, SearchResult};
use crate::patterns::KeywordTables;

pub const HIGH_AUTHORITY_THRESHOLD: u8 = 70;
pub const LOW_AUTHORITY_THRESHOLD: u8 = 30;

/// Everything the strength rules look at for a single result.
#[derive(Debug, Clone, Copy)]
pub struct StrengthSignals {
    pub domain_authority: u8,
    pub content_type: ContentType,
    pub is_target_person: bool,
    pub high_authority_host: bool,
}

pub struct StrengthRule {
    pub name: &'static str,
    pub applies: fn(&StrengthSignals) -> bool,
    pub strength: CompetitiveStrength,
}

/// Evaluated top to bottom; the first rule that applies decides.
/// The target-person rule must stay first.
pub const STRENGTH_RULES: &[StrengthRule] = &[
    StrengthRule {
        name: "target_person",
        applies: |s| s.is_target_person,
        strength: CompetitiveStrength::Low,
    },
    StrengthRule {
        name: "high_authority",
        applies: |s| s.domain_authority >= HIGH_AUTHORITY_THRESHOLD || s.high_authority_host,
        strength: CompetitiveStrength::High,
    },
    StrengthRule {
        name: "established_news_or_social",
        applies: |s| {
            s.domain_authority >= LOW_AUTHORITY_THRESHOLD
                && matches!(s.content_type, ContentType::News | ContentType::Social)
        },
        strength: CompetitiveStrength::Medium,
    },
    StrengthRule {
        name: "low_authority",
        applies: |s| s.domain_authority < LOW_AUTHORITY_THRESHOLD,
        strength: CompetitiveStrength::Low,
    },
];

const DEFAULT_STRENGTH: CompetitiveStrength = CompetitiveStrength::Medium;

pub fn strength_from_signals(signals: &StrengthSignals) -> CompetitiveStrength {
    STRENGTH_RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .map(|rule| rule.strength)
        .unwrap_or(DEFAULT_STRENGTH)
}

pub fn is_high_authority_url(url: &str, tables: &KeywordTables) -> bool {
    let url = url.to_lowercase();
    tables
        .high_authority_domains
        .iter()
        .any(|domain| url.contains(domain.as_str()))
}

pub fn calculate_competitive_strength(
    result: &SearchResult,
    metrics: &DomainMetrics,
    target_name: &str,
    tables: &KeywordTables,
) -> CompetitiveStrength {
    let signals = StrengthSignals {
        domain_authority: metrics.domain_authority,
        content_type: classify_content_type(result, tables),
        is_target_person: is_target_person(result, target_name, tables),
        high_authority_host: is_high_authority_url(&result.url, tables),
    };
    strength_from_signals(&signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(da: u8, content_type: ContentType) -> StrengthSignals {
        StrengthSignals {
            domain_authority: da,
            content_type,
            is_target_person: false,
            high_authority_host: false,
        }
    }

    fn result(url: &str, title: &str) -> SearchResult {
        SearchResult {
            rank: 1,
            url: url.to_string(),
            title: title.to_string(),
            snippet: None,
            display_url: None,
        }
    }

    fn metrics(da: u8) -> DomainMetrics {
        DomainMetrics {
            domain: String::new(),
            domain_authority: da,
            page_authority: None,
            spam_score: None,
            backlinks: None,
        }
    }

    #[test]
    fn target_person_is_always_low() {
        for da in [0, 29, 30, 69, 70, 100] {
            for ct in [ContentType::Person, ContentType::News, ContentType::Social, ContentType::Other] {
                let s = StrengthSignals {
                    is_target_person: true,
                    high_authority_host: true,
                    ..signals(da, ct)
                };
                assert_eq!(strength_from_signals(&s), CompetitiveStrength::Low);
            }
        }
    }

    #[test]
    fn thresholds_follow_rule_order() {
        assert_eq!(strength_from_signals(&signals(70, ContentType::Other)), CompetitiveStrength::High);
        assert_eq!(strength_from_signals(&signals(30, ContentType::News)), CompetitiveStrength::Medium);
        assert_eq!(strength_from_signals(&signals(45, ContentType::Social)), CompetitiveStrength::Medium);
        assert_eq!(strength_from_signals(&signals(29, ContentType::News)), CompetitiveStrength::Low);
        assert_eq!(strength_from_signals(&signals(50, ContentType::Person)), CompetitiveStrength::Medium);
        assert_eq!(strength_from_signals(&signals(69, ContentType::Other)), CompetitiveStrength::Medium);
    }

    #[test]
    fn allowlisted_host_is_high_even_with_low_authority() {
        let tables = KeywordTables::default();
        let r = result("https://ja.wikipedia.org/wiki/Taro", "田中太郎 - Wikipedia");
        assert_eq!(
            calculate_competitive_strength(&r, &metrics(10), "田中太郎", &tables),
            CompetitiveStrength::High
        );
    }

    #[test]
    fn news_site_with_high_authority_is_high() {
        let tables = KeywordTables::default();
        let r = result("https://www.asahi.com/articles/1", "受賞のお知らせ");
        assert_eq!(
            calculate_competitive_strength(&r, &metrics(80), "Taro", &tables),
            CompetitiveStrength::High
        );
    }

    #[test]
    fn own_blog_on_strong_domain_is_low() {
        let tables = KeywordTables::default();
        let r = result("https://note.com/taro", "Taro Tanaka's blog");
        assert_eq!(
            calculate_competitive_strength(&r, &metrics(95), "taro tanaka", &tables),
            CompetitiveStrength::Low
        );
    }

    #[test]
    fn scoring_is_repeatable() {
        let tables = KeywordTables::default();
        let r = result("https://example.com/a", "A page");
        let first = calculate_competitive_strength(&r, &metrics(50), "x", &tables);
        let second = calculate_competitive_strength(&r, &metrics(50), "x", &tables);
        assert_eq!(first, second);
    }
}
