use crate::models::{ContentType, SearchResult};
use crate::patterns::KeywordTables;

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}

/// Labels a result's content type. Rules are checked in order, first match wins.
pub fn classify_content_type(result: &SearchResult, tables: &KeywordTables) -> ContentType {
    let url = result.url.to_lowercase();
    let title = result.title.to_lowercase();
    let snippet = result.snippet.as_deref().unwrap_or_default().to_lowercase();

    let person = [&url, &title, &snippet]
        .iter()
        .any(|field| contains_any(field, &tables.person_indicators));
    if person {
        return ContentType::Person;
    }

    if contains_any(&url, &tables.social_domains) {
        return ContentType::Social;
    }

    if contains_any(&url, &tables.news_domains) || contains_any(&title, &tables.news_keywords) {
        return ContentType::News;
    }

    ContentType::Other
}

/// Whether a result looks like the target person's own page.
///
/// Requires both an ownership token in the title and the name itself in the
/// title or snippet, so a missed self-match is more likely than a false one.
pub fn is_target_person(result: &SearchResult, target_name: &str, tables: &KeywordTables) -> bool {
    let title = result.title.to_lowercase();
    if !contains_any(&title, &tables.personal_indicators) {
        return false;
    }

    let name = target_name.to_lowercase();
    let snippet = result.snippet.as_deref().unwrap_or_default().to_lowercase();
    title.contains(&name) || snippet.contains(&name)
}
