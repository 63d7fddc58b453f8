use crate::models::{AnalysisSummary, CompetitiveStrength, CompetitorScore};
use crate::scorer::LOW_AUTHORITY_THRESHOLD;

/// Arithmetic mean of domain authority, `0.0` for an empty list.
pub fn mean_domain_authority(competitors: &[CompetitorScore]) -> f64 {
    if competitors.is_empty() {
        return 0.0;
    }
    let total: u32 = competitors.iter().map(|c| u32::from(c.domain_authority)).sum();
    f64::from(total) / competitors.len() as f64
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregates a competitor list.
///
/// `opportunities` here counts competitors that are low strength or low
/// authority. It is a plain count over the whole list and is computed
/// independently of `identify_opportunities`, which ranks and caps its output.
pub fn summarize(competitors: &[CompetitorScore]) -> AnalysisSummary {
    let strong_competitors = competitors
        .iter()
        .filter(|c| c.competitive_strength == CompetitiveStrength::High)
        .count();
    let opportunities = competitors
        .iter()
        .filter(|c| {
            c.competitive_strength == CompetitiveStrength::Low
                || c.domain_authority < LOW_AUTHORITY_THRESHOLD
        })
        .count();

    AnalysisSummary {
        total_competitors: competitors.len(),
        strong_competitors,
        opportunities,
        average_domain_authority: round_to_hundredths(mean_domain_authority(competitors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;

    fn competitor(rank: u32, da: u8, strength: CompetitiveStrength) -> CompetitorScore {
        CompetitorScore {
            rank,
            url: String::new(),
            title: String::new(),
            domain: String::new(),
            domain_authority: da,
            content_type: ContentType::Other,
            competitive_strength: strength,
            is_target_person: false,
            last_updated: None,
        }
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(summarize(&[]), AnalysisSummary::default());
    }

    #[test]
    fn counts_and_rounds() {
        let competitors = vec![
            competitor(1, 90, CompetitiveStrength::High),
            competitor(2, 25, CompetitiveStrength::Low),
            competitor(3, 20, CompetitiveStrength::Medium),
        ];
        let summary = summarize(&competitors);
        assert_eq!(summary.total_competitors, 3);
        assert_eq!(summary.strong_competitors, 1);
        assert_eq!(summary.opportunities, 2);
        assert_eq!(summary.average_domain_authority, 45.0);
    }

    #[test]
    fn average_is_rounded_to_two_places() {
        let competitors = vec![
            competitor(1, 10, CompetitiveStrength::Low),
            competitor(2, 10, CompetitiveStrength::Low),
            competitor(3, 11, CompetitiveStrength::Low),
        ];
        assert_eq!(summarize(&competitors).average_domain_authority, 10.33);
    }

    #[test]
    fn average_stays_within_authority_range() {
        let competitors = vec![
            competitor(1, 100, CompetitiveStrength::High),
            competitor(2, 0, CompetitiveStrength::Low),
            competitor(3, 100, CompetitiveStrength::High),
        ];
        let summary = summarize(&competitors);
        assert!((0.0..=100.0).contains(&summary.average_domain_authority));
        assert_eq!(summary, summarize(&competitors));
    }
}
