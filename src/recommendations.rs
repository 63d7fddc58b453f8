use crate::models::{
    CompetitiveStrength, CompetitorScore, ContentType, Opportunity, Recommendation,
    RecommendationType,
};
use crate::stats::mean_domain_authority;

pub const STRONG_COMPETITOR_LIMIT: usize = 5;
pub const SOCIAL_PRESENCE_MINIMUM: usize = 3;
pub const LOW_AVERAGE_AUTHORITY: f64 = 40.0;

type RecommendationRule = fn(&[CompetitorScore], &[Opportunity]) -> Option<Recommendation>;

fn recommendation(kind: RecommendationType, description: String, priority_score: u8) -> Recommendation {
    Recommendation {
        id: String::new(),
        analysis_id: String::new(),
        kind,
        description,
        priority_score,
    }
}

fn quick_wins(_: &[CompetitorScore], opportunities: &[Opportunity]) -> Option<Recommendation> {
    let top = opportunities.first()?;
    Some(recommendation(
        RecommendationType::Immediate,
        format!(
            "{} opportunities can be acted on right away. The competitor at rank {} is especially weak and worth targeting first.",
            opportunities.len(),
            top.rank
        ),
        9,
    ))
}

fn crowded_field(competitors: &[CompetitorScore], _: &[Opportunity]) -> Option<Recommendation> {
    let strong = competitors
        .iter()
        .filter(|c| c.competitive_strength == CompetitiveStrength::High)
        .count();
    (strong > STRONG_COMPETITOR_LIMIT).then(|| {
        recommendation(
            RecommendationType::LongTerm,
            "Many strong competitors hold these results. Plan a long-term content strategy and differentiate with compound keywords.".to_string(),
            7,
        )
    })
}

fn thin_social_presence(competitors: &[CompetitorScore], _: &[Opportunity]) -> Option<Recommendation> {
    let social = competitors
        .iter()
        .filter(|c| c.content_type == ContentType::Social)
        .count();
    (social < SOCIAL_PRESENCE_MINIMUM).then(|| {
        recommendation(
            RecommendationType::MediumTerm,
            "Social media exposure is low. Strengthening social profiles is a realistic path to higher rankings.".to_string(),
            6,
        )
    })
}

fn weak_authority(competitors: &[CompetitorScore], _: &[Opportunity]) -> Option<Recommendation> {
    (mean_domain_authority(competitors) < LOW_AVERAGE_AUTHORITY).then(|| {
        recommendation(
            RecommendationType::Immediate,
            "Domain authority is low across the results. High-quality content should be able to rank well.".to_string(),
            8,
        )
    })
}

/// Each rule contributes at most one recommendation.
const RECOMMENDATION_RULES: &[RecommendationRule] =
    &[quick_wins, crowded_field, thin_social_presence, weak_authority];

/// Derives action items from a scored competitor list.
///
/// The returned recommendations carry empty `id` and `analysis_id`; callers
/// assign both before persisting. Output is sorted by priority, highest first.
/// With no competitors there is nothing to recommend.
pub fn generate_recommendations(
    competitors: &[CompetitorScore],
    opportunities: &[Opportunity],
) -> Vec<Recommendation> {
    if competitors.is_empty() {
        return Vec::new();
    }

    let mut recommendations: Vec<Recommendation> = RECOMMENDATION_RULES
        .iter()
        .filter_map(|rule| rule(competitors, opportunities))
        .collect();

    recommendations.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competitor(rank: u32, da: u8, content_type: ContentType, strength: CompetitiveStrength) -> CompetitorScore {
        CompetitorScore {
            rank,
            url: format!("https://r{}.example/", rank),
            title: String::new(),
            domain: format!("r{}.example", rank),
            domain_authority: da,
            content_type,
            competitive_strength: strength,
            is_target_person: false,
            last_updated: None,
        }
    }

    fn opportunity(rank: u32) -> Opportunity {
        Opportunity {
            rank,
            competitor_url: String::new(),
            reason: String::new(),
            action_suggestion: String::new(),
            impact_score: 5,
        }
    }

    #[test]
    fn empty_input_recommends_nothing() {
        assert!(generate_recommendations(&[], &[]).is_empty());
    }

    #[test]
    fn six_strong_competitors_trigger_long_term() {
        let competitors: Vec<CompetitorScore> = (1..=6)
            .map(|rank| competitor(rank, 90, ContentType::Social, CompetitiveStrength::High))
            .collect();
        let recs = generate_recommendations(&competitors, &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationType::LongTerm);
        assert_eq!(recs[0].priority_score, 7);
    }

    #[test]
    fn five_strong_competitors_are_not_enough() {
        let competitors: Vec<CompetitorScore> = (1..=5)
            .map(|rank| competitor(rank, 90, ContentType::Social, CompetitiveStrength::High))
            .collect();
        assert!(generate_recommendations(&competitors, &[]).is_empty());
    }

    #[test]
    fn all_rules_fire_in_priority_order() {
        let mut competitors: Vec<CompetitorScore> = (1..=6)
            .map(|rank| competitor(rank, 10, ContentType::Other, CompetitiveStrength::High))
            .collect();
        competitors.push(competitor(7, 10, ContentType::Other, CompetitiveStrength::Low));
        let recs = generate_recommendations(&competitors, &[opportunity(7), opportunity(3)]);

        let priorities: Vec<u8> = recs.iter().map(|r| r.priority_score).collect();
        assert_eq!(priorities, vec![9, 8, 7, 6]);
        assert!(recs[0].description.contains("2 opportunities"));
        assert!(recs[0].description.contains("rank 7"));
        assert!(recs.iter().all(|r| r.id.is_empty() && r.analysis_id.is_empty()));
    }

    #[test]
    fn average_of_exactly_forty_is_not_low() {
        let competitors: Vec<CompetitorScore> = [30, 50, 40]
            .iter()
            .enumerate()
            .map(|(i, da)| competitor(i as u32 + 1, *da, ContentType::Social, CompetitiveStrength::Medium))
            .collect();
        assert!(generate_recommendations(&competitors, &[]).is_empty());
    }
}
