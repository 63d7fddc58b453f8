use crate::models::{CompetitiveStrength, CompetitorScore, ContentType, Opportunity};
use crate::scorer::LOW_AUTHORITY_THRESHOLD;

pub const MAX_OPPORTUNITIES: usize = 5;

struct OpportunityRule {
    applies: fn(&CompetitorScore) -> bool,
    impact: fn(u32) -> u32,
    reason: &'static str,
    action_suggestion: &'static str,
}

const OPPORTUNITY_RULES: &[OpportunityRule] = &[
    OpportunityRule {
        applies: |c| c.competitive_strength == CompetitiveStrength::Low && c.rank <= 10,
        impact: |rank| 11 - rank,
        reason: "Weak competitor in a top position; this slot is realistic to take over",
        action_suggestion: "Publish content targeting the same keywords and apply on-page SEO",
    },
    OpportunityRule {
        applies: |c| c.domain_authority < LOW_AUTHORITY_THRESHOLD && c.rank <= 15,
        impact: |rank| 16u32.saturating_sub(rank).max(1),
        reason: "Low domain authority; comparatively easy to outrank",
        action_suggestion: "Aim higher with quality content and sound SEO fundamentals",
    },
    OpportunityRule {
        applies: |c| c.content_type == ContentType::Other && c.rank <= 12,
        impact: |rank| 13u32.saturating_sub(rank).max(1),
        reason: "Not a personal profile; expertise-focused content can stand out",
        action_suggestion: "Differentiate with content highlighting personal expertise and achievements",
    },
];

/// Finds the weakest competitor positions.
///
/// Each competitor is checked against every rule, so one competitor may yield
/// several opportunities. The pool is sorted by impact (stable, highest first)
/// and cut to [`MAX_OPPORTUNITIES`].
pub fn identify_opportunities(competitors: &[CompetitorScore]) -> Vec<Opportunity> {
    let mut opportunities: Vec<Opportunity> = competitors
        .iter()
        .flat_map(|competitor| {
            OPPORTUNITY_RULES
                .iter()
                .filter(move |rule| (rule.applies)(competitor))
                .map(move |rule| Opportunity {
                    rank: competitor.rank,
                    competitor_url: competitor.url.clone(),
                    reason: rule.reason.to_string(),
                    action_suggestion: rule.action_suggestion.to_string(),
                    impact_score: (rule.impact)(competitor.rank),
                })
        })
        .collect();

    opportunities.sort_by(|a, b| b.impact_score.cmp(&a.impact_score));
    opportunities.truncate(MAX_OPPORTUNITIES);
    opportunities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competitor(
        rank: u32,
        da: u8,
        content_type: ContentType,
        strength: CompetitiveStrength,
    ) -> CompetitorScore {
        CompetitorScore {
            rank,
            url: format!("https://site{}.example/", rank),
            title: format!("Result {}", rank),
            domain: format!("site{}.example", rank),
            domain_authority: da,
            content_type,
            competitive_strength: strength,
            is_target_person: false,
            last_updated: None,
        }
    }

    #[test]
    fn empty_input_has_no_opportunities() {
        assert!(identify_opportunities(&[]).is_empty());
    }

    #[test]
    fn one_competitor_can_fire_every_rule() {
        let c = competitor(2, 10, ContentType::Other, CompetitiveStrength::Low);
        let found = identify_opportunities(&[c]);
        let scores: Vec<u32> = found.iter().map(|o| o.impact_score).collect();
        assert_eq!(scores, vec![14, 11, 9]);
        assert!(found.iter().all(|o| o.rank == 2));
    }

    #[test]
    fn results_are_capped_and_sorted() {
        let competitors: Vec<CompetitorScore> = (1..=10)
            .map(|rank| competitor(rank, 20, ContentType::Other, CompetitiveStrength::Low))
            .collect();
        let found = identify_opportunities(&competitors);
        assert_eq!(found.len(), MAX_OPPORTUNITIES);
        assert!(found.windows(2).all(|w| w[0].impact_score >= w[1].impact_score));
        assert_eq!(found[0].impact_score, 15);
    }

    #[test]
    fn ties_keep_encounter_order() {
        // rank 2 "other" (13 - 2) ties with rank 5 low-DA (16 - 5)
        let competitors = vec![
            competitor(2, 50, ContentType::Other, CompetitiveStrength::Medium),
            competitor(5, 20, ContentType::Person, CompetitiveStrength::Medium),
        ];
        let found = identify_opportunities(&competitors);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].impact_score, 11);
        assert_eq!(found[0].rank, 2);
        assert_eq!(found[1].rank, 5);
    }

    #[test]
    fn distant_ranks_do_not_qualify() {
        let competitors = vec![
            competitor(16, 5, ContentType::Other, CompetitiveStrength::Low),
            competitor(13, 80, ContentType::Other, CompetitiveStrength::High),
        ];
        assert!(identify_opportunities(&competitors).is_empty());
    }

    #[test]
    fn low_da_impact_never_drops_below_one() {
        let c = competitor(15, 5, ContentType::Person, CompetitiveStrength::Medium);
        let found = identify_opportunities(&[c]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].impact_score, 1);
    }
}
