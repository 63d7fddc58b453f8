use std::time::Instant;
use tracing::{debug, info};

use crate::classifier::{classify_content_type, is_target_person};
use crate::domain::{find_domain_metrics, resolve_hostname};
use crate::models::{
    AnalysisSummary, CompetitiveStrength, CompetitorScore, ContentType, DomainMetrics,
    Opportunity, Recommendation, SearchResult,
};
use crate::patterns::KeywordTables;
use crate::{opportunities, recommendations, scorer, stats};

/// The competitive analysis core.
///
/// Holds only the keyword tables; every operation is pure and synchronous.
#[derive(Debug, Clone, Default)]
pub struct AnalysisEngine {
    tables: KeywordTables,
}

impl AnalysisEngine {
    pub fn new(tables: KeywordTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &KeywordTables {
        &self.tables
    }

    pub fn classify_content_type(&self, result: &SearchResult) -> ContentType {
        classify_content_type(result, &self.tables)
    }

    pub fn is_target_person(&self, result: &SearchResult, target_name: &str) -> bool {
        is_target_person(result, target_name, &self.tables)
    }

    pub fn calculate_competitive_strength(
        &self,
        result: &SearchResult,
        metrics: &DomainMetrics,
        target_name: &str,
    ) -> CompetitiveStrength {
        scorer::calculate_competitive_strength(result, metrics, target_name, &self.tables)
    }

    pub fn identify_opportunities(&self, competitors: &[CompetitorScore]) -> Vec<Opportunity> {
        opportunities::identify_opportunities(competitors)
    }

    pub fn generate_recommendations(
        &self,
        competitors: &[CompetitorScore],
        opportunities: &[Opportunity],
    ) -> Vec<Recommendation> {
        recommendations::generate_recommendations(competitors, opportunities)
    }

    pub fn summarize(&self, competitors: &[CompetitorScore]) -> AnalysisSummary {
        stats::summarize(competitors)
    }

    /// Scores every search result against the known domain metrics.
    ///
    /// Produces exactly one `CompetitorScore` per result, in input order.
    pub fn analyze_competitive_strength(
        &self,
        search_results: &[SearchResult],
        domain_metrics: &[DomainMetrics],
        target_name: &str,
    ) -> Vec<CompetitorScore> {
        let start_time = Instant::now();

        let competitors: Vec<CompetitorScore> = search_results
            .iter()
            .map(|result| {
                let hostname = resolve_hostname(&result.url);
                let metrics = find_domain_metrics(&result.url, &hostname, domain_metrics);

                let score = CompetitorScore {
                    rank: result.rank,
                    url: result.url.clone(),
                    title: result.title.clone(),
                    domain_authority: metrics.domain_authority,
                    content_type: self.classify_content_type(result),
                    competitive_strength: self.calculate_competitive_strength(
                        result,
                        &metrics,
                        target_name,
                    ),
                    is_target_person: self.is_target_person(result, target_name),
                    domain: hostname,
                    last_updated: None,
                };
                debug!(
                    rank = score.rank,
                    domain = %score.domain,
                    domain_authority = score.domain_authority,
                    content_type = %score.content_type,
                    strength = %score.competitive_strength,
                    "Scored competitor"
                );
                score
            })
            .collect();

        info!(
            action = "complete",
            component = "competitor_scoring",
            competitor_count = competitors.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Competitor scoring completed"
        );
        competitors
    }
}
