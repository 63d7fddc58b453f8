use anyhow::{Context, Result};
use chrono::Utc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::unique_hostnames;
use crate::engine::AnalysisEngine;
use crate::models::{AnalysisData, AnalysisRequest, AnalysisStatus, Recommendation};
use crate::providers::{
    batch_domain_metrics, DomainMetricsProvider, SearchProvider, DEFAULT_METRICS_BATCH_SIZE,
};
use crate::sqlite::AnalysisStore;

/// Gives each recommendation an id built from the analysis id, its type,
/// the current time and its position, and attaches the owning analysis.
pub fn assign_recommendation_ids(recommendations: &mut [Recommendation], analysis_id: &str) {
    let millis = Utc::now().timestamp_millis();
    for (index, rec) in recommendations.iter_mut().enumerate() {
        rec.analysis_id = analysis_id.to_string();
        rec.id = format!("{}-{}-{}-{}", analysis_id, rec.kind, millis, index);
    }
}

/// Runs search, metrics lookup and the engine for one request.
///
/// Pure with respect to storage; the returned record is `Completed`.
pub fn analyze(
    analysis_id: &str,
    request: &AnalysisRequest,
    engine: &AnalysisEngine,
    search: &dyn SearchProvider,
    metrics: &mut dyn DomainMetricsProvider,
) -> Result<AnalysisData> {
    let search_results = search
        .search(&request.name, request.location.as_deref(), request.search_count)
        .context("Search provider failed")?;
    info!(action = "search", component = "pipeline", result_count = search_results.len(), "Search results received");
    if search_results.is_empty() {
        warn!(action = "search", component = "pipeline", name = %request.name, "Search returned no results");
    }

    let domains = unique_hostnames(&search_results);
    let domain_metrics = batch_domain_metrics(metrics, &domains, DEFAULT_METRICS_BATCH_SIZE)
        .context("Domain metrics provider failed")?;

    let competitors =
        engine.analyze_competitive_strength(&search_results, &domain_metrics, &request.name);
    let opportunities = engine.identify_opportunities(&competitors);
    let mut recommendations = engine.generate_recommendations(&competitors, &opportunities);
    assign_recommendation_ids(&mut recommendations, analysis_id);
    let summary = engine.summarize(&competitors);

    let mut data = AnalysisData::placeholder(analysis_id, request, AnalysisStatus::Completed);
    data.search_results = competitors;
    data.analysis = summary;
    data.recommendations = recommendations;
    data.opportunities = opportunities;
    Ok(data)
}

/// Runs a full analysis and records it in `store`.
///
/// A `Processing` record is written first. If anything fails afterwards the
/// record is marked `Failed` and the error is returned.
pub fn run_analysis(
    request: &AnalysisRequest,
    engine: &AnalysisEngine,
    search: &dyn SearchProvider,
    metrics: &mut dyn DomainMetricsProvider,
    store: &mut AnalysisStore,
) -> Result<AnalysisData> {
    let total_start_time = Instant::now();
    let analysis_id = Uuid::new_v4().to_string();
    info!(action = "start", component = "pipeline", analysis_id = %analysis_id, name = %request.name, "Starting competitive analysis");

    let processing = AnalysisData::placeholder(&analysis_id, request, AnalysisStatus::Processing);
    store.save_analysis(&processing)?;

    let outcome = analyze(&analysis_id, request, engine, search, metrics).and_then(|mut data| {
        data.created_at = processing.created_at;
        store.save_analysis(&data)?;
        Ok(data)
    });

    match outcome {
        Ok(data) => {
            info!(
                action = "complete",
                component = "pipeline",
                analysis_id = %analysis_id,
                competitors = data.analysis.total_competitors,
                opportunities = data.opportunities.len(),
                recommendations = data.recommendations.len(),
                duration_ms = total_start_time.elapsed().as_millis(),
                "Analysis completed"
            );
            Ok(data)
        }
        Err(e) => {
            error!(action = "fail", component = "pipeline", analysis_id = %analysis_id, error = %e, "Analysis failed");
            if let Err(status_err) = store.update_status(&analysis_id, AnalysisStatus::Failed) {
                warn!(action = "update", component = "pipeline", error = %status_err, "Could not mark analysis as failed");
            }
            Err(e)
        }
    }
}

/// Loads a stored analysis, failing when the id is unknown.
pub fn load_analysis(store: &AnalysisStore, analysis_id: &str) -> Result<AnalysisData> {
    match store.get_analysis(analysis_id)? {
        Some(data) => {
            info!(action = "load", component = "pipeline", analysis_id, status = %data.status, "Loaded stored analysis");
            Ok(data)
        }
        None => anyhow::bail!("Analysis {} not found", analysis_id),
    }
}
