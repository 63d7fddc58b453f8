pub mod args;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod engine;
pub mod models;
pub mod opportunities;
pub mod patterns;
pub mod pipeline;
pub mod providers;
pub mod recommendations;
pub mod scorer;
pub mod sqlite;
pub mod stats;
pub mod utils;

pub use args::Args;
pub use config::Config;
pub use engine::AnalysisEngine;
pub use models::{
    AnalysisData, AnalysisRequest, AnalysisStatus, AnalysisSummary, CompetitiveStrength,
    CompetitorScore, ContentType, DomainMetrics, Opportunity, Recommendation, RecommendationType,
    SearchResult,
};
pub use patterns::{init_default_keywords, load_keyword_tables, KeywordTables};
pub use pipeline::{load_analysis, run_analysis};
pub use sqlite::AnalysisStore;
