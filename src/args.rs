use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "namerank",
    about = "Analyze who competes with a person's name in search results and where to win rankings",
    version,
    long_about = None
)]
pub struct Args {
    /// Name of the person to analyze
    pub name: Option<String>,

    /// Location appended to the search query
    #[arg(short, long)]
    pub location: Option<String>,

    /// Number of search results to analyze (10-20)
    #[arg(short, long, default_value_t = 10)]
    pub count: usize,

    /// SQLite database that stores analyses
    #[arg(long, env = "NAMERANK_DB", default_value = "namerank.db")]
    pub db: PathBuf,

    /// Path to custom keyword table file
    #[arg(short, long)]
    pub keywords: Option<PathBuf>,

    /// JSON file of search results to analyze instead of the built-in mock results
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// JSON file of domain metrics; domains it lacks get heuristic estimates
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    /// Seed for heuristic domain authority estimates
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,

    /// List the most recent stored analyses instead of running one
    #[arg(long, value_name = "LIMIT")]
    pub history: Option<usize>,

    /// Print a stored analysis by id instead of running one
    #[arg(long, value_name = "ANALYSIS_ID", conflicts_with = "history")]
    pub show: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Initialize keywords.txt with the built-in keyword tables
    #[arg(long)]
    pub init: bool,
}
