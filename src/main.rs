use anyhow::Result;
use clap::Parser;
use std::path::Path;

use namerank::patterns::DEFAULT_KEYWORD_FILE;
use namerank::providers::{
    FallbackDomainMetrics, FileDomainMetrics, FileSearchProvider, HeuristicDomainMetrics,
    MockSearchProvider, SearchProvider,
};
use namerank::utils::{setup_logging, truncate};
use namerank::{
    init_default_keywords, load_analysis, load_keyword_tables, run_analysis, AnalysisData,
    AnalysisEngine, AnalysisStore, Args, Config,
};

fn run(args: &Args) -> Result<AnalysisData> {
    let config = Config::from_args(args)?;
    let engine = AnalysisEngine::new(load_keyword_tables(config.keyword_file.as_deref())?);

    let search: Box<dyn SearchProvider> = match &config.results_file {
        Some(path) => Box::new(FileSearchProvider::new(path)),
        None => Box::new(MockSearchProvider),
    };

    let heuristic = match config.seed {
        Some(seed) => HeuristicDomainMetrics::seeded(seed),
        None => HeuristicDomainMetrics::default(),
    };
    let primary = config
        .metrics_file
        .as_deref()
        .map(FileDomainMetrics::load)
        .transpose()?;
    let mut metrics = FallbackDomainMetrics::new(primary, heuristic);

    let mut store = AnalysisStore::open(&config.db_path)?;
    run_analysis(&config.request, &engine, search.as_ref(), &mut metrics, &mut store)
}

fn print_analysis_results(data: &AnalysisData) {
    let summary = &data.analysis;

    println!("\n--- Competitive Analysis: {} ---", data.search_query);
    if let Some(location) = &data.location {
        println!("Location: {}", location);
    }
    println!("Analysis id: {}", data.analysis_id);
    println!("Competitors analyzed: {}", summary.total_competitors);
    println!("Strong competitors: {}", summary.strong_competitors);
    println!("Weak positions: {}", summary.opportunities);
    println!(
        "Average domain authority: {:.2}",
        summary.average_domain_authority
    );

    println!("\nCompetitors:");
    for c in &data.search_results {
        println!(
            "{:>3}. [{:<6}] {:<6} DA {:>3}  {:<28} {}{}",
            c.rank,
            c.competitive_strength,
            c.content_type,
            c.domain_authority,
            truncate(&c.domain, 28),
            truncate(&c.title, 48),
            if c.is_target_person { "  (you)" } else { "" }
        );
    }

    if !data.opportunities.is_empty() {
        println!("\nTop opportunities:");
        for o in &data.opportunities {
            println!("- rank {} (impact {}): {}", o.rank, o.impact_score, o.competitor_url);
            println!("    {}", o.reason);
            println!("    -> {}", o.action_suggestion);
        }
    }

    if !data.recommendations.is_empty() {
        println!("\nRecommendations:");
        for r in &data.recommendations {
            println!("- [{}] ({}) {}", r.priority_score, r.kind, r.description);
        }
    }
}

fn print_history(store: &AnalysisStore, limit: usize) -> Result<()> {
    let history = store.recent_analyses(limit)?;
    if history.is_empty() {
        println!("No analyses stored yet.");
        return Ok(());
    }
    for entry in history {
        println!(
            "{}  {:<10} {:<24} competitors {:>2}, weak positions {:>2}  {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.status,
            truncate(&entry.search_query, 24),
            entry.total_competitors,
            entry.opportunities,
            entry.id
        );
    }
    Ok(())
}

fn print_output(data: &AnalysisData, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        print_analysis_results(data);
    }
    Ok(())
}

fn dispatch(args: &Args) -> Result<()> {
    if args.init {
        init_default_keywords(Path::new(DEFAULT_KEYWORD_FILE))?;
        println!("Created {} with the built-in keyword tables", DEFAULT_KEYWORD_FILE);
        return Ok(());
    }

    if let Some(limit) = args.history {
        let store = AnalysisStore::open(&args.db)?;
        return print_history(&store, limit);
    }

    if let Some(analysis_id) = &args.show {
        let store = AnalysisStore::open(&args.db)?;
        let data = load_analysis(&store, analysis_id)?;
        return print_output(&data, args.json);
    }

    let data = run(args)?;
    print_output(&data, args.json)
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);

    if let Err(e) = dispatch(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
