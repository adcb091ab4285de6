use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use reclaim_pipeline::source::RecordBatch;
use reclaim_pipeline::{ConsolidatedReport, Engine, EngineConfig, RawRecord, StaticSource};
use reclaim_scoring::{AlertTier, FeatureDictionary};

// ---------------------------------------------------------------------------
// Capture file format
// ---------------------------------------------------------------------------

/// One sweep as captured by a scraping collaborator: the raw records a
/// single search on a single marketplace returned.
#[derive(Deserialize)]
struct SweepJson {
    source: String,
    search_term: String,
    fetched_at: DateTime<Utc>,
    records: Vec<RawRecord>,
}

fn load_capture_file(path: &str) -> Result<Vec<SweepJson>, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path, e))
}

/// Group sweeps into one `StaticSource` per marketplace.
fn build_sources(
    sweeps: Vec<SweepJson>,
    source_filter: Option<&[String]>,
) -> Vec<Arc<StaticSource>> {
    let mut by_source: BTreeMap<String, Vec<RecordBatch>> = BTreeMap::new();
    for sweep in sweeps {
        if let Some(filter) = source_filter {
            if !filter.contains(&sweep.source) {
                continue;
            }
        }
        by_source.entry(sweep.source).or_default().push(RecordBatch {
            search_term: sweep.search_term,
            fetched_at: sweep.fetched_at,
            records: sweep.records,
        });
    }
    by_source
        .into_iter()
        .map(|(name, batches)| Arc::new(StaticSource::new(name, batches)))
        .collect()
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

fn tier_icon(tier: AlertTier) -> &'static str {
    match tier {
        AlertTier::Maximum | AlertTier::Critical => "!!",
        AlertTier::High => "! ",
        _ => "  ",
    }
}

fn format_price(candidate_price: Option<i64>, raw: &str) -> String {
    match candidate_price {
        Some(price) => format!("R$ {}", price),
        None if raw.is_empty() => "(no price)".into(),
        None => format!("({})", raw),
    }
}

fn print_human(report: &ConsolidatedReport, engine_ms: u128) {
    println!();
    println!("  RECLAIM \u{2014} Marketplace Sweep Report");
    println!("  {:=<64}", "");
    println!();
    println!(
        "  {} sources swept  \u{00b7}  {} candidates  \u{00b7}  {} alerts  \u{00b7}  {} records dropped",
        report.per_source_counts.len(),
        report.total_candidates(),
        report.total_alerts(),
        report.per_source_dropped.values().sum::<usize>(),
    );
    for (source, reason) in &report.source_errors {
        println!("  WARNING {}: {}", source, reason);
    }
    println!();

    if report.top_candidates.is_empty() {
        println!("  No candidates above the admission thresholds.");
    } else {
        println!("  {:\u{2500}<64}", "");
        for (i, c) in report.top_candidates.iter().enumerate() {
            println!(
                "  {} {}. [{}] {}  {}  score {} ({} / {})",
                tier_icon(c.alert_tier),
                i + 1,
                c.listing.source,
                c.listing.title,
                format_price(c.listing.price, &c.listing.raw_price_text),
                c.total_score,
                c.alert_tier,
                c.probability_band,
            );
            println!("       {}", c.listing.url);
            if !c.matched_tags.is_empty() {
                println!("       matched: {}", c.matched_tags.join(", "));
            }
            println!();
        }
        println!("  {:\u{2500}<64}", "");
    }

    println!();
    println!("  \u{23f1}  Engine ran in {}ms", engine_ms);
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: reclaim <captures.json>... [--sources s1,s2,...] [--top N] [--json]");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --sources  Comma-separated marketplace names to include");
        eprintln!("  --top      Size of the global ranking (default: 10)");
        eprintln!("  --json     Output the full report as JSON");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  reclaim sweeps/morning.json");
        eprintln!("  reclaim sweeps/*.json --sources olx,enjoei --top 5 --json");
        process::exit(1);
    }

    let mut capture_paths: Vec<String> = Vec::new();
    let mut source_filter: Option<Vec<String>> = None;
    let mut top_k: usize = reclaim_pipeline::config::DEFAULT_TOP_K;
    let mut json_output = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sources" => {
                if i + 1 < args.len() {
                    source_filter = Some(
                        args[i + 1]
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .collect(),
                    );
                    i += 2;
                } else {
                    eprintln!("Error: --sources requires a comma-separated list");
                    process::exit(1);
                }
            }
            "--top" => {
                if i + 1 < args.len() {
                    top_k = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("Error: --top requires a positive integer");
                        process::exit(1);
                    });
                    i += 2;
                } else {
                    eprintln!("Error: --top requires a number");
                    process::exit(1);
                }
            }
            "--json" => {
                json_output = true;
                i += 1;
            }
            flag if flag.starts_with("--") => {
                eprintln!("Unknown argument: {}", flag);
                process::exit(1);
            }
            path => {
                capture_paths.push(path.to_string());
                i += 1;
            }
        }
    }

    if capture_paths.is_empty() {
        eprintln!("Error: at least one capture file is required");
        process::exit(1);
    }

    let mut sweeps = Vec::new();
    for path in &capture_paths {
        match load_capture_file(path) {
            Ok(mut loaded) => sweeps.append(&mut loaded),
            Err(e) => {
                eprintln!("Error loading captures: {}", e);
                process::exit(1);
            }
        }
    }

    let sources = build_sources(sweeps, source_filter.as_deref());
    if sources.is_empty() {
        eprintln!("Error: no sweeps matched");
        if let Some(filter) = &source_filter {
            eprintln!("  Requested sources: {:?}", filter);
        }
        process::exit(1);
    }

    let config = reclaim_pipeline::config::presets::all().and_then(|presets| {
        EngineConfig::new(FeatureDictionary::zephyrus_m16(), presets, top_k)
    });
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let engine_start = Instant::now();
    let engine = Engine::new(config);
    let sources: Vec<Arc<dyn reclaim_pipeline::RecordSource>> = sources
        .into_iter()
        .map(|s| s as Arc<dyn reclaim_pipeline::RecordSource>)
        .collect();
    let report = engine.run(sources).await;
    let engine_ms = engine_start.elapsed().as_millis();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        print_human(&report, engine_ms);
    }
}
