//! CLI entry point for the listing value rater.
//!
//! Loads a listings CSV, aggregates it per neighbourhood and reports the
//! dataset summary, rankings, borough drill-downs and market insights, or
//! exports them to CSV/JSON.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use listing_value_rater::analyzers::analyzer::Analysis;
use listing_value_rater::analyzers::insights::{explore_borough, market_insights};
use listing_value_rater::analyzers::score::value_score;
use listing_value_rater::analyzers::types::{NeighbourhoodAggregate, RankingReport, ViewKpis};
use listing_value_rater::analyzers::view::{
    BoroughFilter, SortField, SortOrder, borough_summaries, boroughs, filter_by_borough, kpis,
    sort_rows, top_n,
};
use listing_value_rater::cache::DatasetCache;
use listing_value_rater::config::ColumnMapping;
use listing_value_rater::output::{
    export_borough_summary, export_rankings, export_report, print_json, print_pretty,
};
use listing_value_rater::stats::{BoroughBreakdown, DatasetSummary};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "listing_value_rater")]
#[command(about = "Rank neighbourhoods by short-term rental value", long_about = None)]
struct Cli {
    /// Listings CSV (plain or .gz)
    #[arg(short, long, env = "LISTINGS_PATH", default_value = "AB_NYC_2019.csv")]
    data: PathBuf,

    /// JSON file mapping listing fields to column names
    #[arg(long, env = "LISTINGS_COLUMNS")]
    columns: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dataset overview and per-borough breakdown
    Summary {
        /// Also log the overview as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Score a hypothetical neighbourhood against the loaded dataset
    Score {
        /// Average days available per year
        #[arg(long, default_value_t = 180.0)]
        availability: f64,

        /// Reviews per listing
        #[arg(long, default_value_t = 50.0)]
        reviews: f64,

        /// Average nightly price
        #[arg(long, default_value_t = 150.0)]
        price: f64,
    },
    /// Rank neighbourhoods by a chosen metric
    Rank {
        /// Borough to show, or "all"
        #[arg(short, long, default_value = "all")]
        borough: BoroughFilter,

        /// Metric to sort by
        #[arg(short, long, value_enum, default_value_t = SortField::ValueScore)]
        sort: SortField,

        /// Sort ascending instead of descending
        #[arg(long, default_value_t = false)]
        ascending: bool,

        /// Number of rows to show (0 = all)
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,
    },
    /// Drill into a single borough
    Explore {
        /// Borough name (exact match)
        borough: String,
    },
    /// Best/worst value, price extremes and demand leaders
    Insights {
        /// Borough to analyze, or "all"
        #[arg(short, long, default_value = "all")]
        borough: BoroughFilter,
    },
    /// Export rankings and borough summary as CSV, optionally a JSON report
    Export {
        /// Borough to export, or "all"
        #[arg(short, long, default_value = "all")]
        borough: BoroughFilter,

        /// Rankings CSV path
        #[arg(short, long, default_value = "neighbourhood_rankings.csv")]
        output: PathBuf,

        /// Borough summary CSV path
        #[arg(long, default_value = "borough_summary.csv")]
        summary_output: PathBuf,

        /// Optional JSON report path
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/listing_value_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("listing_value_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mapping = match &cli.columns {
        Some(path) => ColumnMapping::load(path)?,
        None => ColumnMapping::default(),
    };
    let mut cache = DatasetCache::new();
    let analysis = cache.get_or_load(&cli.data, &mapping)?;

    match cli.command {
        Commands::Summary { json } => summary(&analysis, json)?,
        Commands::Score {
            availability,
            reviews,
            price,
        } => {
            let score = value_score(
                availability,
                reviews,
                analysis.max_reviews_per_listing,
                price,
            );
            info!(
                availability,
                reviews_per_listing = reviews,
                price,
                max_reviews_per_listing = analysis.max_reviews_per_listing,
                value_score = %format!("{score:.2}"),
                "Calculated value score"
            );

            let all = filter_by_borough(&analysis.neighbourhoods, &BoroughFilter::All);
            for row in top_n(&all, SortField::ValueScore, 5) {
                log_row("Example", row);
            }
        }
        Commands::Rank {
            borough,
            sort,
            ascending,
            top,
        } => {
            let mut view = filter_by_borough(&analysis.neighbourhoods, &borough);
            if view.is_empty() {
                warn!(borough = %borough, "No neighbourhoods match the filter");
                return Ok(());
            }
            log_kpis(&borough.to_string(), &kpis(&view));

            let order = if ascending {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            };
            sort_rows(&mut view, sort, order);
            if top > 0 {
                view.truncate(top);
            }

            for (rank, row) in view.iter().enumerate() {
                info!(
                    rank = rank + 1,
                    borough = %row.borough,
                    neighbourhood = %row.neighbourhood,
                    listings = row.listings,
                    avg_price = %format!("{:.2}", row.avg_price),
                    avg_availability = %format!("{:.0}", row.avg_availability),
                    reviews_per_listing = %format!("{:.1}", row.reviews_per_listing),
                    value_score = %format!("{:.2}", row.value_score),
                    percentile = %format!("{:.1}", row.value_percentile),
                    "Ranking"
                );
            }
        }
        Commands::Explore { borough } => {
            let profile = match explore_borough(&analysis.neighbourhoods, &borough) {
                Ok(profile) => profile,
                Err(e) => {
                    info!(
                        available = ?boroughs(&analysis.neighbourhoods),
                        "Known boroughs"
                    );
                    return Err(e.into());
                }
            };

            log_kpis(&profile.borough, &profile.kpis);
            for row in &profile.top_by_value {
                log_row("Top by value", row);
            }
            for row in &profile.top_by_listings {
                log_row("Top by listings", row);
            }
            log_row("Best value neighbourhood", &profile.best_value);
            log_row("Premium neighbourhood", &profile.most_expensive);
        }
        Commands::Insights { borough } => {
            let view = filter_by_borough(&analysis.neighbourhoods, &borough);
            let Some(insights) = market_insights(&view) else {
                warn!(borough = %borough, "No neighbourhoods match the filter");
                return Ok(());
            };

            log_row("Most undervalued", &insights.best_value);
            log_row("Least value", &insights.worst_value);
            log_row("Most expensive", &insights.most_expensive);
            log_row("Most affordable", &insights.most_affordable);
            for row in &insights.high_demand {
                log_row("High demand", row);
            }
            info!(
                borough = %borough,
                price_range = %format!("{:.2}", insights.price_range),
                mean_value_score = %format!("{:.2}", insights.mean_value_score),
                premium_value_areas = insights.premium_value_areas,
                price_variation_pct = %format!("{:.1}", insights.price_variation_pct),
                "Market performance"
            );
        }
        Commands::Export {
            borough,
            output,
            summary_output,
            json,
        } => {
            let mut view = filter_by_borough(&analysis.neighbourhoods, &borough);
            sort_rows(&mut view, SortField::ValueScore, SortOrder::Descending);

            export_rankings(&output, &view)?;
            export_borough_summary(&summary_output, &borough_summaries(&view))?;
            info!(
                rows = view.len(),
                rankings = %output.display(),
                summary = %summary_output.display(),
                "Exported CSV"
            );

            if let Some(json_path) = json {
                let report = RankingReport {
                    generated_at: Utc::now(),
                    borough: borough.to_string(),
                    max_reviews_per_listing: analysis.max_reviews_per_listing,
                    neighbourhoods: view.into_iter().cloned().collect(),
                };
                export_report(&json_path, &report)?;
                info!(path = %json_path.display(), "Exported JSON report");
            }
        }
    }

    Ok(())
}

/// Logs the dataset overview and per-borough breakdown.
fn summary(analysis: &Analysis, json: bool) -> Result<()> {
    let summary = DatasetSummary::from_listings(&analysis.listings);
    if json {
        print_json(&summary)?;
    } else {
        print_pretty(&summary);
    }

    info!(
        total_listings = summary.total_listings,
        neighbourhoods = summary.neighbourhoods,
        boroughs = summary.boroughs,
        mean_price = %format!("{:.0}", summary.mean_price),
        "Dataset overview"
    );
    info!(
        min = summary.price.min,
        q1 = summary.price.q1,
        median = summary.price.median,
        q3 = summary.price.q3,
        max = summary.price.max,
        stddev = %format!("{:.2}", summary.price_stddev),
        iqr = %format!("{:.2}", summary.price.iqr()),
        "Price statistics"
    );
    info!(
        mean_availability = %format!("{:.0}", summary.mean_availability),
        reviews_per_listing = %format!("{:.1}", summary.reviews_per_listing),
        most_common_room_type = summary.most_common_room_type.as_deref().unwrap_or("-"),
        total_reviews = summary.total_reviews,
        "Key metrics"
    );

    for b in BoroughBreakdown::from_listings(&analysis.listings) {
        info!(
            borough = %b.borough,
            listings = b.listings,
            avg_price = %format!("{:.2}", b.avg_price),
            min_price = b.min_price,
            max_price = b.max_price,
            avg_availability = %format!("{:.2}", b.avg_availability),
            total_reviews = b.total_reviews,
            "Borough"
        );
    }
    Ok(())
}

fn log_kpis(label: &str, k: &ViewKpis) {
    info!(
        view = label,
        neighbourhoods = k.neighbourhoods,
        listings = k.listings,
        mean_avg_price = %format!("{:.0}", k.mean_avg_price),
        mean_avg_availability = %format!("{:.0}", k.mean_avg_availability),
        mean_value_score = %format!("{:.2}", k.mean_value_score),
        "View summary"
    );
}

fn log_row(label: &str, row: &NeighbourhoodAggregate) {
    info!(
        borough = %row.borough,
        neighbourhood = %row.neighbourhood,
        avg_price = %format!("{:.2}", row.avg_price),
        avg_availability = %format!("{:.0}", row.avg_availability),
        reviews_per_listing = %format!("{:.1}", row.reviews_per_listing),
        listings = row.listings,
        value_score = %format!("{:.2}", row.value_score),
        "{label}"
    );
}
