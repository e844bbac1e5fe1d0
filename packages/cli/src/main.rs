#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal inspector for incident datasets.
//!
//! Loads a GeoJSON document from a file or URL, optionally applies a
//! shareable query string to reproduce a bookmarked view, and prints the
//! derived views (KPIs, top categories, time series, hour histogram) as
//! plain text.

use clap::Parser;
use incident_map_dataset::FieldConfig;
use incident_map_session::Session;

#[derive(Parser, Debug)]
#[command(name = "incident-map-cli", about = "Inspect an incident dataset from the terminal")]
struct Args {
    /// Path or http(s) URL of the GeoJSON feature collection.
    #[arg(long)]
    input: String,

    /// Shareable query string to reproduce a view (e.g. "step=week&categories=Theft").
    #[arg(long)]
    query: Option<String>,

    /// Number of top categories to print.
    #[arg(long, default_value_t = incident_map_analytics::DEFAULT_TOP_LIMIT)]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let args = Args::parse();

    let fields = FieldConfig::default();
    let dataset = if args.input.starts_with("http://") || args.input.starts_with("https://") {
        incident_map_dataset::load_dataset(&args.input, &fields).await?
    } else {
        incident_map_dataset::read_dataset(args.input.as_ref(), &fields)?
    };

    let mut session = Session::new(dataset, args.query.as_deref());
    if let Some(query) = session.sync_query() {
        log::info!("canonical query: \"{query}\"");
    }

    print_summary(&session, args.limit);
    Ok(())
}

fn print_summary(session: &Session, limit: usize) {
    let dataset = session.dataset();
    let state = session.store().state();
    let views = session.derive();

    println!(
        "Dataset: {} features, {} categories, {} sheets",
        dataset.features().len(),
        dataset.categories().len(),
        dataset.sheets().len(),
    );
    println!(
        "Global extent: {} .. {}",
        dataset.extent().start, dataset.extent().end
    );
    println!(
        "Window: {} .. {} ({} step)",
        state.time_extent.start, state.time_extent.end, state.time_step
    );
    println!();

    println!("Incidents: {}", views.kpi.total);
    match views.kpi.total_delta {
        Some(delta) => println!(
            "  vs previous period: {:+} ({:+.1}%)",
            delta.diff, delta.pct
        ),
        None => println!("  vs previous period: n/a"),
    }
    println!("Categories in window: {}", views.kpi.category_count);
    println!();

    println!("Top categories:");
    for entry in incident_map_analytics::top_categories(&views.features, limit) {
        println!("  {:>6}  {}", entry.count, entry.name);
    }
    println!();

    println!("Time series:");
    for bucket in &views.series {
        println!("  {}  {}", bucket.start.format("%Y-%m-%d"), bucket.count);
    }
    println!();

    println!("By hour:");
    for hour in &views.hours {
        println!("  {:02}:00  {}", hour.hour, hour.count);
    }
}
