/*
 * A-B revert rate per service, by included liquidity source
 */

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::report::RateCounter;
use swaplens::{ab, init_tracing, metrics};
use tracing::info;

#[derive(Parser)]
#[command(name = "ab_revert_rate_by_source")]
#[command(about = "A-B revert rate per service and included liquidity source")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Output SVG path
    #[arg(long, default_value = "ab_revert_rate_by_source.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = ab::load_trade_groups(&args.path)?;
    println!("Loaded {} data items", data.len());

    let mut counts: BTreeMap<String, BTreeMap<String, RateCounter>> = BTreeMap::new();
    for group in &data {
        for (service, swap) in group {
            for source in &swap.sources {
                counts
                    .entry(source.name.clone())
                    .or_default()
                    .entry(service.clone())
                    .or_default()
                    .observe(!metrics::is_successful(swap));
            }
        }
    }

    // Only sources every service actually routed through are comparable.
    let services = ab::service_ids(&data);
    let sources: Vec<&String> = counts
        .iter()
        .filter(|(_, by_service)| services.iter().all(|s| by_service.contains_key(s)))
        .map(|(source, _)| source)
        .collect();

    let series: Vec<Series> = services
        .iter()
        .map(|service| Series {
            name: service.clone(),
            values: sources
                .iter()
                .map(|source| counts[*source][service].rate())
                .collect(),
        })
        .collect();
    let x_ticks = sources
        .iter()
        .map(|source| {
            let total: u64 = counts[*source].values().map(|c| c.total).sum();
            format!("{source} ({total})")
        })
        .collect();

    let bar = BarChart {
        title: format!("A-B revert rate by (included) source ({} swaps)", data.len()),
        x_desc: "source".to_string(),
        y_desc: "revert rate".to_string(),
        x_ticks,
        series,
        stacked: false,
        y_format: AxisFormat::Percent,
    };
    chart::render_bar(&bar, &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
