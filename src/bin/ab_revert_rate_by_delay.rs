/*
 * A-B revert rate per service, by fill delay
 */

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use swaplens::buckets;
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::report::RateCounter;
use swaplens::{ab, init_tracing, metrics};
use tracing::info;

#[derive(Parser)]
#[command(name = "ab_revert_rate_by_delay")]
#[command(about = "A-B revert rate per service and fill delay")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Output SVG path
    #[arg(long, default_value = "ab_revert_rate_by_delay.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = ab::load_trade_groups(&args.path)?;
    println!("Loaded {} data items", data.len());

    let mut counts: BTreeMap<u64, BTreeMap<String, RateCounter>> = BTreeMap::new();
    for group in &data {
        for (service, swap) in group {
            counts
                .entry(buckets::delay_bucket(swap))
                .or_default()
                .entry(service.clone())
                .or_default()
                .observe(!metrics::is_successful(swap));
        }
    }

    let services = ab::service_ids(&data);
    let delays: Vec<u64> = counts.keys().copied().collect();
    let series: Vec<Series> = services
        .into_iter()
        .map(|service| Series {
            values: delays
                .iter()
                .map(|delay| {
                    counts[delay]
                        .get(&service)
                        .copied()
                        .unwrap_or_default()
                        .rate()
                })
                .collect(),
            name: service,
        })
        .collect();
    let x_ticks = delays
        .iter()
        .map(|delay| {
            let total: u64 = counts[delay].values().map(|c| c.total).sum();
            format!("{delay}s ({total})")
        })
        .collect();

    let bar = BarChart {
        title: format!("A-B revert rate by delay ({} swaps)", data.len()),
        x_desc: "delay".to_string(),
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
