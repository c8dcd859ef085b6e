/*
 * Mean gas used by liquidity source and trade value, single-source swaps
 */

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use swaplens::buckets::{self, format_value, ValueBucket, VALUE_RANGES};
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::report::mean;
use swaplens::{init_tracing, loader, metrics};
use tracing::info;

#[derive(Parser)]
#[command(name = "gas_usage_by_source")]
#[command(about = "Mean gas used by liquidity source and trade value")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Service URL substring filter
    #[arg(long)]
    url: Option<String>,

    /// Output SVG path
    #[arg(long, default_value = "gas_usage_by_source.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data: Vec<_> = loader::load_records(&args.path, args.url.as_deref())?
        .into_records()
        .into_iter()
        .filter(|swap| swap.sources.len() == 1 && metrics::is_successful(swap))
        .collect();
    println!("Loaded {} data items", data.len());

    let mut gas: BTreeMap<&str, BTreeMap<ValueBucket, Vec<f64>>> = BTreeMap::new();
    for swap in &data {
        gas.entry(swap.sources[0].name.as_str())
            .or_default()
            .entry(buckets::value_bucket(swap)?)
            .or_default()
            .push(swap.metadata.swap_result.gas_used as f64);
    }

    let series: Vec<Series> = VALUE_RANGES
        .iter()
        .map(|(_, max)| Series {
            name: format!("< {}", format_value(*max)),
            values: gas
                .values()
                .map(|by_bucket| {
                    by_bucket
                        .get(&ValueBucket::Under(*max))
                        .map_or(0.0, |values| mean(values))
                })
                .collect(),
        })
        .collect();
    let x_ticks = gas
        .iter()
        .map(|(source, by_bucket)| {
            let count: usize = by_bucket.values().map(Vec::len).sum();
            format!("{source} ({count})")
        })
        .collect();

    let bar = BarChart {
        title: format!("Gas used by source ({} single-source swaps)", data.len()),
        x_desc: "source".to_string(),
        y_desc: "gas used".to_string(),
        x_ticks,
        series,
        stacked: false,
        y_format: AxisFormat::Thousands,
    };
    chart::render_bar(&bar, &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
