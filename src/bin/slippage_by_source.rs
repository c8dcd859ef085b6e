/*
 * Mean slippage by liquidity source and trade value, single-source swaps
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
#[command(name = "slippage_by_source")]
#[command(about = "Mean slippage by liquidity source and trade value")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Output SVG path
    #[arg(long, default_value = "slippage_by_source.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data: Vec<_> = loader::load_records(&args.path, None)?
        .into_records()
        .into_iter()
        .filter(metrics::is_successful)
        .collect();
    println!("Loaded {} data items", data.len());

    // Only swaps routed through exactly one bridged source attribute their
    // slippage cleanly.
    let mut slippages: BTreeMap<&str, BTreeMap<ValueBucket, Vec<f64>>> = BTreeMap::new();
    for swap in &data {
        let [source] = swap.sources.as_slice() else { continue };
        if source.name == "0x" {
            continue;
        }
        slippages
            .entry(source.name.as_str())
            .or_default()
            .entry(buckets::value_bucket(swap)?)
            .or_default()
            .push(metrics::slippage(swap)?);
    }
    info!("found {} sources", slippages.len());

    let series: Vec<Series> = VALUE_RANGES
        .iter()
        .map(|(_, max)| Series {
            name: format!("< {}", format_value(*max)),
            values: slippages
                .values()
                .map(|by_bucket| {
                    by_bucket
                        .get(&ValueBucket::Under(*max))
                        .map_or(0.0, |values| mean(values))
                })
                .collect(),
        })
        .collect();
    let x_ticks = slippages
        .iter()
        .map(|(source, by_bucket)| {
            let count: usize = by_bucket.values().map(Vec::len).sum();
            format!("{source} ({count})")
        })
        .collect();

    let bar = BarChart {
        title: format!("Slippage by source and swap value ({} swaps)", data.len()),
        x_desc: "source".to_string(),
        y_desc: "slippage".to_string(),
        x_ticks,
        series,
        stacked: false,
        y_format: AxisFormat::PercentTenths,
    };
    chart::render_bar(&bar, &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
