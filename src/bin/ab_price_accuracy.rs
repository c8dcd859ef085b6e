/*
 * A-B delivered-vs-requested fill accuracy per service, by trade value
 */

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use swaplens::buckets::{self, format_value, ValueBucket, VALUE_RANGES};
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::report::mean;
use swaplens::{ab, init_tracing, metrics};
use tracing::info;

#[derive(Parser)]
#[command(name = "ab_price_accuracy")]
#[command(about = "A-B fill accuracy per service and trade value")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Output SVG path
    #[arg(long, default_value = "ab_price_accuracy.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    // Only trades more than one service actually quoted.
    let data: Vec<_> = ab::load_trade_groups(&args.path)?
        .into_iter()
        .filter(|group| group.len() > 1)
        .collect();
    println!("Loaded {} data items", data.len());

    let mut accuracy: BTreeMap<String, BTreeMap<ValueBucket, Vec<f64>>> = BTreeMap::new();
    for group in &data {
        for (service, swap) in group {
            accuracy
                .entry(service.clone())
                .or_default()
                .entry(buckets::value_bucket(swap)?)
                .or_default()
                .push(metrics::fill_accuracy(swap)?);
        }
    }

    let series: Vec<Series> = accuracy
        .iter()
        .map(|(service, by_bucket)| Series {
            name: service.clone(),
            values: VALUE_RANGES
                .iter()
                .map(|(_, max)| {
                    by_bucket
                        .get(&ValueBucket::Under(*max))
                        .map_or(0.0, |values| mean(values))
                })
                .collect(),
        })
        .collect();
    let x_ticks = VALUE_RANGES
        .iter()
        .map(|(_, max)| format!("< {}", format_value(*max)))
        .collect();

    let bar = BarChart {
        title: format!("A-B price accuracy by swap value ({} swaps)", data.len()),
        x_desc: "swap value".to_string(),
        y_desc: "accuracy".to_string(),
        x_ticks,
        series,
        stacked: false,
        y_format: AxisFormat::Decimal,
    };
    chart::render_bar(&bar, &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
