/*
 * Mean slippage by token and trade value
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
#[command(name = "slippage_by_token")]
#[command(about = "Mean slippage by token and trade value")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Service URL substring filter
    #[arg(long)]
    url: Option<String>,

    /// Output SVG path
    #[arg(long, default_value = "slippage_by_token.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data: Vec<_> = loader::load_records(&args.path, args.url.as_deref())?
        .into_records()
        .into_iter()
        .filter(metrics::is_successful)
        .collect();
    println!("Loaded {} data items", data.len());

    // A swap's slippage counts under both of its tokens.
    let mut slippages: BTreeMap<&str, BTreeMap<ValueBucket, Vec<f64>>> = BTreeMap::new();
    for swap in &data {
        let slip = metrics::slippage(swap)?;
        let bucket = buckets::value_bucket(swap)?;
        let metadata = &swap.metadata;
        let mut tokens = vec![metadata.taker_token.as_str()];
        if metadata.maker_token != metadata.taker_token {
            tokens.push(metadata.maker_token.as_str());
        }
        for token in tokens {
            slippages
                .entry(token)
                .or_default()
                .entry(bucket)
                .or_default()
                .push(slip);
        }
    }

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
        .map(|(token, by_bucket)| {
            let count: usize = by_bucket.values().map(Vec::len).sum();
            format!("{token} ({count})")
        })
        .collect();

    let bar = BarChart {
        title: format!("Slippage by token and swap value ({} swaps)", data.len()),
        x_desc: "token".to_string(),
        y_desc: "slippage (+ is good)".to_string(),
        x_ticks,
        series,
        stacked: false,
        y_format: AxisFormat::PercentTenths,
    };
    chart::render_bar(&bar, &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
