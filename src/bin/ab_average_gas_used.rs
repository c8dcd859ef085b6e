/*
 * A-B average gas used per service, by trade value
 */

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use swaplens::buckets::{self, format_value, ValueBucket, VALUE_RANGES};
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::filters::parse_token_list;
use swaplens::report::mean;
use swaplens::{ab, init_tracing, metrics};
use tracing::info;

#[derive(Parser)]
#[command(name = "ab_average_gas_used")]
#[command(about = "A-B average gas used per service and trade value")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Only forwarder (ETH->X) swaps
    #[arg(long)]
    forwarder: bool,

    /// Comma-separated token allow-list
    #[arg(long)]
    tokens: Option<String>,

    /// Fold the protocol fee in as gas units
    #[arg(long)]
    fees: bool,

    /// Output SVG path
    #[arg(long, default_value = "ab_average_gas_used.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let tokens = parse_token_list(args.tokens.as_deref());

    let data = ab::load_trade_groups(&args.path)?;
    println!("Loaded {} data items", data.len());

    let mut costs: BTreeMap<String, BTreeMap<ValueBucket, Vec<f64>>> = BTreeMap::new();
    for group in &data {
        if !group.values().all(metrics::is_successful) {
            continue;
        }
        for (service, swap) in group {
            if let Some(tokens) = &tokens {
                if !tokens.contains(&swap.metadata.maker_token)
                    || !tokens.contains(&swap.metadata.taker_token)
                {
                    continue;
                }
            }
            if args.forwarder && swap.metadata.taker_token != "ETH" {
                continue;
            }
            // None means the protocol fee is indistinguishable from the
            // traded asset; the swap is excluded rather than misdrawn.
            let Some(gas) = metrics::gas_used(swap, args.fees)? else {
                continue;
            };
            costs
                .entry(service.clone())
                .or_default()
                .entry(buckets::value_bucket(swap)?)
                .or_default()
                .push(gas as f64);
        }
    }

    let series: Vec<Series> = costs
        .iter()
        .map(|(service, by_bucket)| Series {
            name: service.clone(),
            values: VALUE_RANGES
                .iter()
                .map(|(_, max)| {
                    by_bucket
                        .get(&ValueBucket::Under(*max))
                        .map_or(0.0, |gas| mean(gas))
                })
                .collect(),
        })
        .collect();

    // Per-bucket sample counts, read off the first service's tallies.
    let first = costs.values().next();
    let x_ticks = VALUE_RANGES
        .iter()
        .map(|(_, max)| {
            let count = first
                .and_then(|by_bucket| by_bucket.get(&ValueBucket::Under(*max)))
                .map_or(0, Vec::len);
            format!("<{} ({count})", format_value(*max))
        })
        .collect();

    let bar = BarChart {
        title: format!("A-B average gas used by value ({} swaps)", data.len()),
        x_desc: "value".to_string(),
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
