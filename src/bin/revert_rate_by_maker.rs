/*
 * Revert rate by maker address and fill delay
 */

use anyhow::Result;
use clap::Parser;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use swaplens::buckets::{self, DELAY_RANGES};
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::models::SwapRecord;
use swaplens::report::RateCounter;
use swaplens::{init_tracing, loader, metrics};
use tracing::info;

/// Makers involved in fewer than this share of swaps are pruned.
const MIN_SWAP_SHARE: f64 = 0.01;

#[derive(Parser)]
#[command(name = "revert_rate_by_maker")]
#[command(about = "Revert rate by maker address and fill delay")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Service URL substring filter
    #[arg(long)]
    url: Option<String>,

    /// Output SVG path
    #[arg(long, default_value = "revert_rate_by_maker.svg")]
    out: PathBuf,
}

fn maker_addresses(swap: &SwapRecord) -> BTreeSet<&str> {
    swap.orders
        .iter()
        .map(|o| o.maker_address.as_str())
        .collect()
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = loader::load_records(&args.path, args.url.as_deref())?.into_records();
    println!("Loaded {} data items", data.len());

    let mut swaps_by_maker: BTreeMap<String, Vec<&SwapRecord>> = BTreeMap::new();
    for swap in &data {
        for maker in maker_addresses(swap) {
            swaps_by_maker.entry(maker.to_string()).or_default().push(swap);
        }
    }
    // Prune low-count makers.
    swaps_by_maker
        .retain(|_, swaps| swaps.len() as f64 / data.len().max(1) as f64 >= MIN_SWAP_SHARE);

    let fee_recipients: BTreeMap<&String, &str> = swaps_by_maker
        .iter()
        .filter_map(|(maker, swaps)| {
            swaps.first().and_then(|swap| {
                swap.orders
                    .iter()
                    .find(|o| o.maker_address == **maker)
                    .map(|o| (maker, o.fee_recipient_address.as_str()))
            })
        })
        .collect();
    info!("maker fee recipients: {fee_recipients:?}");

    let mut counters: BTreeMap<&String, Vec<RateCounter>> = BTreeMap::new();
    for (maker, swaps) in &swaps_by_maker {
        let by_delay = counters
            .entry(maker)
            .or_insert_with(|| vec![RateCounter::default(); DELAY_RANGES.len()]);
        for swap in swaps {
            for (delay_idx, range) in DELAY_RANGES.iter().enumerate() {
                if buckets::delay_in(swap.metadata.fill_delay, *range) {
                    by_delay[delay_idx].observe(!metrics::is_successful(swap));
                }
            }
        }
    }

    let series: Vec<Series> = DELAY_RANGES
        .iter()
        .enumerate()
        .map(|(delay_idx, (min, _))| Series {
            name: format!("{min}s"),
            values: counters
                .values()
                .map(|by_delay| by_delay[delay_idx].rate())
                .collect(),
        })
        .collect();
    let x_ticks = swaps_by_maker
        .iter()
        .map(|(maker, swaps)| {
            let head = &maker[..maker.len().min(8)];
            format!("{head}... ({})", swaps.len())
        })
        .collect();

    let bar = BarChart {
        title: format!("Revert rate by maker and delay ({} swaps)", data.len()),
        x_desc: "maker".to_string(),
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
