/*
 * Revert rate by fee recipient address and fill delay
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

#[derive(Parser)]
#[command(name = "revert_rate_by_fee_recipient")]
#[command(about = "Revert rate by fee recipient address and fill delay")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Output SVG path
    #[arg(long, default_value = "revert_rate_by_fee_recipient.svg")]
    out: PathBuf,
}

fn fee_recipients(swap: &SwapRecord) -> BTreeSet<&str> {
    swap.orders
        .iter()
        .map(|o| o.fee_recipient_address.as_str())
        .collect()
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = loader::load_records(&args.path, None)?.into_records();
    println!("Loaded {} data items", data.len());

    let mut swaps_by_recipient: BTreeMap<String, Vec<&SwapRecord>> = BTreeMap::new();
    for swap in &data {
        for recipient in fee_recipients(swap) {
            swaps_by_recipient
                .entry(recipient.to_string())
                .or_default()
                .push(swap);
        }
    }

    let mut counters: BTreeMap<&String, Vec<RateCounter>> = BTreeMap::new();
    for (recipient, swaps) in &swaps_by_recipient {
        let by_delay = counters
            .entry(recipient)
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
    let x_ticks = swaps_by_recipient
        .iter()
        .map(|(recipient, swaps)| {
            let head = &recipient[..recipient.len().min(8)];
            format!("{head}... ({})", swaps.len())
        })
        .collect();

    let bar = BarChart {
        title: format!(
            "Revert rate by fee recipient and delay ({} swaps)",
            data.len()
        ),
        x_desc: "fee recipient".to_string(),
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
