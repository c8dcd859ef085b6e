/*
 * Frequency of order failure reasons among failed swaps' native orders
 */

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use swaplens::buckets::{self, DELAY_RANGES};
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::metrics::{self, OrderFailureReason, FAILURE_REASONS};
use swaplens::report::ratio;
use swaplens::{init_tracing, loader};
use tracing::info;

#[derive(Parser)]
#[command(name = "reverted_order_status")]
#[command(about = "Order failure reasons among failed swaps' native orders")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Output SVG path
    #[arg(long, default_value = "reverted_order_status.svg")]
    out: PathBuf,
}

struct FailedOrder {
    delay: f64,
    reason: OrderFailureReason,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = loader::load_records(&args.path, None)?.into_records();
    println!("Loaded {} data items", data.len());

    let mut failed_swaps = 0usize;
    let mut orders: Vec<FailedOrder> = Vec::new();
    for swap in &data {
        if swap.metadata.swap_result.revert_data == "0x" || swap.orders.is_empty() {
            continue;
        }
        failed_swaps += 1;
        for (idx, order) in swap.orders.iter().enumerate() {
            if order.is_native() {
                orders.push(FailedOrder {
                    delay: swap.metadata.fill_delay,
                    reason: metrics::order_failure_reason(swap, idx)?,
                });
            }
        }
    }
    info!("classified {} native orders from {failed_swaps} failed swaps", orders.len());

    // counts[reason][delay range]
    let mut counts: BTreeMap<OrderFailureReason, Vec<u64>> = BTreeMap::new();
    for order in &orders {
        for (delay_idx, range) in DELAY_RANGES.iter().enumerate() {
            if buckets::delay_in(order.delay, *range) {
                counts
                    .entry(order.reason)
                    .or_insert_with(|| vec![0; DELAY_RANGES.len()])[delay_idx] += 1;
            }
        }
    }
    let totals_by_delay: Vec<u64> = (0..DELAY_RANGES.len())
        .map(|delay_idx| counts.values().map(|by_delay| by_delay[delay_idx]).sum())
        .collect();

    let series: Vec<Series> = FAILURE_REASONS
        .iter()
        .map(|reason| Series {
            name: reason.to_string(),
            values: (0..DELAY_RANGES.len())
                .map(|delay_idx| {
                    let count = counts.get(reason).map_or(0, |by_delay| by_delay[delay_idx]);
                    ratio(count, totals_by_delay[delay_idx])
                })
                .collect(),
        })
        .collect();
    let x_ticks = DELAY_RANGES
        .iter()
        .zip(&totals_by_delay)
        .map(|((min, _), total)| format!("{min}s+ ({total})"))
        .collect();

    let bar = BarChart {
        title: format!(
            "frequency of order state in failed native orders, by delay ({failed_swaps} swaps)"
        ),
        x_desc: "delay".to_string(),
        y_desc: "order state frequency".to_string(),
        x_ticks,
        series,
        stacked: true,
        y_format: AxisFormat::Percent,
    };
    chart::render_bar(&bar, &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
