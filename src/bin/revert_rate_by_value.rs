/*
 * Revert rate by trade value and fill delay
 */

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use swaplens::buckets::{self, format_value, ValueBucket, DELAY_RANGES, VALUE_RANGES};
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::report::RateCounter;
use swaplens::{init_tracing, loader, metrics};
use tracing::info;

#[derive(Parser)]
#[command(name = "revert_rate_by_value")]
#[command(about = "Revert rate by swap value and fill delay")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Output SVG path
    #[arg(long, default_value = "revert_rate_by_value.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = loader::load_records(&args.path, None)?.into_records();
    println!("Loaded {} data items", data.len());

    // counters[value range][delay range]
    let mut counters = vec![vec![RateCounter::default(); DELAY_RANGES.len()]; VALUE_RANGES.len()];
    let mut value_totals = vec![0u64; VALUE_RANGES.len()];
    for swap in &data {
        let bucket = buckets::value_bucket(swap)?;
        let Some(value_idx) = VALUE_RANGES
            .iter()
            .position(|(_, max)| bucket == ValueBucket::Under(*max))
        else {
            // Beyond the last range; this report charts the fixed ranges only.
            continue;
        };
        value_totals[value_idx] += 1;
        for (delay_idx, range) in DELAY_RANGES.iter().enumerate() {
            if buckets::delay_in(swap.metadata.fill_delay, *range) {
                counters[value_idx][delay_idx].observe(!metrics::is_successful(swap));
            }
        }
    }

    let series: Vec<Series> = DELAY_RANGES
        .iter()
        .enumerate()
        .map(|(delay_idx, (min, _))| Series {
            name: format!("{min}s"),
            values: (0..VALUE_RANGES.len())
                .map(|value_idx| counters[value_idx][delay_idx].rate())
                .collect(),
        })
        .collect();
    let x_ticks = VALUE_RANGES
        .iter()
        .zip(&value_totals)
        .map(|((_, max), count)| format!("<{} ({count})", format_value(*max)))
        .collect();

    let bar = BarChart {
        title: format!("Revert rate by swap value and delay ({} swaps)", data.len()),
        x_desc: "swap value".to_string(),
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
