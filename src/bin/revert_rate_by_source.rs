/*
 * Revert rate by liquidity source class and fill delay
 *
 * Swaps are classed by how their liquidity was put together: pure 0x native
 * orders, a single bridged source, or mixes with and without native orders.
 */

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use swaplens::buckets::{self, DELAY_RANGES};
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::models::SwapRecord;
use swaplens::report::RateCounter;
use swaplens::{init_tracing, loader, metrics};
use tracing::info;

const SOURCE_CLASSES: [&str; 4] = ["0x", "bridge", "native-mix", "bridge-mix"];

#[derive(Parser)]
#[command(name = "revert_rate_by_source")]
#[command(about = "Revert rate by liquidity source class and fill delay")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Output SVG path
    #[arg(long, default_value = "revert_rate_by_source.svg")]
    out: PathBuf,
}

fn source_class(swap: &SwapRecord) -> Option<usize> {
    let names: Vec<&str> = swap.sources.iter().map(|s| s.name.as_str()).collect();
    match names.as_slice() {
        [] => None,
        ["0x"] => Some(0),
        [_] => Some(1),
        _ if names.contains(&"0x") => Some(2),
        _ => Some(3),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = loader::load_records(&args.path, None)?.into_records();
    println!("Loaded {} data items", data.len());

    // counters[class][delay range]
    let mut counters =
        vec![vec![RateCounter::default(); DELAY_RANGES.len()]; SOURCE_CLASSES.len()];
    let mut class_totals = vec![0u64; SOURCE_CLASSES.len()];
    for swap in &data {
        let Some(class_idx) = source_class(swap) else { continue };
        class_totals[class_idx] += 1;
        for (delay_idx, range) in DELAY_RANGES.iter().enumerate() {
            if buckets::delay_in(swap.metadata.fill_delay, *range) {
                counters[class_idx][delay_idx].observe(!metrics::is_successful(swap));
            }
        }
    }

    let series: Vec<Series> = DELAY_RANGES
        .iter()
        .enumerate()
        .map(|(delay_idx, (min, _))| Series {
            name: format!("{min}s"),
            values: (0..SOURCE_CLASSES.len())
                .map(|class_idx| counters[class_idx][delay_idx].rate())
                .collect(),
        })
        .collect();
    let x_ticks = SOURCE_CLASSES
        .iter()
        .zip(&class_totals)
        .map(|(class, count)| format!("{class} ({count})"))
        .collect();

    let bar = BarChart {
        title: format!("Revert rate by source and delay ({} swaps)", data.len()),
        x_desc: "source".to_string(),
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
