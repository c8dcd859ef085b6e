/*
 * Revert rate by token and fill delay
 */

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use swaplens::buckets::{self, DELAY_RANGES};
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::report::RateCounter;
use swaplens::{init_tracing, loader, metrics};
use tracing::info;

#[derive(Parser)]
#[command(name = "revert_rate_by_token")]
#[command(about = "Revert rate by token and fill delay")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Service URL substring filter
    #[arg(long)]
    url: Option<String>,

    /// Output SVG path
    #[arg(long, default_value = "revert_rate_by_token.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = loader::load_records(&args.path, args.url.as_deref())?.into_records();
    println!("Loaded {} data items", data.len());

    // counters[token][delay range]; a swap counts under both of its tokens.
    let mut counters: BTreeMap<String, Vec<RateCounter>> = BTreeMap::new();
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for swap in &data {
        let metadata = &swap.metadata;
        let mut tokens = vec![&metadata.maker_token];
        if metadata.taker_token != metadata.maker_token {
            tokens.push(&metadata.taker_token);
        }
        for token in tokens {
            *totals.entry(token.clone()).or_insert(0) += 1;
            let by_delay = counters
                .entry(token.clone())
                .or_insert_with(|| vec![RateCounter::default(); DELAY_RANGES.len()]);
            for (delay_idx, range) in DELAY_RANGES.iter().enumerate() {
                if buckets::delay_in(metadata.fill_delay, *range) {
                    by_delay[delay_idx].observe(!metrics::is_successful(swap));
                }
            }
        }
    }
    info!("found {} tokens", counters.len());

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
    let x_ticks = counters
        .keys()
        .map(|token| format!("{token} ({})", totals[token]))
        .collect();

    let bar = BarChart {
        title: format!("Revert rate by token and delay ({} swaps)", data.len()),
        x_desc: "token".to_string(),
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
