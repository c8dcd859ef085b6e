/*
 * A-B quoted price win rate by winner's edge
 *
 * Quoted prices sit much closer together than realized ones, so this report
 * sizes edges on a tenth of the usual scale.
 */

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use swaplens::chart;
use swaplens::report::{edge_for_group, win_rate_chart, EdgeTally};
use swaplens::{ab, init_tracing, metrics};
use tracing::info;

const QUOTE_EDGE_SCALE: f64 = 1e3;

#[derive(Parser)]
#[command(name = "ab_quoted_price")]
#[command(about = "A-B quoted price win rate by winner's edge")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Output SVG path
    #[arg(long, default_value = "ab_quoted_price.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data: Vec<_> = ab::load_trade_groups(&args.path)?
        .into_iter()
        .filter(|group| group.values().all(metrics::is_successful))
        .collect();
    println!("Loaded {} data items", data.len());

    let mut tally = EdgeTally::new();
    for group in &data {
        let outcome = edge_for_group(group, QUOTE_EDGE_SCALE, metrics::quoted_price)?;
        if let Some(outcome) = outcome {
            tally.record(&outcome);
        }
    }

    let title = format!(
        "A-B quoted price win rate by edge ({}/{} unequal swaps)",
        tally.total_outcomes(),
        data.len(),
    );
    chart::render_bar(&win_rate_chart(&tally, title), &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
