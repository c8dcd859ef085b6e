/*
 * A-B realized fill win rate by winner's edge
 */

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use swaplens::chart;
use swaplens::filters::SwapFilters;
use swaplens::report::{edge_for_group, win_rate_chart, EdgeTally, BPS_SCALE};
use swaplens::{ab, init_tracing, metrics};
use tracing::info;

#[derive(Parser)]
#[command(name = "ab_realized_price")]
#[command(about = "A-B realized fill price win rate by winner's edge")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Only buy-side swaps
    #[arg(long)]
    buys: bool,

    /// Only sell-side swaps
    #[arg(long)]
    sells: bool,

    /// Comma-separated token allow-list
    #[arg(long, short = 't')]
    tokens: Option<String>,

    /// Output SVG path
    #[arg(long, default_value = "ab_realized_price.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let filters = SwapFilters::new(args.buys, args.sells, args.tokens.as_deref());

    let data: Vec<_> = ab::load_trade_groups(&args.path)?
        .into_iter()
        .filter(|group| filters.group_matches(group))
        .collect();
    println!("Loaded {} data items", data.len());

    let mut tally = EdgeTally::new();
    for group in &data {
        let outcome = edge_for_group(group, BPS_SCALE, |swap| {
            metrics::realized_price(swap, false)
        })?;
        if let Some(outcome) = outcome {
            tally.record(&outcome);
        }
    }

    let swap_type = if args.buys {
        "buys"
    } else if args.sells {
        "sells"
    } else {
        "swaps"
    };
    let title = format!(
        "A-B realized fill win rate by edge ({}/{} unequal {swap_type})",
        tally.total_outcomes(),
        data.len(),
    );
    chart::render_bar(&win_rate_chart(&tally, title), &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
