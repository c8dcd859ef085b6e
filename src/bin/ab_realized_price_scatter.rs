/*
 * A-B winner's edge vs fill size, one point per decided trade
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use swaplens::chart::{self, AxisFormat, ScatterChart};
use swaplens::filters::SwapFilters;
use swaplens::report::{edge_for_group, BPS_SCALE};
use swaplens::{ab, init_tracing, metrics};
use tracing::info;

#[derive(Parser)]
#[command(name = "ab_realized_price_scatter")]
#[command(about = "A-B winner's edge in bps against fill size")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Only buy-side swaps
    #[arg(long)]
    buys: bool,

    /// Only sell-side swaps
    #[arg(long)]
    sells: bool,

    /// Price in USD with the protocol fee folded in
    #[arg(long)]
    adjusted: bool,

    /// Comma-separated token allow-list
    #[arg(long, short = 't')]
    tokens: Option<String>,

    /// Output SVG path
    #[arg(long, default_value = "ab_realized_price_scatter.svg")]
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

    // Edges under 1bps are noise at this zoom.
    let mut points_by_winner: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
    let mut decided = 0usize;
    for group in &data {
        let outcome = edge_for_group(group, BPS_SCALE, |swap| {
            metrics::realized_price(swap, args.adjusted)
        })?;
        let Some(outcome) = outcome else { continue };
        if outcome.edge < 1.0 {
            continue;
        }
        let winner = &group[&outcome.winner];
        let fill_value: f64 = winner
            .metadata
            .fill_value
            .parse()
            .with_context(|| format!("bad fillValue {:?}", winner.metadata.fill_value))?;
        points_by_winner
            .entry(outcome.winner.clone())
            .or_default()
            .push((fill_value, outcome.edge));
        decided += 1;
    }

    let metric_type = if args.adjusted { "adjusted realized" } else { "realized" };
    let swap_type = if args.buys {
        "buys"
    } else if args.sells {
        "sells"
    } else {
        "swaps"
    };
    let scatter = ScatterChart {
        title: format!(
            "A-B {metric_type} fill win rate ({decided}/{} unequal {swap_type})",
            data.len(),
        ),
        x_desc: "fill size".to_string(),
        y_desc: "bps".to_string(),
        groups: points_by_winner.into_iter().collect(),
        x_format: AxisFormat::Dollars,
        y_format: AxisFormat::Integer,
        log_y: true,
    };
    chart::render_scatter(&scatter, &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
