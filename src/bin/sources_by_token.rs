/*
 * Share of liquidity sources included per token
 */

use anyhow::Result;
use clap::Parser;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use swaplens::chart::{self, AxisFormat, BarChart, Series};
use swaplens::report::ratio;
use swaplens::{init_tracing, loader};
use tracing::info;

#[derive(Parser)]
#[command(name = "sources_by_token")]
#[command(about = "Share of liquidity sources included per token")]
struct Args {
    /// Input NDJSON capture
    path: PathBuf,

    /// Service URL substring filter
    #[arg(long)]
    url: Option<String>,

    /// Output SVG path
    #[arg(long, default_value = "sources_by_token.svg")]
    out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = loader::load_records(&args.path, args.url.as_deref())?.into_records();
    println!("Loaded {} data items", data.len());

    let tokens: BTreeSet<&str> = data
        .iter()
        .flat_map(|swap| {
            [
                swap.metadata.maker_token.as_str(),
                swap.metadata.taker_token.as_str(),
            ]
        })
        .collect();

    // counts[source][token]: how many swaps touching the token routed
    // through the source.
    let mut counts: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();
    for swap in &data {
        let swap_tokens = [
            swap.metadata.maker_token.as_str(),
            swap.metadata.taker_token.as_str(),
        ];
        for source in &swap.sources {
            let by_token = counts.entry(source.name.as_str()).or_default();
            for &token in &tokens {
                if swap_tokens.contains(&token) {
                    *by_token.entry(token).or_insert(0) += 1;
                }
            }
        }
    }

    let totals_by_token: BTreeMap<&str, u64> = tokens
        .iter()
        .map(|token| {
            let total = counts
                .values()
                .map(|by_token| by_token.get(token).copied().unwrap_or(0))
                .sum();
            (*token, total)
        })
        .collect();

    let series: Vec<Series> = counts
        .iter()
        .map(|(source, by_token)| Series {
            name: source.to_string(),
            values: tokens
                .iter()
                .map(|token| {
                    ratio(
                        by_token.get(token).copied().unwrap_or(0),
                        totals_by_token[token],
                    )
                })
                .collect(),
        })
        .collect();
    let x_ticks = tokens.iter().map(|token| token.to_string()).collect();

    let bar = BarChart {
        title: format!("frequency of sources included by token ({} swaps)", data.len()),
        x_desc: "token".to_string(),
        y_desc: "source inclusion rate".to_string(),
        x_ticks,
        series,
        stacked: true,
        y_format: AxisFormat::Percent,
    };
    chart::render_bar(&bar, &args.out)?;
    info!("wrote {}", args.out.display());
    Ok(())
}
