/*
 * Re-emit records whose maker and taker tokens are both allow-listed
 *
 * Stdout carries the filtered NDJSON stream, so this tool stays quiet
 * otherwise.
 */

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use swaplens::{init_tracing, loader};

#[derive(Parser)]
#[command(name = "filter_by_token")]
#[command(about = "Keep only swaps trading the given tokens")]
struct Args {
    /// Token allow-list; repeat for each token
    #[arg(long = "token", required = true)]
    tokens: Vec<String>,

    /// Input NDJSON capture
    input: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = loader::load_records(&args.input, None)?.into_records();
    for swap in data.iter().filter(|swap| {
        args.tokens.contains(&swap.metadata.maker_token)
            && args.tokens.contains(&swap.metadata.taker_token)
    }) {
        println!("{}", serde_json::to_string(swap)?);
    }
    Ok(())
}
