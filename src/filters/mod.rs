/*
 * Record filters shared by the report binaries
 */

use crate::ab::TradeGroup;
use crate::metrics;
use crate::models::{Side, SwapRecord};

/// Side and token-allow-list constraints applied before aggregation.
#[derive(Debug, Default, Clone)]
pub struct SwapFilters {
    pub side: Option<Side>,
    pub tokens: Option<Vec<String>>,
}

impl SwapFilters {
    #[must_use]
    pub fn new(buys: bool, sells: bool, tokens: Option<&str>) -> Self {
        let side = match (buys, sells) {
            (true, _) => Some(Side::Buy),
            (_, true) => Some(Side::Sell),
            _ => None,
        };
        Self {
            side,
            tokens: parse_token_list(tokens),
        }
    }

    #[must_use]
    pub fn matches(&self, record: &SwapRecord) -> bool {
        if let Some(side) = self.side {
            if record.metadata.side != side {
                return false;
            }
        }
        if let Some(tokens) = &self.tokens {
            if !tokens.contains(&record.metadata.maker_token)
                || !tokens.contains(&record.metadata.taker_token)
            {
                return false;
            }
        }
        true
    }

    /// A/B groups only count when every member swap succeeded and matches.
    #[must_use]
    pub fn group_matches(&self, group: &TradeGroup) -> bool {
        group
            .values()
            .all(|record| metrics::is_successful(record) && self.matches(record))
    }
}

/// Splits a `--tokens A,B,C` flag; empty or missing means no constraint.
#[must_use]
pub fn parse_token_list(tokens: Option<&str>) -> Option<Vec<String>> {
    let tokens = tokens?.trim();
    if tokens.is_empty() {
        return None;
    }
    Some(tokens.split(',').map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_flag_means_no_constraint() {
        assert_eq!(parse_token_list(None), None);
        assert_eq!(parse_token_list(Some("")), None);
        assert_eq!(
            parse_token_list(Some("DAI,WETH")),
            Some(vec!["DAI".to_string(), "WETH".to_string()])
        );
    }
}
