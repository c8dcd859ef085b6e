/*
 * Report assembly: A/B edge tallies and rate/mean aggregation
 */

use crate::ab::TradeGroup;
use crate::models::{Result, SwapRecord, SwaplensError};
use std::collections::BTreeMap;

/// Winner's-edge thresholds in basis points.
pub const BPS_STOPS: [u32; 6] = [1, 5, 10, 50, 100, 1_000];

/// Edge scale for basis points: `(best - worst) / worst * 10_000`.
pub const BPS_SCALE: f64 = 1e4;

/// One decided A/B comparison: the best and worst service for a trade and
/// the winner's relative edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeOutcome {
    pub winner: String,
    pub loser: String,
    pub edge: f64,
}

/// Compares every service's metric within a trade group.
///
/// Returns `None` for degenerate groups where one service is both best and
/// worst (all metrics equal, or the group holds a single record) — a normal
/// outcome, not an error. `scale` converts the relative edge into the
/// report's unit (basis points for most reports).
pub fn edge_for_group<F>(group: &TradeGroup, scale: f64, metric: F) -> Result<Option<EdgeOutcome>>
where
    F: Fn(&SwapRecord) -> Result<f64>,
{
    let mut best: Option<(&String, f64)> = None;
    let mut worst: Option<(&String, f64)> = None;
    for (service, record) in group {
        let value = metric(record)?;
        if best.is_none_or(|(_, b)| value > b) {
            best = Some((service, value));
        }
        if worst.is_none_or(|(_, w)| value < w) {
            worst = Some((service, value));
        }
    }
    let (Some((best_id, best_value)), Some((worst_id, worst_value))) = (best, worst) else {
        return Ok(None);
    };
    if best_id == worst_id {
        return Ok(None);
    }
    if worst_value == 0.0 {
        return Err(SwaplensError::CalculationError(format!(
            "cannot size {best_id}'s edge against a zero metric from {worst_id}"
        )));
    }
    Ok(Some(EdgeOutcome {
        winner: best_id.clone(),
        loser: worst_id.clone(),
        edge: (best_value - worst_value) / worst_value * scale,
    }))
}

/// Win counts per edge stop per service. An outcome counts toward every stop
/// its edge clears; both winner and loser are registered under each cleared
/// stop so the stop's totals cover all decided trades.
#[derive(Debug, Default)]
pub struct EdgeTally {
    wins: BTreeMap<u32, BTreeMap<String, u64>>,
}

impl EdgeTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a decided comparison. Outcomes clearing no stop are dropped.
    pub fn record(&mut self, outcome: &EdgeOutcome) {
        for stop in BPS_STOPS {
            if outcome.edge < f64::from(stop) {
                break;
            }
            let services = self.wins.entry(stop).or_default();
            services.entry(outcome.loser.clone()).or_insert(0);
            *services.entry(outcome.winner.clone()).or_insert(0) += 1;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wins.is_empty()
    }

    /// Stops that received at least one outcome, ascending.
    #[must_use]
    pub fn stops(&self) -> Vec<u32> {
        self.wins.keys().copied().collect()
    }

    /// Every service seen in the tally, sorted.
    #[must_use]
    pub fn services(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .wins
            .values()
            .flat_map(|by_service| by_service.keys().cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    #[must_use]
    pub fn wins(&self, stop: u32, service: &str) -> u64 {
        self.wins
            .get(&stop)
            .and_then(|by_service| by_service.get(service))
            .copied()
            .unwrap_or(0)
    }

    /// Decided trades counted under a stop.
    #[must_use]
    pub fn total(&self, stop: u32) -> u64 {
        self.wins
            .get(&stop)
            .map(|by_service| by_service.values().sum())
            .unwrap_or(0)
    }

    /// Decided trades across all stops a trade cleared at least once, i.e.
    /// the grand total shown in report titles.
    #[must_use]
    pub fn total_outcomes(&self) -> u64 {
        // Every recorded outcome clears the first stop.
        BPS_STOPS.first().map_or(0, |stop| self.total(*stop))
    }
}

/// Stacked win-share chart over an edge tally: one column per cleared stop,
/// one band per service.
#[must_use]
pub fn win_rate_chart(tally: &EdgeTally, title: String) -> crate::chart::BarChart {
    let stops = tally.stops();
    let x_ticks = stops
        .iter()
        .map(|stop| format!("{stop}bps+ ({})", tally.total(*stop)))
        .collect();
    let series = tally
        .services()
        .into_iter()
        .map(|service| crate::chart::Series {
            values: stops
                .iter()
                .map(|stop| ratio(tally.wins(*stop, &service), tally.total(*stop)))
                .collect(),
            name: service,
        })
        .collect();
    crate::chart::BarChart {
        title,
        x_desc: "winner's edge".to_string(),
        y_desc: "win rate".to_string(),
        x_ticks,
        series,
        stacked: true,
        y_format: crate::chart::AxisFormat::Percent,
    }
}

/// Revert/total style counter. The rate of an empty counter is zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct RateCounter {
    pub hits: u64,
    pub total: u64,
}

impl RateCounter {
    pub fn observe(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        }
        self.total += 1;
    }

    /// hits / total, with 0/0 defined as 0.
    #[must_use]
    pub fn rate(&self) -> f64 {
        ratio(self.hits, self.total)
    }
}

/// num / den with 0/0 defined as 0, the convention for empty rate buckets.
#[must_use]
pub fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Arithmetic mean; empty input means an empty chart cell, rendered as 0.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(winner: &str, loser: &str, edge: f64) -> EdgeOutcome {
        EdgeOutcome {
            winner: winner.to_string(),
            loser: loser.to_string(),
            edge,
        }
    }

    #[test]
    fn a_100bps_edge_clears_every_stop_up_to_100() {
        let mut tally = EdgeTally::new();
        tally.record(&outcome("a", "b", 100.0));
        assert_eq!(tally.stops(), vec![1, 5, 10, 50, 100]);
        for stop in [1, 5, 10, 50, 100] {
            assert_eq!(tally.wins(stop, "a"), 1);
            assert_eq!(tally.wins(stop, "b"), 0);
            assert_eq!(tally.total(stop), 1);
        }
        assert_eq!(tally.total(1_000), 0);
    }

    #[test]
    fn sub_threshold_edges_are_dropped() {
        let mut tally = EdgeTally::new();
        tally.record(&outcome("a", "b", 0.4));
        assert!(tally.is_empty());
        assert_eq!(tally.total_outcomes(), 0);
    }

    #[test]
    fn losers_appear_with_zero_wins() {
        let mut tally = EdgeTally::new();
        tally.record(&outcome("a", "b", 7.0));
        tally.record(&outcome("b", "a", 2.0));
        assert_eq!(tally.services(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(tally.wins(1, "a"), 1);
        assert_eq!(tally.wins(1, "b"), 1);
        assert_eq!(tally.wins(5, "a"), 1);
        assert_eq!(tally.wins(5, "b"), 0);
        assert_eq!(tally.total(1), 2);
    }

    #[test]
    fn zero_denominator_rates_are_zero() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(3, 4), 0.75);
        let counter = RateCounter::default();
        assert_eq!(counter.rate(), 0.0);
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }
}
