use swaplens::ab::TradeGroup;
use swaplens::metrics;
use swaplens::models::{SwapRecord, SwaplensError};
use swaplens::report::{edge_for_group, EdgeTally, BPS_SCALE};

fn swap(url: &str, bought: &str, sold: &str) -> SwapRecord {
    serde_json::from_value(serde_json::json!({
        "metadata": {
            "id": "trade-1",
            "apiURL": url,
            "makerToken": "DAI",
            "takerToken": "WETH",
            "side": "sell",
            "fillValue": "1200",
            "fillDelay": 45,
            "swapResult": {
                "gasUsed": 210000,
                "boughtAmount": bought,
                "soldAmount": sold,
                "revertData": "0x"
            }
        }
    }))
    .unwrap()
}

fn group(entries: Vec<(&str, SwapRecord)>) -> TradeGroup {
    entries
        .into_iter()
        .map(|(service, record)| (service.to_string(), record))
        .collect()
}

#[test]
fn a_one_percent_price_gap_is_a_100bps_edge() {
    let group = group(vec![
        ("a", swap("https://svc/a", "101", "100")),
        ("b", swap("https://svc/b", "100", "100")),
    ]);
    let outcome = edge_for_group(&group, BPS_SCALE, |s| metrics::realized_price(s, false))
        .unwrap()
        .unwrap();
    assert_eq!(outcome.winner, "a");
    assert_eq!(outcome.loser, "b");
    assert!((outcome.edge - 100.0).abs() < 1e-6);

    let mut tally = EdgeTally::new();
    tally.record(&outcome);
    assert_eq!(tally.stops(), vec![1, 5, 10, 50, 100]);
    assert_eq!(tally.wins(100, "a"), 1);
    assert_eq!(tally.wins(100, "b"), 0);
    assert_eq!(tally.total(1_000), 0);
}

#[test]
fn equal_services_are_a_degenerate_group() {
    let group = group(vec![
        ("a", swap("https://svc/a", "100", "100")),
        ("b", swap("https://svc/b", "100", "100")),
    ]);
    let outcome =
        edge_for_group(&group, BPS_SCALE, |s| metrics::realized_price(s, false)).unwrap();
    assert!(outcome.is_none());
}

#[test]
fn single_service_groups_are_degenerate_too() {
    let group = group(vec![("a", swap("https://svc/a", "105", "100"))]);
    let outcome =
        edge_for_group(&group, BPS_SCALE, |s| metrics::realized_price(s, false)).unwrap();
    assert!(outcome.is_none());
}

#[test]
fn metric_errors_propagate_out_of_the_comparison() {
    let group = group(vec![
        ("a", swap("https://svc/a", "101", "100")),
        ("b", swap("https://svc/b", "100", "100")),
    ]);
    let err = edge_for_group(&group, BPS_SCALE, |_| {
        Err(SwaplensError::MissingField("price".to_string()))
    })
    .unwrap_err();
    assert!(matches!(err, SwaplensError::MissingField(_)));
}

#[test]
fn quoted_price_edges_use_the_reports_own_scale() {
    // A 1% gap on a 1e3 scale is a 10-point edge.
    let mut a = swap("https://svc/a", "100", "100");
    a.price = Some("1.01".to_string());
    let mut b = swap("https://svc/b", "100", "100");
    b.price = Some("1.00".to_string());
    let group = group(vec![("a", a), ("b", b)]);
    let outcome = edge_for_group(&group, 1e3, metrics::quoted_price)
        .unwrap()
        .unwrap();
    assert!((outcome.edge - 10.0).abs() < 1e-9);
}
