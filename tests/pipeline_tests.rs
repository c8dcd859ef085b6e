use std::io::Write;
use swaplens::ab::{group_trades, load_trade_groups, normalize_service_ids};
use swaplens::loader::load_records;
use swaplens::models::SwapRecord;

fn swap_line(trade_id: &str, url: &str, bought: &str) -> String {
    serde_json::json!({
        "metadata": {
            "id": trade_id,
            "apiURL": url,
            "makerToken": "DAI",
            "takerToken": "WETH",
            "side": "sell",
            "fillValue": "1200",
            "fillDelay": 45,
            "swapResult": {
                "gasUsed": 210000,
                "boughtAmount": bought,
                "soldAmount": "100",
                "revertData": "0x"
            }
        },
        "price": "1.0"
    })
    .to_string()
}

fn write_capture(lines: &[String]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

#[test]
fn two_services_one_trade_end_to_end() {
    let file = write_capture(&[
        swap_line("trade-1", "https://svc.example.com/a", "200"),
        swap_line("trade-1", "https://svc.example.com/b", "201"),
    ]);

    let report = load_records(file.path(), None).unwrap();
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.skipped_lines, 0);

    let groups = load_trade_groups(file.path()).unwrap();
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.len(), 2);
    let services: Vec<&String> = group.keys().collect();
    assert_eq!(services, ["a", "b"]);
}

#[test]
fn groups_never_mix_trade_ids() {
    let file = write_capture(&[
        swap_line("trade-1", "https://svc.example.com/a", "200"),
        swap_line("trade-2", "https://svc.example.com/b", "200"),
        swap_line("trade-2", "https://svc.example.com/a", "200"),
        swap_line("trade-3", "https://svc.example.com/a", "200"),
    ]);
    let groups = load_trade_groups(file.path()).unwrap();
    // First-seen trade order, one group per id.
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].len(), 1);
    assert_eq!(groups[1].len(), 2);
    assert_eq!(groups[2].len(), 1);
}

#[test]
fn duplicate_service_entries_keep_the_later_record() {
    let records: Vec<SwapRecord> = [
        swap_line("trade-1", "https://svc.example.com/a", "200"),
        swap_line("trade-1", "https://svc.example.com/a", "999"),
    ]
    .iter()
    .map(|line| serde_json::from_str(line).unwrap())
    .collect();

    let groups = group_trades(records).unwrap();
    assert_eq!(groups.len(), 1);
    let swap = groups[0].values().next().unwrap();
    assert_eq!(swap.metadata.swap_result.bought_amount, "999");
}

#[test]
fn no_common_prefix_keeps_full_urls() {
    let mut records: Vec<SwapRecord> = [
        swap_line("trade-1", "https://one.example/quote", "200"),
        swap_line("trade-1", "wss://two.example/quote", "200"),
    ]
    .iter()
    .map(|line| serde_json::from_str(line).unwrap())
    .collect();

    normalize_service_ids(&mut records);
    assert_eq!(records[0].metadata.api_id, None);
    assert_eq!(records[0].service_id(), Some("https://one.example/quote"));
}

#[test]
fn normalized_ids_share_no_further_prefix() {
    let mut records: Vec<SwapRecord> = [
        swap_line("trade-1", "https://svc.example.com/api/v1/a", "200"),
        swap_line("trade-2", "https://svc.example.com/api/v1/b", "200"),
    ]
    .iter()
    .map(|line| serde_json::from_str(line).unwrap())
    .collect();

    normalize_service_ids(&mut records);
    assert_eq!(records[0].metadata.api_id.as_deref(), Some("a"));
    assert_eq!(records[1].metadata.api_id.as_deref(), Some("b"));
}

#[test]
fn malformed_lines_do_not_poison_the_grouping() {
    let file = write_capture(&[
        swap_line("trade-1", "https://svc.example.com/a", "200"),
        "{\"truncated\":".to_string(),
        swap_line("trade-1", "https://svc.example.com/b", "200"),
    ]);
    let report = load_records(file.path(), None).unwrap();
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.skipped_lines, 1);

    let groups = load_trade_groups(file.path()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}
