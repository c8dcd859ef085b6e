/*
 * A/B trade grouping: URL normalization and same-trade record grouping
 */

use crate::loader;
use crate::models::{Result, SwapRecord, SwaplensError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

/// All records produced for one logical trade, keyed by service id.
///
/// A service missing from the map did not respond for that trade.
pub type TradeGroup = BTreeMap<String, SwapRecord>;

/// Finds the longest `/`-bounded prefix (including its trailing `/`) shared
/// by every URL, starting from the shortest URL and dropping path segments
/// from the end. Returns `None` when the URLs share nothing.
#[must_use]
pub fn find_common_prefix(urls: &BTreeSet<String>) -> Option<String> {
    let shortest = urls.iter().min_by_key(|u| u.len())?;
    let parts: Vec<&str> = shortest.split('/').collect();
    for end in (1..parts.len()).rev() {
        let prefix = format!("{}/", parts[..end].join("/"));
        if urls.iter().all(|u| u.starts_with(&prefix)) {
            return Some(prefix);
        }
    }
    None
}

/// Derives a short `api_id` for every record by stripping the common URL
/// prefix. When no common prefix exists, records keep their full URL as
/// their service id.
pub fn normalize_service_ids(records: &mut [SwapRecord]) {
    let urls: BTreeSet<String> = records
        .iter()
        .filter_map(|r| r.metadata.service_url().map(str::to_owned))
        .collect();
    if urls.is_empty() {
        return;
    }
    let Some(prefix) = find_common_prefix(&urls) else {
        return;
    };
    for record in records.iter_mut() {
        if let Some(url) = record.metadata.service_url() {
            let short = url[prefix.len()..].to_string();
            record.metadata.api_id = Some(short);
        }
    }
}

/// Groups records by trade id into service-id → record maps, in first-seen
/// trade order. Two records for the same trade and service are retried or
/// duplicated captures; the later one wins.
pub fn group_trades(records: Vec<SwapRecord>) -> Result<Vec<TradeGroup>> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, TradeGroup> = HashMap::new();
    for record in records {
        let service = record
            .service_id()
            .ok_or_else(|| {
                SwaplensError::MissingField(format!(
                    "metadata.apiURL (trade {})",
                    record.metadata.id
                ))
            })?
            .to_string();
        let trade_id = record.metadata.id.clone();
        if !groups.contains_key(&trade_id) {
            order.push(trade_id.clone());
        }
        groups.entry(trade_id).or_default().insert(service, record);
    }
    Ok(order
        .into_iter()
        .map(|id| groups.remove(&id).unwrap_or_default())
        .collect())
}

/// Loads, normalizes and groups an A/B capture in one step.
pub fn load_trade_groups(path: &Path) -> Result<Vec<TradeGroup>> {
    let mut records = loader::load_records(path, None)?.into_records();
    normalize_service_ids(&mut records);
    group_trades(records)
}

/// Service ids present across a set of groups, sorted.
#[must_use]
pub fn service_ids(groups: &[TradeGroup]) -> Vec<String> {
    let ids: BTreeSet<&String> = groups.iter().flat_map(|g| g.keys()).collect();
    ids.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn common_prefix_stops_at_path_boundaries() {
        let set = urls(&[
            "https://svc.example.com/quote/a",
            "https://svc.example.com/quote/b",
        ]);
        assert_eq!(
            find_common_prefix(&set).as_deref(),
            Some("https://svc.example.com/quote/")
        );
    }

    #[test]
    fn no_shared_prefix_yields_none() {
        let set = urls(&["https://one.example/a", "wss://two.example/b"]);
        assert_eq!(find_common_prefix(&set), None);
    }

    #[test]
    fn identical_urls_keep_their_last_segment() {
        let set = urls(&["https://svc.example.com/swap/quote"]);
        assert_eq!(
            find_common_prefix(&set).as_deref(),
            Some("https://svc.example.com/swap/")
        );
    }
}
