/*
 * Per-record metric extractors
 *
 * Price and slippage metrics are only defined over successful swaps; callers
 * filter with `is_successful` first.
 */

use crate::models::{Result, Side, SwapRecord, SwaplensError};
use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Decimal digits carried through big-integer ratios before narrowing.
const RATIO_PRECISION: u32 = 64;

/// A swap succeeded iff the call did not revert and something was bought.
#[must_use]
pub fn is_successful(record: &SwapRecord) -> bool {
    let result = &record.metadata.swap_result;
    result.revert_data == "0x" && result.bought_amount != "0"
}

/// Realized fill price, `boughtAmount / soldAmount`.
///
/// The adjusted variant prices in USD with the protocol fee folded into
/// whichever side it was charged against.
pub fn realized_price(record: &SwapRecord, adjusted: bool) -> Result<f64> {
    let result = &record.metadata.swap_result;
    if adjusted {
        let (bought, sold) = match record.metadata.side {
            Side::Sell => (
                require(&result.adjusted_bought_amount_usd, "metadata.swapResult.adjustedBoughtAmountUsd")?,
                require(&result.sold_amount_usd, "metadata.swapResult.soldAmountUsd")?,
            ),
            Side::Buy => (
                require(&result.bought_amount_usd, "metadata.swapResult.boughtAmountUsd")?,
                require(&result.adjusted_sold_amount_usd, "metadata.swapResult.adjustedSoldAmountUsd")?,
            ),
        };
        let bought = parse_decimal(bought, "USD bought amount")?;
        let sold = parse_decimal(sold, "USD sold amount")?;
        if sold.is_zero() {
            return Err(SwaplensError::CalculationError(
                "USD sold amount is zero".to_string(),
            ));
        }
        (bought / sold).to_f64().ok_or_else(|| {
            SwaplensError::CalculationError("USD price does not fit an f64".to_string())
        })
    } else {
        let bought = parse_biguint(&result.bought_amount, "metadata.swapResult.boughtAmount")?;
        let sold = parse_biguint(&result.sold_amount, "metadata.swapResult.soldAmount")?;
        big_ratio(&BigInt::from(bought), &BigInt::from(sold))
    }
}

/// How much of the requested buy amount the swap actually delivered.
pub fn fill_accuracy(record: &SwapRecord) -> Result<f64> {
    let bought = parse_biguint(
        &record.metadata.swap_result.bought_amount,
        "metadata.swapResult.boughtAmount",
    )?;
    let requested = parse_biguint(require(&record.buy_amount, "buyAmount")?, "buyAmount")?;
    big_ratio(&BigInt::from(bought), &BigInt::from(requested))
}

/// The originally quoted price, as the service reported it.
pub fn quoted_price(record: &SwapRecord) -> Result<f64> {
    let price = require(&record.price, "price")?;
    price
        .parse::<f64>()
        .map_err(|e| SwaplensError::CalculationError(format!("bad price {price:?}: {e}")))
}

/// Gas consumed by the swap. With `include_fees`, the protocol fee is folded
/// in as `(protocolFee - ethBalance) / gasPrice` gas units, floored at zero.
///
/// Returns `None` when the fee cannot be told apart from the traded asset
/// (ETH on the maker side, or on the taker side of a buy); callers exclude
/// those records.
pub fn gas_used(record: &SwapRecord, include_fees: bool) -> Result<Option<u64>> {
    let base = record.metadata.swap_result.gas_used;
    if !include_fees {
        return Ok(Some(base));
    }
    let metadata = &record.metadata;
    if metadata.maker_token == "ETH"
        || (metadata.side == Side::Buy && metadata.taker_token == "ETH")
    {
        return Ok(None);
    }
    let protocol_fee = parse_i128(require(&record.protocol_fee, "protocolFee")?, "protocolFee")?;
    let eth_balance = parse_i128(
        require(&metadata.swap_result.eth_balance, "metadata.swapResult.ethBalance")?,
        "metadata.swapResult.ethBalance",
    )?;
    let gas_price = parse_i128(require(&record.gas_price, "gasPrice")?, "gasPrice")?;
    if gas_price <= 0 {
        return Err(SwaplensError::CalculationError(format!(
            "gasPrice must be positive, got {gas_price}"
        )));
    }
    let fee_wei = protocol_fee - eth_balance;
    let fee_gas = if fee_wei <= 0 { 0 } else { fee_wei / gas_price };
    let fee_gas = u64::try_from(fee_gas).map_err(|e| {
        SwaplensError::CalculationError(format!("protocol fee gas overflows: {e}"))
    })?;
    Ok(Some(base + fee_gas))
}

/// Realized slippage against the best constituent order's limit price:
/// `(filledPrice - bestOrderPrice) / bestOrderPrice`. Positive means the
/// trader did better than the best limit price.
pub fn slippage(record: &SwapRecord) -> Result<f64> {
    let mut orders = record.orders.iter();
    let first = orders
        .next()
        .ok_or_else(|| SwaplensError::MissingField("orders".to_string()))?;

    // Best limit price across orders, compared exactly by cross-multiplying.
    let mut best = order_price_parts(first)?;
    for order in orders {
        let candidate = order_price_parts(order)?;
        if &candidate.0 * &best.1 > &best.0 * &candidate.1 {
            best = candidate;
        }
    }
    let (best_maker, best_taker) = best;

    let result = &record.metadata.swap_result;
    let bought = parse_biguint(&result.bought_amount, "metadata.swapResult.boughtAmount")?;
    let sold = parse_biguint(&result.sold_amount, "metadata.swapResult.soldAmount")?;

    // filled/best - 1 == (bought*taker - sold*maker) / (sold*maker), formed
    // exactly before narrowing.
    let num = BigInt::from(bought * best_taker);
    let den = BigInt::from(sold * best_maker);
    big_ratio(&(&num - &den), &den)
}

fn order_price_parts(order: &crate::models::LimitOrder) -> Result<(BigUint, BigUint)> {
    let maker = parse_biguint(&order.maker_asset_amount, "orders[].makerAssetAmount")?;
    let taker = parse_biguint(&order.taker_asset_amount, "orders[].takerAssetAmount")?;
    if taker.is_zero() {
        return Err(SwaplensError::CalculationError(
            "order has zero takerAssetAmount".to_string(),
        ));
    }
    Ok((maker, taker))
}

/// Whether unfilled order liquidity would still have covered the requested
/// sell amount, i.e. the fill likely lost a race for it.
///
/// Panics if the capture is malformed (requested sell amount exceeding the
/// orders' total taker amount); that signals corrupt data and must surface.
pub fn was_frontrun(record: &SwapRecord) -> Result<bool> {
    let sell_amount = parse_biguint(
        require(&record.sell_amount, "sellAmount")?,
        "sellAmount",
    )?;
    let mut taker_total = BigUint::zero();
    for order in &record.orders {
        taker_total += parse_biguint(&order.taker_asset_amount, "orders[].takerAssetAmount")?;
    }
    assert!(
        sell_amount <= taker_total,
        "sellAmount {sell_amount} exceeds total takerAssetAmount {taker_total} for trade {}",
        record.metadata.id,
    );
    let mut filled_total = BigUint::zero();
    for info in &record.metadata.swap_result.order_infos {
        filled_total += parse_biguint(
            &info.order_taker_asset_filled_amount,
            "metadata.swapResult.orderInfos[].orderTakerAssetFilledAmount",
        )?;
    }
    let remaining = BigInt::from(taker_total) - BigInt::from(filled_total);
    Ok(BigInt::from(sell_amount) < remaining)
}

/// Why an order inside a failed swap did not fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrderFailureReason {
    Expired,
    Filled,
    Cancelled,
    Invalid,
    /// Open with enough unused liquidity left over; somebody else probably
    /// took the fill first.
    MaybeFrontrun,
    Fillable,
}

/// Stable ordering for charts.
pub const FAILURE_REASONS: [OrderFailureReason; 6] = [
    OrderFailureReason::Expired,
    OrderFailureReason::Filled,
    OrderFailureReason::Cancelled,
    OrderFailureReason::Invalid,
    OrderFailureReason::MaybeFrontrun,
    OrderFailureReason::Fillable,
];

impl fmt::Display for OrderFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderFailureReason::Expired => "expired",
            OrderFailureReason::Filled => "filled",
            OrderFailureReason::Cancelled => "cancelled",
            OrderFailureReason::Invalid => "invalid",
            OrderFailureReason::MaybeFrontrun => "frontrun?",
            OrderFailureReason::Fillable => "fillable",
        };
        write!(f, "{label}")
    }
}

/// Classifies one order of a failed swap by its on-chain status code.
pub fn order_failure_reason(record: &SwapRecord, order_idx: usize) -> Result<OrderFailureReason> {
    let info = record
        .metadata
        .swap_result
        .order_infos
        .get(order_idx)
        .ok_or_else(|| {
            SwaplensError::MissingField(format!(
                "metadata.swapResult.orderInfos[{order_idx}]"
            ))
        })?;
    let reason = match info.order_status {
        4 => OrderFailureReason::Expired,
        5 => OrderFailureReason::Filled,
        6 => OrderFailureReason::Cancelled,
        status if status != 3 => OrderFailureReason::Invalid,
        _ => {
            if was_frontrun(record)? {
                OrderFailureReason::MaybeFrontrun
            } else {
                OrderFailureReason::Fillable
            }
        }
    };
    Ok(reason)
}

/// Narrows an exact integer ratio to `f64`, carrying `RATIO_PRECISION`
/// decimal digits through the division first.
fn big_ratio(num: &BigInt, den: &BigInt) -> Result<f64> {
    if den.is_zero() {
        return Err(SwaplensError::CalculationError(
            "division by zero in amount ratio".to_string(),
        ));
    }
    let scale = BigInt::from(BigUint::from(10u8).pow(RATIO_PRECISION));
    let scaled = (num * &scale) / den;
    let value = scaled.to_f64().ok_or_else(|| {
        SwaplensError::CalculationError("amount ratio does not fit an f64".to_string())
    })?;
    Ok(value / 1e64)
}

fn require<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| SwaplensError::MissingField(field.to_string()))
}

fn parse_biguint(value: &str, field: &str) -> Result<BigUint> {
    BigUint::from_str(value).map_err(|e| {
        SwaplensError::CalculationError(format!("bad {field} {value:?}: {e}"))
    })
}

fn parse_i128(value: &str, field: &str) -> Result<i128> {
    value.parse::<i128>().map_err(|e| {
        SwaplensError::CalculationError(format!("bad {field} {value:?}: {e}"))
    })
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| {
        SwaplensError::CalculationError(format!("bad {field} {value:?}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_record() -> serde_json::Value {
        json!({
            "metadata": {
                "id": "trade-1",
                "apiURL": "https://svc/a",
                "makerToken": "DAI",
                "takerToken": "WETH",
                "side": "sell",
                "fillValue": "1000",
                "fillDelay": 10,
                "swapResult": {
                    "gasUsed": 21000,
                    "boughtAmount": "200",
                    "soldAmount": "100",
                    "revertData": "0x"
                }
            }
        })
    }

    fn record(value: serde_json::Value) -> SwapRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn success_requires_no_revert_and_nonzero_bought() {
        let ok = record(base_record());
        assert!(is_successful(&ok));

        let mut reverted = base_record();
        reverted["metadata"]["swapResult"]["revertData"] = json!("0xdeadbeef");
        assert!(!is_successful(&record(reverted)));

        let mut empty = base_record();
        empty["metadata"]["swapResult"]["boughtAmount"] = json!("0");
        assert!(!is_successful(&record(empty)));

        let mut garbage = base_record();
        garbage["metadata"]["swapResult"]["revertData"] = json!("");
        assert!(!is_successful(&record(garbage)));
    }

    #[test]
    fn realized_price_is_exact_for_small_ratios() {
        let swap = record(base_record());
        assert_eq!(realized_price(&swap, false).unwrap(), 2.0);
    }

    #[test]
    fn realized_price_survives_token_scale_amounts() {
        let mut value = base_record();
        value["metadata"]["swapResult"]["boughtAmount"] = json!("300000000000000000000000");
        value["metadata"]["swapResult"]["soldAmount"] = json!("200000000000000000000000");
        let price = realized_price(&record(value), false).unwrap();
        assert!((price - 1.5).abs() < 1e-12);
    }

    #[test]
    fn adjusted_price_picks_fields_by_side() {
        let mut sell = base_record();
        sell["metadata"]["swapResult"]["adjustedBoughtAmountUsd"] = json!("99.0");
        sell["metadata"]["swapResult"]["soldAmountUsd"] = json!("100.0");
        let price = realized_price(&record(sell), true).unwrap();
        assert!((price - 0.99).abs() < 1e-12);

        let mut buy = base_record();
        buy["metadata"]["side"] = json!("buy");
        buy["metadata"]["swapResult"]["boughtAmountUsd"] = json!("100.0");
        buy["metadata"]["swapResult"]["adjustedSoldAmountUsd"] = json!("101.0");
        let price = realized_price(&record(buy), true).unwrap();
        assert!((price - 100.0 / 101.0).abs() < 1e-12);
    }

    #[test]
    fn adjusted_price_without_usd_fields_fails_fast() {
        let err = realized_price(&record(base_record()), true).unwrap_err();
        assert!(matches!(err, SwaplensError::MissingField(_)));
    }

    #[test]
    fn gas_with_fees_folds_protocol_fee_in() {
        let mut value = base_record();
        value["protocolFee"] = json!("1500");
        value["gasPrice"] = json!("100");
        value["metadata"]["swapResult"]["ethBalance"] = json!("500");
        assert_eq!(gas_used(&record(value), true).unwrap(), Some(21010));
    }

    #[test]
    fn gas_fee_is_floored_at_zero() {
        let mut value = base_record();
        value["protocolFee"] = json!("100");
        value["gasPrice"] = json!("100");
        value["metadata"]["swapResult"]["ethBalance"] = json!("5000");
        assert_eq!(gas_used(&record(value), true).unwrap(), Some(21000));
    }

    #[test]
    fn gas_with_fees_refuses_eth_maker() {
        let mut value = base_record();
        value["metadata"]["makerToken"] = json!("ETH");
        assert_eq!(gas_used(&record(value), true).unwrap(), None);
        // Without fees the same record is fine.
        assert_eq!(gas_used(&record(base_record()), false).unwrap(), Some(21000));
    }

    #[test]
    fn gas_with_fees_refuses_eth_taker_on_buys() {
        let mut value = base_record();
        value["metadata"]["side"] = json!("buy");
        value["metadata"]["takerToken"] = json!("ETH");
        assert_eq!(gas_used(&record(value), true).unwrap(), None);
    }

    #[test]
    fn positive_slippage_means_trader_did_better() {
        let mut value = base_record();
        value["orders"] = json!([{
            "makerAssetAmount": "100",
            "takerAssetAmount": "100",
            "makerAssetData": "0xf47261b0aa",
            "feeRecipientAddress": "0xfee",
            "makerAddress": "0xmaker"
        }]);
        value["metadata"]["swapResult"]["boughtAmount"] = json!("105");
        value["metadata"]["swapResult"]["soldAmount"] = json!("100");
        let slip = slippage(&record(value)).unwrap();
        assert!((slip - 0.05).abs() < 1e-12);
    }

    #[test]
    fn slippage_uses_the_best_order_price() {
        let mut value = base_record();
        value["orders"] = json!([
            {
                "makerAssetAmount": "100",
                "takerAssetAmount": "100",
                "makerAssetData": "0xf47261b0aa",
                "feeRecipientAddress": "0xfee",
                "makerAddress": "0xmaker"
            },
            {
                "makerAssetAmount": "200",
                "takerAssetAmount": "100",
                "makerAssetData": "0xf47261b0aa",
                "feeRecipientAddress": "0xfee",
                "makerAddress": "0xmaker"
            }
        ]);
        value["metadata"]["swapResult"]["boughtAmount"] = json!("200");
        value["metadata"]["swapResult"]["soldAmount"] = json!("100");
        // Filled exactly at the better order's price.
        assert_eq!(slippage(&record(value)).unwrap(), 0.0);
    }

    fn frontrun_fixture(sell: &str, filled: &str, status: i64) -> SwapRecord {
        let mut value = base_record();
        value["sellAmount"] = json!(sell);
        value["orders"] = json!([{
            "makerAssetAmount": "1000",
            "takerAssetAmount": "1000",
            "makerAssetData": "0xf47261b0aa",
            "feeRecipientAddress": "0xfee",
            "makerAddress": "0xmaker"
        }]);
        value["metadata"]["swapResult"]["orderInfos"] = json!([{
            "orderStatus": status,
            "orderTakerAssetFilledAmount": filled
        }]);
        record(value)
    }

    #[test]
    fn expired_wins_over_frontrun_detection() {
        let swap = frontrun_fixture("100", "0", 4);
        assert_eq!(
            order_failure_reason(&swap, 0).unwrap(),
            OrderFailureReason::Expired
        );
    }

    #[test]
    fn open_order_with_unused_liquidity_is_frontrun_suspect() {
        // 1000 total, nothing filled, only 100 requested: liquidity was there.
        let swap = frontrun_fixture("100", "0", 3);
        assert_eq!(
            order_failure_reason(&swap, 0).unwrap(),
            OrderFailureReason::MaybeFrontrun
        );
    }

    #[test]
    fn open_order_with_consumed_liquidity_is_fillable() {
        // 1000 total, 950 already filled: the 100 requested no longer fits.
        let swap = frontrun_fixture("100", "950", 3);
        assert_eq!(
            order_failure_reason(&swap, 0).unwrap(),
            OrderFailureReason::Fillable
        );
    }

    #[test]
    fn unknown_status_is_invalid() {
        let swap = frontrun_fixture("100", "0", 42);
        assert_eq!(
            order_failure_reason(&swap, 0).unwrap(),
            OrderFailureReason::Invalid
        );
    }

    #[test]
    #[should_panic(expected = "exceeds total takerAssetAmount")]
    fn oversized_sell_amount_panics() {
        let swap = frontrun_fixture("2000", "0", 3);
        let _ = was_frontrun(&swap);
    }
}
