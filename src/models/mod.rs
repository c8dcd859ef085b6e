/*
 * Data models and types for captured swap quote samples
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One observed swap attempt, as captured to a single NDJSON line.
///
/// Unknown fields are preserved in `extra` so filtered records can be
/// re-emitted without losing anything the model does not understand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRecord {
    pub metadata: SwapMetadata,
    #[serde(default)]
    pub orders: Vec<LimitOrder>,
    #[serde(default)]
    pub sources: Vec<LiquiditySource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapMetadata {
    /// Shared by every record quoting the same logical trade.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    #[serde(rename = "apiURL", skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Short service id derived by the URL normalizer; never read from input.
    #[serde(skip)]
    pub api_id: Option<String>,
    pub maker_token: String,
    pub taker_token: String,
    pub side: Side,
    /// USD notional, as a numeric string.
    pub fill_value: String,
    /// Seconds between quote and fill.
    pub fill_delay: f64,
    pub swap_result: SwapResult,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub gas_used: u64,
    pub bought_amount: String,
    pub sold_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bought_amount_usd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_amount_usd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_bought_amount_usd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_sold_amount_usd: Option<String>,
    /// "0x" means the on-chain call did not revert.
    pub revert_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eth_balance: Option<String>,
    #[serde(default)]
    pub order_infos: Vec<OrderInfo>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub order_status: i64,
    pub order_taker_asset_filled_amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitOrder {
    pub maker_asset_amount: String,
    pub taker_asset_amount: String,
    pub maker_asset_data: String,
    pub fee_recipient_address: String,
    pub maker_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquiditySource {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

// Asset data emitted for 0x native limit orders (ERC-20 proxy selector).
const ERC20_PROXY_SELECTOR: &str = "0xf47261b0";

impl SwapMetadata {
    /// The raw service URL; captures carry it as either `api` or `apiURL`.
    #[must_use]
    pub fn service_url(&self) -> Option<&str> {
        self.api.as_deref().or(self.api_url.as_deref())
    }

    /// "MAKER/TAKER" token pair label.
    #[must_use]
    pub fn pair(&self) -> String {
        format!("{}/{}", self.maker_token, self.taker_token)
    }
}

impl SwapRecord {
    /// The identifier reports group and label by: the normalized short id
    /// when one was derived, otherwise the full service URL.
    #[must_use]
    pub fn service_id(&self) -> Option<&str> {
        self.metadata.api_id.as_deref().or_else(|| self.metadata.service_url())
    }
}

impl LimitOrder {
    /// Whether this is a 0x native order rather than a bridged one.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.maker_asset_data.starts_with(ERC20_PROXY_SELECTOR)
    }
}

#[derive(Debug, Error)]
pub enum SwaplensError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Chart error: {0}")]
    ChartError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SwaplensError>;
