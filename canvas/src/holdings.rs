//! Token-holdings check behind full access.
//!
//! One JSON-RPC round trip per question: `getTokenAccountsByOwner` (summed
//! over every account the wallet holds for the mint) and `getTokenSupply`.
//! The engine only ever sees the derived [`Holdings`] value; raw ledger
//! shapes stay in this module.

#[cfg(test)]
#[path = "holdings_test.rs"]
mod holdings_test;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_MIN_PERCENT: f64 = 0.1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Outcome of a successful check.
#[derive(Debug, Clone, PartialEq)]
pub struct Holdings {
    /// Whether the wallet holds at least the configured share of supply.
    pub meets_threshold: bool,
    /// Amount and share of supply, formatted for display.
    pub display: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HoldingsError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("invalid configuration {name}={value}")]
    InvalidConfig { name: &'static str, value: String },
    #[error("wallet address is empty")]
    EmptyAddress,
    #[error("rpc request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rpc returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("unexpected rpc response: {0}")]
    Malformed(String),
}

/// Answers "does this address hold enough?".
#[async_trait(?Send)]
pub trait HoldingsChecker {
    /// Check `address` against the configured threshold.
    ///
    /// # Errors
    ///
    /// Any failure to get a definite answer.
    async fn check(&self, address: &str) -> Result<Holdings, HoldingsError>;
}

/// RPC endpoint, asset and threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingsConfig {
    pub rpc_url: String,
    /// Token mint address.
    pub mint: String,
    /// Minimum share of total supply, in percent.
    pub min_percent: f64,
    /// Request timeout. Ignored in the browser build.
    pub timeout_secs: u64,
}

impl HoldingsConfig {
    /// Config for `mint` with default endpoint, threshold and timeout.
    #[must_use]
    pub fn new(mint: impl Into<String>) -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_owned(),
            mint: mint.into(),
            min_percent: DEFAULT_MIN_PERCENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from `BALL_TOKEN_MINT` (required), `BALL_RPC_URL`,
    /// `BALL_MIN_HOLDING_PERCENT` and `BALL_RPC_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Missing mint, or a present but unparsable number.
    pub fn from_env() -> Result<Self, HoldingsError> {
        Self::from_lookup(|key| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned()))
    }

    /// [`HoldingsConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Missing mint, or a present but unparsable number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HoldingsError> {
        let mint = lookup("BALL_TOKEN_MINT")
            .filter(|v| !v.trim().is_empty())
            .ok_or(HoldingsError::MissingConfig("BALL_TOKEN_MINT"))?;
        let mut config = Self::new(mint.trim());
        if let Some(url) = lookup("BALL_RPC_URL").filter(|v| !v.trim().is_empty()) {
            config.rpc_url = url.trim().to_owned();
        }
        config.min_percent = parse_var(&lookup, "BALL_MIN_HOLDING_PERCENT", DEFAULT_MIN_PERCENT)?;
        config.timeout_secs = parse_var(&lookup, "BALL_RPC_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, HoldingsError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| HoldingsError::InvalidConfig { name, value }),
    }
}

/// [`HoldingsChecker`] that talks JSON-RPC to a ledger node.
pub struct RpcHoldingsChecker {
    http: reqwest::Client,
    config: HoldingsConfig,
}

impl RpcHoldingsChecker {
    /// # Errors
    ///
    /// Returns [`HoldingsError::Http`] if the HTTP client cannot be built.
    pub fn new(config: HoldingsConfig) -> Result<Self, HoldingsError> {
        let http = build_client(&config)?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &HoldingsConfig {
        &self.config
    }

    async fn call(&self, method: &str, params: Value) -> Result<String, HoldingsError> {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let response = self.http.post(&self.config.rpc_url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(HoldingsError::Status { status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client(config: &HoldingsConfig) -> Result<reqwest::Client, HoldingsError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

#[cfg(target_arch = "wasm32")]
fn build_client(_config: &HoldingsConfig) -> Result<reqwest::Client, HoldingsError> {
    Ok(reqwest::Client::builder().build()?)
}

#[async_trait(?Send)]
impl HoldingsChecker for RpcHoldingsChecker {
    async fn check(&self, address: &str) -> Result<Holdings, HoldingsError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(HoldingsError::EmptyAddress);
        }
        let accounts = self
            .call(
                "getTokenAccountsByOwner",
                json!([address, { "mint": self.config.mint }, { "encoding": "jsonParsed" }]),
            )
            .await?;
        let held = parse_owner_balance(&accounts)?;
        let supply = parse_supply(&self.call("getTokenSupply", json!([self.config.mint])).await?)?;
        log::debug!("holdings for {address}: {held} of {supply}");
        Ok(summarize(held, supply, self.config.min_percent))
    }
}

/// Derive the access decision from raw amounts.
///
/// A zero or unknown supply never meets the threshold.
#[must_use]
pub fn summarize(held: f64, supply: f64, min_percent: f64) -> Holdings {
    let percent = if supply > 0.0 { held / supply * 100.0 } else { 0.0 };
    Holdings {
        meets_threshold: supply > 0.0 && percent >= min_percent,
        display: format!("{held} ({percent:.3}% of supply)"),
    }
}

// =============================================================================
// Response parsing
// =============================================================================

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WithValue<T> {
    value: T,
}

#[derive(Deserialize)]
struct KeyedAccount {
    account: AccountBody,
}

#[derive(Deserialize)]
struct AccountBody {
    data: AccountData,
}

#[derive(Deserialize)]
struct AccountData {
    parsed: ParsedAccount,
}

#[derive(Deserialize)]
struct ParsedAccount {
    info: AccountInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    token_amount: TokenAmount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAmount {
    ui_amount: Option<f64>,
    ui_amount_string: Option<String>,
}

impl TokenAmount {
    fn value(&self) -> Result<f64, HoldingsError> {
        if let Some(v) = self.ui_amount {
            return Ok(v);
        }
        match &self.ui_amount_string {
            Some(s) => s.parse().map_err(|_| HoldingsError::Malformed(format!("amount {s:?}"))),
            None => Err(HoldingsError::Malformed("token amount has no value".into())),
        }
    }
}

fn rpc_result<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, HoldingsError> {
    let envelope: RpcEnvelope<T> =
        serde_json::from_str(text).map_err(|e| HoldingsError::Malformed(e.to_string()))?;
    if let Some(err) = envelope.error {
        return Err(HoldingsError::Rpc { code: err.code, message: err.message });
    }
    envelope.result.ok_or_else(|| HoldingsError::Malformed("response has no result".into()))
}

/// Sum of UI amounts across every token account in a
/// `getTokenAccountsByOwner` response.
///
/// # Errors
///
/// RPC-level error or an unexpected shape.
pub fn parse_owner_balance(text: &str) -> Result<f64, HoldingsError> {
    let result: WithValue<Vec<KeyedAccount>> = rpc_result(text)?;
    result
        .value
        .iter()
        .map(|a| a.account.data.parsed.info.token_amount.value())
        .sum()
}

/// Total UI supply from a `getTokenSupply` response.
///
/// # Errors
///
/// RPC-level error or an unexpected shape.
pub fn parse_supply(text: &str) -> Result<f64, HoldingsError> {
    let result: WithValue<TokenAmount> = rpc_result(text)?;
    result.value.value()
}
