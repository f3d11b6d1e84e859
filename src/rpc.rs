use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use sha3::{Digest, Keccak256};

/// Signature of the view function exposed by the presale contract.
/// The call is read-only and must never mutate chain state.
const SALE_INFO_SIGNATURE: &str = "getSaleInfo()";

const WORD_SIZE: usize = 32;
const SALE_INFO_WORDS: usize = 8;

/// Raw sale parameters as returned by the contract: an 8-tuple of
/// `(saleActive, tokenPrice, totalTokensForSale, totalTokensSold,
/// minPurchase, maxPurchase, saleStartTime, saleEndTime)`.
/// Amounts are base units (wei, 10^-18 of a display token).
#[derive(Debug, Clone, Copy)]
pub struct SaleInfo {
    pub sale_active: bool,
    pub token_price: u128,
    pub total_tokens_for_sale: u128,
    pub total_tokens_sold: u128,
    pub min_purchase: u128,
    pub max_purchase: u128,
    pub sale_start_time: u64,
    pub sale_end_time: u64,
}

/// Seam between the aggregator and the chain. Handlers receive an explicit
/// provider instead of reaching for a process-wide client so tests can
/// substitute their own.
#[async_trait]
pub trait SaleInfoProvider: Send + Sync {
    async fn get_sale_info(&self) -> anyhow::Result<SaleInfo>;
}

/// `eth_call`-based provider talking JSON-RPC 2.0 to a node.
pub struct EthRpcClient {
    http: reqwest::Client,
    rpc_url: String,
    contract_address: String,
    call_data: String,
}

impl EthRpcClient {
    pub fn new(
        rpc_url: String,
        contract_address: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        // A hung node must not stall callers indefinitely, so the client
        // carries an explicit request timeout.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the RPC HTTP client")?;

        Ok(Self {
            http,
            rpc_url,
            contract_address,
            call_data: encode_sale_info_call(),
        })
    }
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<serde_json::Value>,
}

#[async_trait]
impl SaleInfoProvider for EthRpcClient {
    async fn get_sale_info(&self) -> anyhow::Result<SaleInfo> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": self.contract_address, "data": self.call_data },
                "latest"
            ],
        });

        let response: JsonRpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .context("Failed to deliver eth_call to the RPC node")?
            .error_for_status()
            .context("RPC node answered with an error status")?
            .json()
            .await
            .context("Failed to parse the JSON-RPC response")?;

        if let Some(error) = response.error {
            anyhow::bail!("RPC node returned an error: {}", error);
        }
        let result = response
            .result
            .context("JSON-RPC response has neither `result` nor `error`")?;

        decode_sale_info(&result)
    }
}

/// Call data for the sale info accessor: the first 4 bytes of
/// keccak-256 over the canonical signature.
fn encode_sale_info_call() -> String {
    let digest = Keccak256::digest(SALE_INFO_SIGNATURE.as_bytes());
    format!("0x{}", hex::encode(&digest[..4]))
}

/// Decodes the ABI-encoded 8-tuple. All members are static 32-byte words.
pub fn decode_sale_info(result: &str) -> anyhow::Result<SaleInfo> {
    let raw = hex::decode(result.trim_start_matches("0x"))
        .context("`result` expected to be hex-encoded")?;
    if raw.len() != WORD_SIZE * SALE_INFO_WORDS {
        anyhow::bail!(
            "sale info tuple expected to be {} words, got {} bytes",
            SALE_INFO_WORDS,
            raw.len()
        );
    }
    let word = |index: usize| &raw[index * WORD_SIZE..(index + 1) * WORD_SIZE];

    Ok(SaleInfo {
        sale_active: decode_bool(word(0)).context("`saleActive` expected to be bool")?,
        token_price: decode_u128(word(1)).context("`tokenPrice` expected to fit u128")?,
        total_tokens_for_sale: decode_u128(word(2))
            .context("`totalTokensForSale` expected to fit u128")?,
        total_tokens_sold: decode_u128(word(3))
            .context("`totalTokensSold` expected to fit u128")?,
        min_purchase: decode_u128(word(4)).context("`minPurchase` expected to fit u128")?,
        max_purchase: decode_u128(word(5)).context("`maxPurchase` expected to fit u128")?,
        sale_start_time: decode_u64(word(6)).context("`saleStartTime` expected to fit u64")?,
        sale_end_time: decode_u64(word(7)).context("`saleEndTime` expected to fit u64")?,
    })
}

fn decode_u128(word: &[u8]) -> anyhow::Result<u128> {
    if word[..WORD_SIZE / 2].iter().any(|byte| *byte != 0) {
        anyhow::bail!("uint256 value overflows u128");
    }
    let tail: [u8; 16] = word[WORD_SIZE / 2..]
        .try_into()
        .expect("word tail is exactly 16 bytes");
    Ok(u128::from_be_bytes(tail))
}

fn decode_u64(word: &[u8]) -> anyhow::Result<u64> {
    let value = decode_u128(word)?;
    u64::try_from(value).context("value overflows u64")
}

fn decode_bool(word: &[u8]) -> anyhow::Result<bool> {
    match decode_u128(word)? {
        0 => Ok(false),
        1 => Ok(true),
        other => anyhow::bail!("bool word expected to be 0 or 1, got {}", other),
    }
}
