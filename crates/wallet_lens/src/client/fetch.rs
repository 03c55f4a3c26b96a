//! Hosted wallet-data API client with rate limiting, retries and response caching.

use crate::chain::{Chain, ChainFamily};
use crate::client::cache::{CacheKey, ResponseCache};
use crate::client::responses::{
    BlockchairDashboard, EvmNativeBalance, EvmTokenBalance, EvmTransaction, NetWorthResponse,
    NftOwned, NftTransfer, Page, PnlSummary, PnlTokenBreakdown, SolNativeBalance, SplTokenBalance,
    TokenTransfer,
};
use crate::normalize::{
    balance, nfts, normalize_date, tokens, transactions, worth, DateError, NativeBalance,
    NetWorthRow, NftRow, NftTransferRow, PnlRow, PnlTokenGroup, TokenBalanceRow, TokenTransferRow,
    TransactionRow,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

const DEFAULT_EVM_URL: &str = "https://deep-index.moralis.io/api/v2.2";
const DEFAULT_SOLANA_URL: &str = "https://solana-gateway.moralis.io";
const DEFAULT_BLOCKCHAIR_URL: &str = "https://api.blockchair.com";
const RATE_LIMIT_MS: u64 = 200;
const MAX_RETRIES: u32 = 3;
const RETRY_BACKOFF_MS: u64 = 500;

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub evm_base_url: String,
    pub solana_base_url: String,
    pub blockchair_base_url: String,
    pub rate_limit_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            evm_base_url: DEFAULT_EVM_URL.to_string(),
            solana_base_url: DEFAULT_SOLANA_URL.to_string(),
            blockchair_base_url: DEFAULT_BLOCKCHAIR_URL.to_string(),
            rate_limit_ms: RATE_LIMIT_MS,
            max_retries: MAX_RETRIES,
            retry_backoff_ms: RETRY_BACKOFF_MS,
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api error: status {0} body {1}")]
    Api(u16, String),
    #[error("decode {0}: {1}")]
    Decode(&'static str, String),
    #[error("normalize: {0}")]
    Normalize(#[from] DateError),
    #[error("{operation} is not available on {chain}")]
    Unsupported {
        operation: &'static str,
        chain: Chain,
    },
}

/// Optional filters for the transaction history query. Each set field
/// participates in the cache key, so filtered and unfiltered calls never
/// collide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxFilter {
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Clone, Copy, Debug)]
pub struct NetWorthOptions {
    pub exclude_spam: bool,
    pub exclude_unverified_contracts: bool,
}

impl Default for NetWorthOptions {
    fn default() -> Self {
        Self {
            exclude_spam: true,
            exclude_unverified_contracts: true,
        }
    }
}

/// Client for the hosted wallet-data gateways. Owns the response cache;
/// constructed explicitly and passed to every call site.
pub struct WalletApi {
    config: FetchConfig,
    client: reqwest::Client,
    cache: ResponseCache,
    api_key: String,
    last_request: std::sync::Mutex<Option<Instant>>,
    request_count: AtomicU64,
}

impl WalletApi {
    pub fn new(api_key: String, config: FetchConfig) -> Result<Self, FetchError> {
        Self::with_cache(api_key, config, ResponseCache::default())
    }

    pub fn with_cache(
        api_key: String,
        config: FetchConfig,
        cache: ResponseCache,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            config,
            client,
            cache,
            api_key,
            last_request: std::sync::Mutex::new(None),
            request_count: AtomicU64::new(0),
        })
    }

    /// Drop all cached responses so the next query of each kind refetches.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Number of upstream requests actually performed (cache hits excluded).
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub async fn native_balance(
        &self,
        address: &str,
        chain: Chain,
    ) -> Result<Option<NativeBalance>, FetchError> {
        let request = json!({ "address": address, "chain": chain.id() });
        let url = match chain.family() {
            ChainFamily::Evm => self.evm_url(
                &format!("/{}/balance", urlencoding::encode(address)),
                &[("chain", chain.id())],
            )?,
            ChainFamily::Solana => self.gateway_url(
                &self.config.solana_base_url,
                &format!("/account/mainnet/{}/balance", urlencoding::encode(address)),
            )?,
            ChainFamily::Bitcoin => self.gateway_url(
                &self.config.blockchair_base_url,
                &format!(
                    "/bitcoin/dashboards/address/{}",
                    urlencoding::encode(address)
                ),
            )?,
        };
        let with_key = chain.family() != ChainFamily::Bitcoin;
        let Some(body) = self.cached_get("native_balance", &request, url, with_key).await? else {
            return Ok(None);
        };
        match chain.family() {
            ChainFamily::Evm => {
                let decoded: EvmNativeBalance = decode("native_balance", body)?;
                Ok(Some(balance::from_evm(chain, &decoded)))
            }
            ChainFamily::Solana => {
                let decoded: SolNativeBalance = decode("native_balance", body)?;
                Ok(Some(balance::from_solana(&decoded)))
            }
            ChainFamily::Bitcoin => {
                let decoded: BlockchairDashboard = decode("native_balance", body)?;
                Ok(balance::from_blockchair(address, &decoded))
            }
        }
    }

    pub async fn token_balances(
        &self,
        address: &str,
        chain: Chain,
    ) -> Result<Option<Vec<TokenBalanceRow>>, FetchError> {
        let request = json!({ "address": address, "chain": chain.id() });
        let rows = match chain.family() {
            ChainFamily::Evm => {
                let url = self.evm_url(
                    &format!("/{}/erc20", urlencoding::encode(address)),
                    &[("chain", chain.id())],
                )?;
                let Some(body) = self.cached_get("token_balances", &request, url, true).await?
                else {
                    return Ok(None);
                };
                let decoded: Vec<EvmTokenBalance> = decode("token_balances", body)?;
                tokens::from_evm(&decoded)
            }
            ChainFamily::Solana => {
                let url = self.gateway_url(
                    &self.config.solana_base_url,
                    &format!("/account/mainnet/{}/tokens", urlencoding::encode(address)),
                )?;
                let Some(body) = self.cached_get("token_balances", &request, url, true).await?
                else {
                    return Ok(None);
                };
                let decoded: Vec<SplTokenBalance> = decode("token_balances", body)?;
                tokens::from_spl(&decoded)
            }
            ChainFamily::Bitcoin => {
                return Err(FetchError::Unsupported {
                    operation: "token balances",
                    chain,
                })
            }
        };
        info!(count = rows.len(), "token_balances");
        Ok(Some(rows))
    }

    pub async fn wallet_transactions(
        &self,
        address: &str,
        chain: Chain,
        filter: &TxFilter,
    ) -> Result<Option<Vec<TransactionRow>>, FetchError> {
        require_evm("wallet transactions", chain)?;
        let from_ts = filter.from_date.as_deref().map(normalize_date).transpose()?;
        let to_ts = filter.to_date.as_deref().map(normalize_date).transpose()?;
        let request = json!({
            "address": address,
            "chain": chain.id(),
            "from_block": filter.from_block,
            "to_block": filter.to_block,
            "from_date": from_ts,
            "to_date": to_ts,
        });
        let mut params: Vec<(&str, String)> = vec![("chain", chain.id().to_string())];
        if let Some(from_block) = filter.from_block {
            params.push(("from_block", from_block.to_string()));
        }
        if let Some(to_block) = filter.to_block {
            params.push(("to_block", to_block.to_string()));
        }
        if let Some(from_ts) = from_ts {
            params.push(("from_date", from_ts.to_string()));
        }
        if let Some(to_ts) = to_ts {
            params.push(("to_date", to_ts.to_string()));
        }
        let borrowed: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let url = self.evm_url(&format!("/{}", urlencoding::encode(address)), &borrowed)?;
        let Some(body) = self
            .cached_get("wallet_transactions", &request, url, true)
            .await?
        else {
            return Ok(None);
        };
        let page: Page<EvmTransaction> = decode("wallet_transactions", body)?;
        let rows = transactions::from_evm(&page.result);
        info!(count = rows.len(), "wallet_transactions");
        Ok(Some(rows))
    }

    pub async fn nft_transfers(
        &self,
        address: &str,
        chain: Chain,
    ) -> Result<Option<Vec<NftTransferRow>>, FetchError> {
        require_evm("NFT transfers", chain)?;
        let request = json!({ "address": address, "chain": chain.id() });
        let url = self.evm_url(
            &format!("/{}/nft/transfers", urlencoding::encode(address)),
            &[("chain", chain.id())],
        )?;
        let Some(body) = self.cached_get("nft_transfers", &request, url, true).await? else {
            return Ok(None);
        };
        let page: Page<NftTransfer> = decode("nft_transfers", body)?;
        let rows = nfts::transfers(&page.result);
        info!(count = rows.len(), "nft_transfers");
        Ok(Some(rows))
    }

    pub async fn nfts(
        &self,
        address: &str,
        chain: Chain,
    ) -> Result<Option<Vec<NftRow>>, FetchError> {
        require_evm("NFT holdings", chain)?;
        let request = json!({ "address": address, "chain": chain.id() });
        let url = self.evm_url(
            &format!("/{}/nft", urlencoding::encode(address)),
            &[("chain", chain.id())],
        )?;
        let Some(body) = self.cached_get("nfts", &request, url, true).await? else {
            return Ok(None);
        };
        let page: Page<NftOwned> = decode("nfts", body)?;
        let rows = nfts::from_owned(&page.result);
        info!(count = rows.len(), "nfts");
        Ok(Some(rows))
    }

    pub async fn token_transfers(
        &self,
        address: &str,
        chain: Chain,
    ) -> Result<Option<Vec<TokenTransferRow>>, FetchError> {
        require_evm("token transfers", chain)?;
        let request = json!({ "address": address, "chain": chain.id() });
        let url = self.evm_url(
            &format!("/{}/erc20/transfers", urlencoding::encode(address)),
            &[("chain", chain.id())],
        )?;
        let Some(body) = self.cached_get("token_transfers", &request, url, true).await? else {
            return Ok(None);
        };
        let page: Page<TokenTransfer> = decode("token_transfers", body)?;
        let rows = tokens::transfers_from_evm(&page.result);
        info!(count = rows.len(), "token_transfers");
        Ok(Some(rows))
    }

    pub async fn net_worth(
        &self,
        address: &str,
        chain: Chain,
        options: NetWorthOptions,
    ) -> Result<Option<Vec<NetWorthRow>>, FetchError> {
        require_evm("net worth", chain)?;
        let request = json!({
            "address": address,
            "chain": chain.id(),
            "exclude_spam": options.exclude_spam,
            "exclude_unverified_contracts": options.exclude_unverified_contracts,
        });
        let url = self.evm_url(
            &format!("/wallets/{}/net-worth", urlencoding::encode(address)),
            &[
                ("chain", chain.id()),
                ("exclude_spam", bool_str(options.exclude_spam)),
                (
                    "exclude_unverified_contracts",
                    bool_str(options.exclude_unverified_contracts),
                ),
            ],
        )?;
        let Some(body) = self.cached_get("net_worth", &request, url, true).await? else {
            return Ok(None);
        };
        let decoded: NetWorthResponse = decode("net_worth", body)?;
        Ok(Some(worth::from_response(&decoded)))
    }

    pub async fn pnl_summary(
        &self,
        address: &str,
        chain: Chain,
    ) -> Result<Option<Vec<PnlRow>>, FetchError> {
        require_evm("profitability summary", chain)?;
        let request = json!({ "address": address, "chain": chain.id() });
        let url = self.evm_url(
            &format!(
                "/wallets/{}/profitability/summary",
                urlencoding::encode(address)
            ),
            &[("chain", chain.id())],
        )?;
        let Some(body) = self.cached_get("pnl_summary", &request, url, true).await? else {
            return Ok(None);
        };
        let decoded: PnlSummary = decode("pnl_summary", body)?;
        Ok(Some(worth::summary_rows(&decoded)))
    }

    pub async fn pnl_breakdown(
        &self,
        address: &str,
        chain: Chain,
    ) -> Result<Option<Vec<PnlTokenGroup>>, FetchError> {
        require_evm("profitability breakdown", chain)?;
        let request = json!({ "address": address, "chain": chain.id() });
        let url = self.evm_url(
            &format!("/wallets/{}/profitability", urlencoding::encode(address)),
            &[("chain", chain.id())],
        )?;
        let Some(body) = self.cached_get("pnl_breakdown", &request, url, true).await? else {
            return Ok(None);
        };
        let page: Page<PnlTokenBreakdown> = decode("pnl_breakdown", body)?;
        let groups = worth::breakdown_groups(&page.result);
        info!(count = groups.len(), "pnl_breakdown");
        Ok(Some(groups))
    }

    async fn cached_get(
        &self,
        operation: &'static str,
        request: &Value,
        url: Url,
        with_key: bool,
    ) -> Result<Option<Value>, FetchError> {
        let key = CacheKey::new(operation, request);
        self.cache
            .get_or_fetch(&key, || self.fetch_json(url, with_key))
            .await
    }

    /// One upstream GET with retry/backoff. 404 means the upstream has no
    /// data for this query; that is a cacheable absence, not a failure.
    async fn fetch_json(&self, url: Url, with_key: bool) -> Result<Option<Value>, FetchError> {
        self.rate_limit().await;
        let mut last_err = None;
        for attempt in 0..=self.config.max_retries {
            let mut req = self.client.get(url.clone());
            if with_key {
                req = req.header("X-API-Key", &self.api_key);
            }
            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    let body = response.text().await.unwrap_or_default();
                    if !status.is_success() {
                        last_err = Some(FetchError::Api(status.as_u16(), body));
                        if attempt < self.config.max_retries {
                            let ms = self.config.retry_backoff_ms * (1 << attempt);
                            tokio::time::sleep(Duration::from_millis(ms)).await;
                        }
                        continue;
                    }
                    self.request_count.fetch_add(1, Ordering::Relaxed);
                    let value = serde_json::from_str(&body)
                        .map_err(|e| FetchError::Decode("response body", e.to_string()))?;
                    return Ok(Some(value));
                }
                Err(e) => {
                    last_err = Some(FetchError::Request(e));
                    if attempt < self.config.max_retries {
                        let ms = self.config.retry_backoff_ms * (1 << attempt);
                        warn!(attempt, ms, "retry after request error");
                        tokio::time::sleep(Duration::from_millis(ms)).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or(FetchError::Api(0, "unknown".to_string())))
    }

    async fn rate_limit(&self) {
        let sleep_ms = {
            let last = self.last_request.lock().unwrap();
            let prev = *last;
            drop(last);
            match prev {
                Some(prev) => {
                    let elapsed = prev.elapsed().as_millis();
                    let need = u128::from(self.config.rate_limit_ms);
                    need.saturating_sub(elapsed) as u64
                }
                None => 0,
            }
        };
        if sleep_ms > 0 {
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
        }
        *self.last_request.lock().unwrap() = Some(Instant::now());
    }

    fn evm_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!(
            "{}{}",
            self.config.evm_base_url.trim_end_matches('/'),
            path
        ))?;
        for (key, value) in params {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    fn gateway_url(&self, base: &str, path: &str) -> Result<Url, FetchError> {
        Ok(Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?)
    }
}

fn require_evm(operation: &'static str, chain: Chain) -> Result<(), FetchError> {
    match chain.family() {
        ChainFamily::Evm => Ok(()),
        _ => Err(FetchError::Unsupported { operation, chain }),
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: Value) -> Result<T, FetchError> {
    serde_json::from_value(body).map_err(|e| FetchError::Decode(operation, e.to_string()))
}
