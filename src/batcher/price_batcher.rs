use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::future::{self, try_join_all, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::query::build_price_query;
use crate::error::PriceError;
use crate::models::{PriceMap, ProductsResponse};
use crate::traits::graphql_transport::GraphqlTransport;
use crate::traits::price_provider::PriceProvider;
use crate::utils::helper::dedupe_skus;

type FetchResult = Result<Arc<PriceMap>, PriceError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Settings for [`PriceRequestBatcher`]
#[derive(Debug, Clone, Default)]
pub struct BatcherConfig {
    /// Start in the suspended state so that lookups issued during start-up
    /// are collected into one batch
    pub start_suspended: bool,
}

impl BatcherConfig {
    /// Read `PRICE_BATCHER_START_SUSPENDED` (defaults to `false`)
    pub fn from_env() -> anyhow::Result<Self> {
        let start_suspended = match std::env::var("PRICE_BATCHER_START_SUSPENDED") {
            Ok(raw) => parse_flag(&raw)?,
            Err(_) => false,
        };
        Ok(Self { start_suspended })
    }
}

/// Parse a boolean environment flag
pub fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid boolean flag {}", other)),
    }
}

/// A lookup captured while suspended
struct PriceRequest {
    skus: Vec<String>,
    include_variants: bool,
    responder: oneshot::Sender<Result<PriceMap, PriceError>>,
}

/// Lookups collected since the last flush
#[derive(Default)]
struct PendingBatch {
    requests: Vec<PriceRequest>,
}

impl PendingBatch {
    fn len(&self) -> usize {
        self.requests.len()
    }

    fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// De-duplicated union of every request's SKUs
    fn skus(&self) -> Vec<String> {
        let all: Vec<&str> = self
            .requests
            .iter()
            .flat_map(|r| r.skus.iter().map(String::as_str))
            .collect();
        dedupe_skus(&all)
    }

    fn include_variants(&self) -> bool {
        self.requests.iter().any(|r| r.include_variants)
    }

    /// Hand every request its share of the result, exactly once
    fn settle(self, result: &FetchResult) {
        for request in self.requests {
            let outcome = match result {
                Ok(prices) => Ok(restrict(&[prices.clone()], &request.skus)),
                Err(e) => Err(e.clone()),
            };
            if request.responder.send(outcome).is_err() {
                debug!("Price request receiver dropped before settlement");
            }
        }
    }
}

/// A variant-inclusive fetch covering some SKUs
#[derive(Clone)]
struct KnownFetch {
    id: u64,
    fetch: SharedFetch,
}

struct BatcherState {
    suspended: bool,
    pending: PendingBatch,
}

/// Pending lookup returned by [`PriceRequestBatcher::request_prices`]
pub type PriceLookup = BoxFuture<'static, Result<PriceMap, PriceError>>;

/// Coalesces price lookups from independent callers into as few GraphQL
/// requests as possible.
///
/// While suspended, lookups are queued and flushed as one request by
/// [`resume`](Self::resume). While active, each lookup goes out on its own
/// unless every SKU is already covered by a variant-inclusive fetch, in
/// which case that fetch's result is reused.
///
/// Network work is spawned on the runtime captured at construction, so
/// `suspend`/`resume` may be called from any thread.
pub struct PriceRequestBatcher {
    transport: Arc<dyn GraphqlTransport>,
    runtime: Handle,
    state: Mutex<BatcherState>,
    known_prices: Arc<DashMap<String, KnownFetch>>,
    next_fetch_id: AtomicU64,
}

impl PriceRequestBatcher {
    /// Create a new batcher on top of a transport, bound to the current
    /// tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime; use
    /// [`with_runtime`](Self::with_runtime) there.
    pub fn new(transport: Arc<dyn GraphqlTransport>, config: BatcherConfig) -> Self {
        Self::with_runtime(transport, config, Handle::current())
    }

    /// Create a new batcher that spawns its requests on `runtime`
    pub fn with_runtime(
        transport: Arc<dyn GraphqlTransport>,
        config: BatcherConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            transport,
            runtime,
            state: Mutex::new(BatcherState {
                suspended: config.start_suspended,
                pending: PendingBatch::default(),
            }),
            known_prices: Arc::new(DashMap::new()),
            next_fetch_id: AtomicU64::new(1),
        }
    }

    /// Start collecting lookups instead of sending them. Idempotent.
    pub fn suspend(&self) {
        let mut state = self.state.lock();
        if !state.suspended {
            debug!("Price batcher suspended");
        }
        state.suspended = true;
    }

    /// Go active and flush everything collected while suspended as a single
    /// request.
    pub fn resume(&self) {
        // Swap before dispatch: later lookups must not join this batch.
        let batch = {
            let mut state = self.state.lock();
            state.suspended = false;
            std::mem::take(&mut state.pending)
        };

        if batch.is_empty() {
            debug!("Price batcher resumed with nothing pending");
            return;
        }

        let skus = batch.skus();
        let include_variants = batch.include_variants();
        info!(
            "Flushing price batch: {} requests, {} SKUs (variants: {})",
            batch.len(),
            skus.len(),
            include_variants
        );

        let fetch = self.start_fetch(skus, include_variants);
        self.runtime.spawn(async move {
            let result = fetch.await;
            batch.settle(&result);
        });
    }

    pub fn is_suspended(&self) -> bool {
        self.state.lock().suspended
    }

    /// Look up prices for `skus`.
    ///
    /// Resolves to a map holding only the requested SKUs that the backend
    /// returned. An empty SKU list resolves immediately without any request.
    pub async fn get_prices(
        &self,
        skus: &[String],
        include_variants: bool,
    ) -> Result<PriceMap, PriceError> {
        self.request_prices(skus, include_variants).await
    }

    /// Register a lookup right away and return a future for its result.
    ///
    /// The lookup is queued (or dispatched) before this returns, so a caller
    /// can register many lookups and then [`resume`](Self::resume) once. The
    /// returned future does not borrow the batcher; if the batcher is dropped
    /// before a queued lookup is flushed, it resolves to
    /// [`PriceError::Dropped`].
    pub fn request_prices(&self, skus: &[String], include_variants: bool) -> PriceLookup {
        let skus = dedupe_skus(skus);
        if skus.is_empty() {
            return future::ready(Ok(PriceMap::new())).boxed();
        }

        {
            let mut state = self.state.lock();
            if state.suspended {
                let (responder, receiver) = oneshot::channel();
                state.pending.requests.push(PriceRequest {
                    skus: skus.clone(),
                    include_variants,
                    responder,
                });
                debug!(
                    "Queued price lookup for {} SKUs ({} pending)",
                    skus.len(),
                    state.pending.len()
                );
                return receiver
                    .map(|settled| settled.unwrap_or(Err(PriceError::Dropped)))
                    .boxed();
            }
        }

        let fetches = match self.covering_fetches(&skus) {
            Some(fetches) => {
                debug!(
                    "Reusing {} variant fetch(es) for {} SKUs",
                    fetches.len(),
                    skus.len()
                );
                fetches
            }
            None => vec![self.start_fetch(skus.clone(), include_variants)],
        };

        async move {
            let results = try_join_all(fetches).await?;
            Ok(restrict(&results, &skus))
        }
        .boxed()
    }

    /// Variant-inclusive fetches that together cover every SKU, if any
    fn covering_fetches(&self, skus: &[String]) -> Option<Vec<SharedFetch>> {
        let mut seen = HashSet::new();
        let mut fetches = Vec::new();

        for sku in skus {
            let known = self.known_prices.get(sku)?;
            if seen.insert(known.id) {
                fetches.push(known.fetch.clone());
            }
        }

        Some(fetches)
    }

    /// Issue one query. The request runs to completion even if every caller
    /// stops waiting for it.
    fn start_fetch(&self, skus: Vec<String>, include_variants: bool) -> SharedFetch {
        let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let transport = Arc::clone(&self.transport);
        let known_prices = Arc::clone(&self.known_prices);
        let query = build_price_query(&skus, include_variants);

        debug!(
            "Dispatching price query #{} for {} SKUs (variants: {})",
            id,
            skus.len(),
            include_variants
        );

        let fetch = async move {
            let result = fetch_prices(transport.as_ref(), &query).await;
            if let Err(e) = &result {
                warn!("Price query #{} failed: {}", id, e);
                known_prices.retain(|_, known| known.id != id);
            }
            result.map(Arc::new)
        }
        .boxed()
        .shared();

        if include_variants {
            for sku in &skus {
                self.known_prices.insert(
                    sku.clone(),
                    KnownFetch {
                        id,
                        fetch: fetch.clone(),
                    },
                );
            }
        }

        self.runtime.spawn(fetch.clone().map(|_| ()));
        fetch
    }
}

#[async_trait]
impl PriceProvider for PriceRequestBatcher {
    async fn get_prices(
        &self,
        skus: &[String],
        include_variants: bool,
    ) -> Result<PriceMap, PriceError> {
        PriceRequestBatcher::get_prices(self, skus, include_variants).await
    }
}

async fn fetch_prices(transport: &dyn GraphqlTransport, query: &str) -> Result<PriceMap, PriceError> {
    let body = transport.run_query(query).await?;
    Ok(ProductsResponse::from_value(body)?.into_price_map())
}

/// Pick the requested SKUs out of one or more fetched maps
fn restrict(results: &[Arc<PriceMap>], skus: &[String]) -> PriceMap {
    skus.iter()
        .filter_map(|sku| {
            results
                .iter()
                .find_map(|prices| prices.get(sku))
                .map(|price| (sku.clone(), price.clone()))
        })
        .collect()
}
