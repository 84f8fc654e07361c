use std::sync::Arc;

use anyhow::Context;
use futures_util::future::join_all;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use storefront_prices::batcher::price_batcher::parse_flag;
use storefront_prices::{BatcherConfig, HttpGraphqlTransport, PriceRequestBatcher};

/// SKUs from argv, falling back to the comma separated `PRICE_SKUS`
fn requested_skus() -> Vec<String> {
  let args: Vec<String> = std::env::args().skip(1).collect();
  if !args.is_empty() {
    return args;
  }

  std::env::var("PRICE_SKUS")
    .unwrap_or_default()
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}

fn main() -> storefront_prices::Result<()> {
  // Initialize logging
  tracing_subscriber::fmt()
    .with_level(true)
    .with_target(false)
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_file(true)
    .with_line_number(true)
    .init();

  dotenvy::dotenv().ok();

  let runtime = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()?;

  runtime.block_on(async {
    let transport = HttpGraphqlTransport::from_env()?;
    let config = BatcherConfig::from_env()?;
    let include_variants = match std::env::var("PRICE_INCLUDE_VARIANTS") {
      Ok(raw) => parse_flag(&raw).context("PRICE_INCLUDE_VARIANTS")?,
      Err(_) => false,
    };

    let skus = requested_skus();
    if skus.is_empty() {
      anyhow::bail!("No SKUs given; pass them as arguments or set PRICE_SKUS");
    }

    info!("GraphQL endpoint: {}", transport.config().endpoint);
    info!("Looking up {} SKUs (variants: {})", skus.len(), include_variants);

    let batcher = PriceRequestBatcher::new(Arc::new(transport), config);

    // One lookup per SKU; all are queued before resume, so they share one request
    batcher.suspend();
    let lookups: Vec<_> = skus
      .iter()
      .map(|sku| batcher.request_prices(std::slice::from_ref(sku), include_variants))
      .collect();
    batcher.resume();

    let results = join_all(lookups).await;

    info!("{}", "=".repeat(60));
    for (sku, result) in skus.iter().zip(results) {
      match result {
        Ok(prices) => match prices.get(sku) {
          Some(price) => {
            info!("{}: {}", sku, price.formatted());
            if price.discounted {
              info!(
                "   Discount: {:.2} ({:.0}%)",
                price.discount_amount, price.discount_percent
              );
            }
          }
          None => info!("{}: Price not available", sku),
        },
        Err(e) => error!("{}: {}", sku, e),
      }
    }
    info!("{}", "=".repeat(60));

    Ok(())
  })
}
