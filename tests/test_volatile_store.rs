//! Integration tests for key derivation, TTL expiry and invalidation of the
//! in-memory request classes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use swap_cache::cache::{ManualClock, MemoryMedium};
use swap_cache::domain::{Amount, TokenAddress};
use swap_cache::error::FetchResult;
use swap_cache::sources::PriceSource;
use swap_cache::{
    CacheContext, Config, KeyBuilder, QuoteRequest, TokenPrice, TokenPriceService,
    TokenPriceServiceImpl, VolatileStore,
};

fn token(byte: char) -> TokenAddress {
    TokenAddress::new(format!("0x{}", byte.to_string().repeat(40))).unwrap()
}

/// Subgraph stand-in pricing every token at 1.5 USD.
#[derive(Default)]
struct CountingSubgraph {
    calls: AtomicUsize,
}

#[async_trait]
impl PriceSource for CountingSubgraph {
    async fn fetch_price(&self, token: &TokenAddress) -> FetchResult<TokenPrice> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TokenPrice {
            token: token.clone(),
            usd: 1.5,
        })
    }
}

#[test]
fn test_equivalent_requests_share_a_key() {
    let mixed = TokenAddress::new(format!("0x{}", "Ab".repeat(20))).unwrap();
    let lower = TokenAddress::new(format!("0x{}", "ab".repeat(20))).unwrap();

    let a = QuoteRequest::exact_in(mixed, token('c'), Amount::new("0100").unwrap());
    let b = QuoteRequest::exact_in(lower, token('c'), Amount::new("100").unwrap());
    assert_eq!(a.cache_key(), b.cache_key());

    let c = b.clone().with_tick_spacing(60);
    assert_ne!(b.cache_key(), c.cache_key());
}

#[test]
fn test_key_builder_fields() {
    let key = KeyBuilder::new("Pool")
        .address(&token('a'))
        .number(3000u32)
        .flag(false)
        .optional("hook", None::<u32>)
        .build();

    assert_eq!(
        key.as_str(),
        format!("pool:{}:3000:false", token('a')).as_str()
    );
}

#[test]
fn test_entry_expires_exactly_at_ttl() {
    let clock = ManualClock::default();
    let store: VolatileStore<u32> = VolatileStore::with_clock(16, Arc::new(clock.clone()));
    let ttl = Duration::from_millis(3000);

    store.set("quote:x", 7);
    clock.advance(Duration::from_millis(2999));
    assert_eq!(store.get("quote:x", ttl).map(|e| e.value), Some(7));

    clock.advance(Duration::from_millis(1));
    assert!(store.get("quote:x", ttl).is_none());
}

#[test]
fn test_prefix_invalidation_leaves_other_pairs() {
    let clock = ManualClock::default();
    let store: VolatileStore<u32> = VolatileStore::with_clock(16, Arc::new(clock));

    let ab = QuoteRequest::exact_in(token('a'), token('b'), Amount::new("1").unwrap());
    let ab_fee = ab.clone().with_fee_tier(500);
    let ac = QuoteRequest::exact_in(token('a'), token('c'), Amount::new("1").unwrap());

    store.set(ab.cache_key().into_inner(), 1);
    store.set(ab_fee.cache_key().into_inner(), 2);
    store.set(ac.cache_key().into_inner(), 3);

    let removed = store.invalidate_by_prefix(&QuoteRequest::pair_prefix(&token('a'), &token('b')));
    assert_eq!(removed, 2);
    assert_eq!(store.len(), 1);
    assert!(store
        .get(ac.cache_key().as_str(), Duration::from_secs(60))
        .is_some());
}

#[test]
fn test_capacity_bound_evicts_least_recent() {
    let config = Config {
        volatile_max_entries: 2,
        ..Config::default()
    };
    let ctx = CacheContext::in_memory(&config);
    let ttl = ctx.ttl.price;

    let price = |byte| TokenPrice {
        token: token(byte),
        usd: 1.0,
    };
    ctx.prices.set(TokenPrice::cache_key(&token('a')).into_inner(), price('a'));
    ctx.prices.set(TokenPrice::cache_key(&token('b')).into_inner(), price('b'));

    // Touch 'a' so 'b' becomes the eviction candidate
    assert!(ctx
        .prices
        .get(TokenPrice::cache_key(&token('a')).as_str(), ttl)
        .is_some());
    ctx.prices.set(TokenPrice::cache_key(&token('c')).into_inner(), price('c'));

    assert_eq!(ctx.prices.len(), 2);
    assert!(ctx
        .prices
        .get(TokenPrice::cache_key(&token('b')).as_str(), ttl)
        .is_none());
}

#[tokio::test]
async fn test_prices_are_cached_until_chain_state_changes() {
    let clock = ManualClock::default();
    let ctx = CacheContext::new(
        &Config::default(),
        Arc::new(MemoryMedium::new()),
        Arc::new(clock.clone()),
    );
    let subgraph = Arc::new(CountingSubgraph::default());
    let service = TokenPriceServiceImpl::new(&ctx, subgraph.clone());

    let tokens = [token('a'), token('b'), token('a')];
    let prices = service.get_prices(&tokens).await;
    assert!(prices.iter().all(|p| p.as_ref().unwrap().usd == 1.5));
    assert_eq!(subgraph.calls.load(Ordering::SeqCst), 2);

    clock.advance(Duration::from_secs(10));
    service.get_price(&token('a')).await.unwrap();
    assert_eq!(subgraph.calls.load(Ordering::SeqCst), 2);

    ctx.on_chain_state_changed();
    service.get_price(&token('a')).await.unwrap();
    assert_eq!(subgraph.calls.load(Ordering::SeqCst), 3);

    clock.advance(Duration::from_secs(30));
    service.get_price(&token('a')).await.unwrap();
    assert_eq!(subgraph.calls.load(Ordering::SeqCst), 4);
}
