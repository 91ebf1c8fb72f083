//! Universe selection through the venue port

use squeezescan::application::agents::UniverseSelector;
use squeezescan::domain::market::{ContractType, Instrument, InstrumentState};
use squeezescan::infrastructure::{CachedMarketDataService, MockMarketDataService};
use std::sync::Arc;

fn venue() -> MockMarketDataService {
    let mut venue = MockMarketDataService::new();
    for i in 0..60 {
        venue = venue.with_instrument(
            Instrument::live_perpetual(format!("C{:02}USDT", i), "USDT"),
            i as f64,
        );
    }
    venue
        .with_instrument(
            Instrument::new(
                "DEADUSDT",
                ContractType::PerpetualFutures,
                InstrumentState::Expired,
                "USDT",
            ),
            1e12,
        )
        .with_instrument(Instrument::live_perpetual("BTCUSD", "USD"), 1e12)
        .with_unquoted_instrument(Instrument::live_perpetual("NEWUSDT", "usdt"))
}

#[tokio::test]
async fn test_load_caps_at_top_n_and_filters() {
    let selector = UniverseSelector::default();
    let members = selector.load(&venue(), 50).await.unwrap();

    assert_eq!(members.len(), 50);
    assert_eq!(members[0].instrument.symbol, "C59USDT");
    assert_eq!(members[49].instrument.symbol, "C10USDT");
    assert!(
        members
            .iter()
            .all(|m| m.instrument.symbol != "DEADUSDT" && m.instrument.symbol != "BTCUSD")
    );
}

#[tokio::test]
async fn test_missing_volume_ranks_last() {
    let selector = UniverseSelector::default();
    let members = selector.load(&venue(), 50).await.unwrap();
    assert!(members.iter().all(|m| m.instrument.symbol != "NEWUSDT"));

    let small = MockMarketDataService::new()
        .with_unquoted_instrument(Instrument::live_perpetual("NEWUSDT", "usdt"))
        .with_instrument(Instrument::live_perpetual("OLDUSDT", "USDT"), 3.0);
    let members = selector.load(&small, 5).await.unwrap();

    let symbols: Vec<&str> = members.iter().map(|m| m.instrument.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["OLDUSDT", "NEWUSDT"]);
    assert_eq!(members[1].volume_24h, 0.0);
}

#[tokio::test]
async fn test_cached_venue_serves_repeat_loads() {
    let inner = Arc::new(venue());
    let cached = CachedMarketDataService::with_default_ttl(inner.clone());
    let selector = UniverseSelector::default();

    let first = selector.load(&cached, 20).await.unwrap();
    let second = selector.load(&cached, 20).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(inner.catalog_calls(), 1);
}
