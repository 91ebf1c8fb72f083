use crate::domain::errors::MarketDataError;
use crate::domain::market::{ContractType, Instrument, InstrumentState};
use crate::domain::ports::MarketDataService;
use std::collections::HashMap;
use tracing::{debug, info};

/// An instrument admitted to the scan universe, with the volume it was ranked by
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseMember {
    pub instrument: Instrument,
    pub volume_24h: f64,
}

/// Narrows the venue catalog to the most liquid live perpetuals in one settlement currency.
#[derive(Debug, Clone)]
pub struct UniverseSelector {
    settlement_asset: String,
}

impl UniverseSelector {
    pub const MAX_TOP_N: usize = 50;

    pub fn new(settlement_asset: impl Into<String>) -> Self {
        Self {
            settlement_asset: settlement_asset.into(),
        }
    }

    pub fn settlement_asset(&self) -> &str {
        &self.settlement_asset
    }

    pub fn is_eligible(&self, instrument: &Instrument) -> bool {
        instrument.contract_type == ContractType::PerpetualFutures
            && instrument.state == InstrumentState::Live
            && instrument
                .quote_asset
                .eq_ignore_ascii_case(&self.settlement_asset)
    }

    /// Top `top_n` eligible instruments by descending 24h volume.
    ///
    /// Symbols absent from `volumes` rank as zero volume. Equal volumes keep
    /// catalog order.
    pub fn select(
        &self,
        catalog: Vec<Instrument>,
        volumes: &HashMap<String, f64>,
        top_n: usize,
    ) -> Vec<UniverseMember> {
        let catalog_size = catalog.len();

        let mut members: Vec<UniverseMember> = catalog
            .into_iter()
            .filter(|i| self.is_eligible(i))
            .map(|instrument| {
                let volume_24h = volumes
                    .get(&instrument.symbol)
                    .copied()
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0);
                UniverseMember {
                    instrument,
                    volume_24h,
                }
            })
            .collect();

        let eligible = members.len();

        // sort_by is stable, so ties stay in catalog order
        members.sort_by(|a, b| b.volume_24h.total_cmp(&a.volume_24h));
        members.truncate(top_n);

        debug!(
            "UniverseSelector: {} of {} catalog entries eligible ({} perps), kept {}",
            eligible,
            catalog_size,
            self.settlement_asset,
            members.len()
        );

        members
    }

    /// Fetches catalog and tickers, then applies [`Self::select`].
    ///
    /// Either request failing fails the whole load; nothing is retried.
    pub async fn load(
        &self,
        service: &dyn MarketDataService,
        top_n: usize,
    ) -> Result<Vec<UniverseMember>, MarketDataError> {
        let catalog = service.get_products().await?;
        let volumes = service.get_volumes().await?;

        let members = self.select(catalog, &volumes, top_n);
        info!(
            "UniverseSelector: Selected {} instruments (top {} by 24h volume)",
            members.len(),
            top_n
        );
        Ok(members)
    }
}

impl Default for UniverseSelector {
    fn default() -> Self {
        Self::new("USDT")
    }
}
