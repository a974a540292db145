// Card service - Use cases behind a climate tile
use crate::application::graph_pipeline::{GraphPipeline, SnapshotReceiver, UpdateOutcome};
use crate::application::history_fetcher::HistoryFetcher;
use crate::application::host_repository::HostRepository;
use crate::domain::card::{CardSummary, CardView, GraphSnapshot};
use crate::domain::climate::ClimateState;
use crate::domain::graph_style::GraphStyle;
use crate::domain::telemetry::HistorySource;
use crate::infrastructure::config::CardConfig;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

const CLIMATE_DOMAIN: &str = "climate";

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("no card with id {0}")]
    NotFound(String),
    #[error("entity {0} is not known to the host")]
    UnknownEntity(String),
    #[error("{entity} does not support {kind} mode {mode:?}")]
    UnsupportedMode {
        entity: String,
        kind: &'static str,
        mode: String,
    },
    #[error("{0} has no target temperature to adjust")]
    NoTarget(String),
    #[error("graph is disabled for card {0}")]
    GraphDisabled(String),
    #[error("host request failed: {0:#}")]
    Host(#[from] anyhow::Error),
}

struct Card {
    config: CardConfig,
    source: HistorySource,
    pipeline: GraphPipeline,
}

/// Target of the state watcher: a card whose graph follows an entity.
#[derive(Debug, Clone)]
pub struct WatchedCard {
    pub id: String,
    pub entity_id: String,
    pub poll_interval_secs: u64,
}

#[derive(Clone)]
pub struct CardService {
    repository: Arc<dyn HostRepository>,
    fetcher: HistoryFetcher,
    cards: Arc<Vec<Card>>,
}

impl CardService {
    pub fn new(repository: Arc<dyn HostRepository>, configs: Vec<CardConfig>) -> Self {
        let cards = configs
            .into_iter()
            .map(|config| {
                let style = config.graph.resolve();
                tracing::debug!("Card {} resolved graph style {:?}", config.id, style);
                Card {
                    source: config.history_source(),
                    pipeline: GraphPipeline::new(style),
                    config,
                }
            })
            .collect();

        Self {
            fetcher: HistoryFetcher::new(repository.clone()),
            repository,
            cards: Arc::new(cards),
        }
    }

    fn card(&self, id: &str) -> Result<&Card, CardError> {
        self.cards
            .iter()
            .find(|c| c.config.id == id)
            .ok_or_else(|| CardError::NotFound(id.to_string()))
    }

    fn graph_card(&self, id: &str) -> Result<&Card, CardError> {
        let card = self.card(id)?;
        if !card.config.show_graph {
            return Err(CardError::GraphDisabled(id.to_string()));
        }
        Ok(card)
    }

    pub fn list_cards(&self) -> Vec<CardSummary> {
        self.cards
            .iter()
            .map(|c| CardSummary {
                id: c.config.id.clone(),
                title: c.config.title(),
            })
            .collect()
    }

    pub fn watched_cards(&self) -> Vec<WatchedCard> {
        self.cards
            .iter()
            .filter(|c| c.config.show_graph)
            .map(|c| WatchedCard {
                id: c.config.id.clone(),
                entity_id: c.source.entity_id.clone(),
                poll_interval_secs: c.config.poll_interval_secs(),
            })
            .collect()
    }

    /// Tile contents. An unreachable host leaves the climate block empty but
    /// still returns whatever graph is on display.
    pub async fn card_view(&self, id: &str) -> Result<CardView, CardError> {
        let card = self.card(id)?;

        let climate = match self.repository.get_state(&card.config.entity).await {
            Ok(Some(entity)) => Some(ClimateState::from_entity(&entity)),
            Ok(None) => {
                tracing::warn!("Entity {} not found on host", card.config.entity);
                None
            }
            Err(e) => {
                tracing::warn!("Error reading {}: {:#}", card.config.entity, e);
                None
            }
        };

        let graph = card
            .config
            .show_graph
            .then(|| card.pipeline.current())
            .flatten();

        Ok(CardView::new(
            card.config.id.clone(),
            card.config.title(),
            climate,
            graph,
        ))
    }

    /// Re-fetch history and redraw; called whenever the entity changed
    pub async fn refresh(&self, id: &str, now: DateTime<Utc>) -> Result<UpdateOutcome, CardError> {
        let card = self.graph_card(id)?;
        Ok(card.pipeline.refresh(&self.fetcher, &card.source, now).await)
    }

    pub fn graph(&self, id: &str) -> Result<(Option<Arc<GraphSnapshot>>, GraphStyle), CardError> {
        let card = self.graph_card(id)?;
        Ok((card.pipeline.current(), card.pipeline.style().clone()))
    }

    pub fn subscribe(&self, id: &str) -> Result<SnapshotReceiver, CardError> {
        Ok(self.graph_card(id)?.pipeline.subscribe())
    }

    async fn climate(&self, card: &Card) -> Result<ClimateState, CardError> {
        let entity = self
            .repository
            .get_state(&card.config.entity)
            .await?
            .ok_or_else(|| CardError::UnknownEntity(card.config.entity.clone()))?;
        Ok(ClimateState::from_entity(&entity))
    }

    /// Send a new setpoint, snapped to the entity's limits. Returns the value sent.
    pub async fn set_temperature(&self, id: &str, requested: f64) -> Result<f64, CardError> {
        let card = self.card(id)?;
        let climate = self.climate(card).await?;
        let temperature = climate.clamp_setpoint(requested);
        self.dispatch_temperature(&climate, temperature).await?;
        Ok(temperature)
    }

    /// Move the setpoint by whole steps
    pub async fn adjust_temperature(&self, id: &str, steps: i32) -> Result<f64, CardError> {
        let card = self.card(id)?;
        let climate = self.climate(card).await?;
        let temperature = climate
            .adjusted_setpoint(steps)
            .ok_or_else(|| CardError::NoTarget(climate.entity_id.clone()))?;
        self.dispatch_temperature(&climate, temperature).await?;
        Ok(temperature)
    }

    async fn dispatch_temperature(
        &self,
        climate: &ClimateState,
        temperature: f64,
    ) -> Result<(), CardError> {
        tracing::info!("Setting {} to {}", climate.entity_id, temperature);
        self.repository
            .call_service(
                CLIMATE_DOMAIN,
                "set_temperature",
                json!({ "entity_id": climate.entity_id, "temperature": temperature }),
            )
            .await?;
        Ok(())
    }

    pub async fn set_hvac_mode(&self, id: &str, mode: &str) -> Result<(), CardError> {
        let card = self.card(id)?;
        let climate = self.climate(card).await?;
        if !climate.supports_hvac_mode(mode) {
            return Err(CardError::UnsupportedMode {
                entity: climate.entity_id,
                kind: "hvac",
                mode: mode.to_string(),
            });
        }

        tracing::info!("Setting {} hvac mode to {}", climate.entity_id, mode);
        self.repository
            .call_service(
                CLIMATE_DOMAIN,
                "set_hvac_mode",
                json!({ "entity_id": climate.entity_id, "hvac_mode": mode }),
            )
            .await?;
        Ok(())
    }

    pub async fn set_fan_mode(&self, id: &str, mode: &str) -> Result<(), CardError> {
        let card = self.card(id)?;
        let climate = self.climate(card).await?;
        if !climate.supports_fan_mode(mode) {
            return Err(CardError::UnsupportedMode {
                entity: climate.entity_id,
                kind: "fan",
                mode: mode.to_string(),
            });
        }

        tracing::info!("Setting {} fan mode to {}", climate.entity_id, mode);
        self.repository
            .call_service(
                CLIMATE_DOMAIN,
                "set_fan_mode",
                json!({ "entity_id": climate.entity_id, "fan_mode": mode }),
            )
            .await?;
        Ok(())
    }
}
