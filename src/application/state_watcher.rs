// State watcher - Refreshes a card's graph whenever its entity changes
use crate::application::card_service::{CardService, WatchedCard};
use crate::application::graph_pipeline::UpdateOutcome;
use crate::application::host_repository::HostRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Clone)]
pub struct StateWatcher {
    repository: Arc<dyn HostRepository>,
    service: CardService,
}

impl StateWatcher {
    pub fn new(repository: Arc<dyn HostRepository>, service: CardService) -> Self {
        Self {
            repository,
            service,
        }
    }

    /// One polling task per graph card
    pub fn spawn(&self) -> Vec<JoinHandle<()>> {
        self.service
            .watched_cards()
            .into_iter()
            .map(|card| {
                let watcher = self.clone();
                tokio::spawn(async move { watcher.run(card).await })
            })
            .collect()
    }

    async fn run(&self, card: WatchedCard) {
        tracing::info!(
            "Watching {} for card {} every {}s",
            card.entity_id,
            card.id,
            card.poll_interval_secs
        );

        let mut interval = tokio::time::interval(Duration::from_secs(card.poll_interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_seen = None;

        loop {
            interval.tick().await;
            self.poll(&card, &mut last_seen).await;
        }
    }

    /// Refresh the graph if the entity was updated since `last_seen`.
    /// Returns whether a refresh ran. A refresh that produced no graph
    /// leaves `last_seen` alone so the next poll tries again.
    pub async fn poll(&self, card: &WatchedCard, last_seen: &mut Option<DateTime<Utc>>) -> bool {
        let updated = match self.repository.get_state(&card.entity_id).await {
            Ok(Some(entity)) => entity.last_updated,
            Ok(None) => {
                tracing::debug!("{} not known to host yet", card.entity_id);
                return false;
            }
            Err(e) => {
                tracing::warn!("Polling {} failed: {:#}", card.entity_id, e);
                return false;
            }
        };

        if *last_seen == Some(updated) {
            return false;
        }

        tracing::debug!("{} changed at {}, refreshing graph", card.entity_id, updated);
        let settled = match self.service.refresh(&card.id, Utc::now()).await {
            Ok(UpdateOutcome::Retained) => {
                tracing::debug!("No graph for card {} yet, retrying next poll", card.id);
                false
            }
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Refreshing card {} failed: {}", card.id, e);
                true
            }
        };
        if settled {
            *last_seen = Some(updated);
        }
        true
    }
}
