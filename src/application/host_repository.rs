// Repository trait for the home-automation host API
use crate::domain::entity::{EntityState, HistoryRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait HostRepository: Send + Sync {
    /// History of one entity between `start` and `end`, oldest first.
    /// An unknown entity yields an empty list, not an error.
    /// Attributes are only requested when `with_attributes` is set.
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        with_attributes: bool,
    ) -> anyhow::Result<Vec<HistoryRecord>>;

    /// Current state of an entity, `None` if the host does not know it
    async fn get_state(&self, entity_id: &str) -> anyhow::Result<Option<EntityState>>;

    /// Fire-and-forget service call, e.g. `climate.set_temperature`
    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        payload: serde_json::Value,
    ) -> anyhow::Result<()>;
}
