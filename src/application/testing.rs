// In-memory host used by application tests
use crate::application::host_repository::HostRepository;
use crate::domain::entity::{EntityState, HistoryRecord};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

type HistoryRequest = (String, DateTime<Utc>, DateTime<Utc>, bool);

#[derive(Default)]
pub struct FakeHost {
    histories: Mutex<VecDeque<anyhow::Result<Vec<HistoryRecord>>>>,
    held_history: Mutex<Option<oneshot::Receiver<()>>>,
    history_requests: Mutex<Vec<HistoryRequest>>,
    states: Mutex<HashMap<String, EntityState>>,
    states_unreachable: Mutex<bool>,
    service_calls: Mutex<Vec<(String, String, Value)>>,
}

impl FakeHost {
    /// Queue the response for the next history request
    pub fn push_history(&self, response: anyhow::Result<Vec<HistoryRecord>>) {
        self.histories.lock().unwrap().push_back(response);
    }

    /// Make the next history request wait until the returned sender fires
    pub fn hold_next_history(&self) -> oneshot::Sender<()> {
        let (release, held) = oneshot::channel();
        *self.held_history.lock().unwrap() = Some(held);
        release
    }

    pub fn set_state(&self, entity: EntityState) {
        self.states
            .lock()
            .unwrap()
            .insert(entity.entity_id.clone(), entity);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        *self.states_unreachable.lock().unwrap() = unreachable;
    }

    pub fn history_requests(&self) -> Vec<HistoryRequest> {
        self.history_requests.lock().unwrap().clone()
    }

    pub fn service_calls(&self) -> Vec<(String, String, Value)> {
        self.service_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostRepository for FakeHost {
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        with_attributes: bool,
    ) -> anyhow::Result<Vec<HistoryRecord>> {
        self.history_requests.lock().unwrap().push((
            entity_id.to_string(),
            start,
            end,
            with_attributes,
        ));
        let response = self
            .histories
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        let held = self.held_history.lock().unwrap().take();
        if let Some(held) = held {
            let _ = held.await;
        }
        response
    }

    async fn get_state(&self, entity_id: &str) -> anyhow::Result<Option<EntityState>> {
        if *self.states_unreachable.lock().unwrap() {
            anyhow::bail!("host unreachable");
        }
        Ok(self.states.lock().unwrap().get(entity_id).cloned())
    }

    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        payload: Value,
    ) -> anyhow::Result<()> {
        self.service_calls
            .lock()
            .unwrap()
            .push((domain.to_string(), service.to_string(), payload));
        Ok(())
    }
}

/// State-only history records one minute apart
pub fn history(states: &[&str]) -> Vec<HistoryRecord> {
    let base: DateTime<Utc> = "2026-10-19T08:00:00Z".parse().unwrap();
    states
        .iter()
        .enumerate()
        .map(|(i, state)| HistoryRecord {
            state: state.to_string(),
            attributes: Default::default(),
            last_changed: base + Duration::minutes(i as i64),
            last_updated: None,
        })
        .collect()
}

pub fn climate_entity(entity_id: &str, attributes: Value, last_updated: &str) -> EntityState {
    serde_json::from_value(serde_json::json!({
        "entity_id": entity_id,
        "state": "heat",
        "attributes": attributes,
        "last_changed": "2026-10-19T08:00:00Z",
        "last_updated": last_updated
    }))
    .unwrap()
}
