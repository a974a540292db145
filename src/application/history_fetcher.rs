// History fetcher - Raw samples for a source over a lookback window
use crate::application::host_repository::HostRepository;
use crate::domain::telemetry::{HistorySource, RawSample};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct HistoryFetcher {
    repository: Arc<dyn HostRepository>,
}

impl HistoryFetcher {
    pub fn new(repository: Arc<dyn HostRepository>) -> Self {
        Self { repository }
    }

    /// Samples in `[now - hours, now]`. Failures and unknown sources come
    /// back as an empty vector; unparsable readings are dropped.
    pub async fn fetch(
        &self,
        source: &HistorySource,
        lookback_hours: u32,
        now: DateTime<Utc>,
    ) -> Vec<RawSample> {
        let start = now - Duration::hours(i64::from(lookback_hours.max(1)));
        let attribute = source.attribute.as_deref();

        let records = match self
            .repository
            .fetch_history(&source.entity_id, start, now, attribute.is_some())
            .await
        {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("History fetch for {} failed: {:#}", source.entity_id, e);
                return Vec::new();
            }
        };

        let total = records.len();
        let samples: Vec<RawSample> = records
            .iter()
            .filter_map(|r| {
                r.reading(attribute)
                    .map(|v| RawSample::new(r.timestamp(attribute), v))
            })
            .collect();

        tracing::debug!(
            "Fetched {} of {} history records for {} as samples",
            samples.len(),
            total,
            source.entity_id
        );

        samples
    }
}
