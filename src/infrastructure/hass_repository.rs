// Home Assistant REST repository implementation
use crate::application::host_repository::HostRepository;
use crate::domain::entity::{EntityState, HistoryRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Response, StatusCode, header};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HassRepository {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl HassRepository {
    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn history_url(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        with_attributes: bool,
    ) -> String {
        let mut url = format!(
            "{}/api/history/period/{}?filter_entity_id={}&end_time={}",
            self.base_url,
            urlencoding::encode(&start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            urlencoding::encode(entity_id),
            urlencoding::encode(&end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        if with_attributes {
            // Attribute-only changes are not "significant" to the host
            url.push_str("&significant_changes_only=0");
        } else {
            url.push_str("&minimal_response&no_attributes");
        }
        url
    }

    fn state_url(&self, entity_id: &str) -> String {
        format!(
            "{}/api/states/{}",
            self.base_url,
            urlencoding::encode(entity_id)
        )
    }

    fn service_url(&self, domain: &str, service: &str) -> String {
        format!(
            "{}/api/services/{}/{}",
            self.base_url,
            urlencoding::encode(domain),
            urlencoding::encode(service)
        )
    }

    async fn get(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .context("Failed to send request to Home Assistant")
    }

    async fn check_status(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Home Assistant request failed with status {}: {}", status, body);
        }
        Ok(response)
    }
}

/// The history endpoint answers with one list per requested entity.
fn flatten_history(groups: Vec<Vec<HistoryRecord>>) -> Vec<HistoryRecord> {
    groups.into_iter().flatten().collect()
}

#[async_trait]
impl HostRepository for HassRepository {
    async fn fetch_history(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        with_attributes: bool,
    ) -> Result<Vec<HistoryRecord>> {
        let url = self.history_url(entity_id, start, end, with_attributes);
        tracing::debug!("Fetching history: {}", url);

        let response = Self::check_status(self.get(&url).await?).await?;
        let groups = response
            .json::<Vec<Vec<HistoryRecord>>>()
            .await
            .context("Failed to parse history response")?;

        Ok(flatten_history(groups))
    }

    async fn get_state(&self, entity_id: &str) -> Result<Option<EntityState>> {
        let response = self.get(&self.state_url(entity_id)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let state = Self::check_status(response)
            .await?
            .json::<EntityState>()
            .await
            .with_context(|| format!("Failed to parse state of {}", entity_id))?;

        Ok(Some(state))
    }

    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        let response = self
            .client
            .post(self.service_url(domain, service))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to call {}.{}", domain, service))?;

        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> HassRepository {
        HassRepository::new(
            "http://homeassistant.local:8123/".to_string(),
            "token".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_history_url() {
        let start = "2026-10-18T12:00:00Z".parse().unwrap();
        let end = "2026-10-19T12:00:00Z".parse().unwrap();

        let url = repository().history_url("sensor.hall", start, end, false);
        assert_eq!(
            url,
            "http://homeassistant.local:8123/api/history/period/2026-10-18T12%3A00%3A00Z\
             ?filter_entity_id=sensor.hall&end_time=2026-10-19T12%3A00%3A00Z\
             &minimal_response&no_attributes"
        );

        let url = repository().history_url("climate.hall", start, end, true);
        assert!(url.ends_with("&significant_changes_only=0"));
        assert!(!url.contains("no_attributes"));
    }

    #[test]
    fn test_state_and_service_urls() {
        let repo = repository();
        assert_eq!(
            repo.state_url("climate.living_room"),
            "http://homeassistant.local:8123/api/states/climate.living_room"
        );
        assert_eq!(
            repo.service_url("climate", "set_hvac_mode"),
            "http://homeassistant.local:8123/api/services/climate/set_hvac_mode"
        );
    }

    #[test]
    fn test_parse_minimal_history() {
        let body = r#"[[
            {"entity_id": "sensor.hall", "state": "20.1", "last_changed": "2026-10-19T08:00:00.123456+00:00", "last_updated": "2026-10-19T08:00:00.123456+00:00"},
            {"state": "20.4", "last_changed": "2026-10-19T08:10:00+00:00"},
            {"state": "unavailable", "last_changed": "2026-10-19T08:20:00+00:00"}
        ]]"#;

        let groups: Vec<Vec<HistoryRecord>> = serde_json::from_str(body).unwrap();
        let records = flatten_history(groups);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].reading(None), Some(20.4));
        assert_eq!(records[2].reading(None), None);
        assert!(records[0].last_changed < records[1].last_changed);
    }

    #[test]
    fn test_parse_unknown_entity_history() {
        let groups: Vec<Vec<HistoryRecord>> = serde_json::from_str("[]").unwrap();
        assert!(flatten_history(groups).is_empty());
    }
}
