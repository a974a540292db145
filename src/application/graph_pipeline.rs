// Graph pipeline - Owns a card's latest graph and applies fetch results in order
use crate::application::history_fetcher::HistoryFetcher;
use crate::domain::card::GraphSnapshot;
use crate::domain::curve;
use crate::domain::graph_style::GraphStyle;
use crate::domain::series;
use crate::domain::telemetry::{GraphPaths, HistorySource, ProcessedSeries, RawSample};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

pub type SnapshotReceiver = watch::Receiver<Option<Arc<GraphSnapshot>>>;

/// Identifies one fetch. Tickets are issued in increasing order per pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Applied(Arc<GraphSnapshot>),
    /// Nothing usable came back; the previous graph stays on display
    Retained,
    /// A newer fetch has already been applied
    Superseded,
}

pub struct GraphPipeline {
    style: GraphStyle,
    issued: AtomicU64,
    latest: watch::Sender<Option<Arc<GraphSnapshot>>>,
}

impl GraphPipeline {
    pub fn new(style: GraphStyle) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            style,
            issued: AtomicU64::new(0),
            latest,
        }
    }

    pub fn style(&self) -> &GraphStyle {
        &self.style
    }

    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Process and render `raw`, then swap it in unless a newer ticket got
    /// there first. Empty input leaves the current snapshot untouched.
    pub fn update_from_fetch(
        &self,
        ticket: FetchTicket,
        raw: &[RawSample],
        fetched_at: DateTime<Utc>,
    ) -> UpdateOutcome {
        let Some(series) = series::process(raw, &self.style) else {
            return UpdateOutcome::Retained;
        };

        let paths = Self::render(&series, &self.style);
        let snapshot = Arc::new(GraphSnapshot {
            generation: ticket.0,
            series,
            paths,
            updated_at: fetched_at,
        });

        let applied = self.latest.send_if_modified(|current| {
            if current.as_ref().is_some_and(|c| c.generation >= ticket.0) {
                return false;
            }
            *current = Some(snapshot.clone());
            true
        });

        if applied {
            UpdateOutcome::Applied(snapshot)
        } else {
            UpdateOutcome::Superseded
        }
    }

    pub fn render(series: &ProcessedSeries, style: &GraphStyle) -> GraphPaths {
        curve::render(series, style)
    }

    pub fn current(&self) -> Option<Arc<GraphSnapshot>> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.latest.subscribe()
    }

    /// One full fetch cycle for `source`
    pub async fn refresh(
        &self,
        fetcher: &HistoryFetcher,
        source: &HistorySource,
        now: DateTime<Utc>,
    ) -> UpdateOutcome {
        let ticket = self.begin_fetch();
        let raw = fetcher.fetch(source, self.style.hours, now).await;
        let outcome = self.update_from_fetch(ticket, &raw, now);

        match &outcome {
            UpdateOutcome::Applied(snapshot) => tracing::debug!(
                "Graph for {} updated from {} samples ({} points)",
                source.entity_id,
                raw.len(),
                snapshot.series.values.len()
            ),
            UpdateOutcome::Retained => tracing::info!(
                "No history for {}, keeping previous graph",
                source.entity_id
            ),
            UpdateOutcome::Superseded => tracing::debug!(
                "Discarded superseded fetch {:?} for {}",
                ticket,
                source.entity_id
            ),
        }

        outcome
    }
}
