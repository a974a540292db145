// Card domain model - What a climate tile shows
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::climate::ClimateState;
use super::telemetry::{GraphPaths, ProcessedSeries};

#[derive(Debug, Clone, Serialize)]
pub struct CardSummary {
    pub id: String,
    pub title: String,
}

/// A fully rendered graph. Snapshots are immutable and replaced whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    #[serde(skip)]
    pub generation: u64,
    #[serde(flatten)]
    pub series: ProcessedSeries,
    #[serde(flatten)]
    pub paths: GraphPaths,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: String,
    pub title: String,
    pub climate: Option<ClimateState>,
    pub graph: Option<Arc<GraphSnapshot>>,
}

impl CardView {
    pub fn new(
        id: String,
        title: String,
        climate: Option<ClimateState>,
        graph: Option<Arc<GraphSnapshot>>,
    ) -> Self {
        Self {
            id,
            title,
            climate,
            graph,
        }
    }
}
