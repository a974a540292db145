// Temperature history domain models
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl RawSample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Smoothed, resampled values ready for plotting. `range_max > range_min`
/// always holds for a series produced by the processor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedSeries {
    pub values: Vec<f64>,
    pub range_min: f64,
    pub range_max: f64,
}

impl ProcessedSeries {
    pub fn new(values: Vec<f64>, range_min: f64, range_max: f64) -> Self {
        Self {
            values,
            range_min,
            range_max,
        }
    }

    pub fn span(&self) -> f64 {
        self.range_max - self.range_min
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Path descriptions for the open stroke and the closed fill region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphPaths {
    pub stroke: String,
    pub fill: String,
}

/// Where a card's history comes from: an entity's state, or one of its
/// attributes when the state itself is not numeric (climate entities).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySource {
    pub entity_id: String,
    pub attribute: Option<String>,
}

impl HistorySource {
    pub fn state_of(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            attribute: None,
        }
    }

    pub fn attribute_of(entity_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            attribute: Some(attribute.into()),
        }
    }
}
