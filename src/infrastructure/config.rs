use crate::domain::graph_style::{CurveMode, GraphStyle, SmoothingKernel};
use crate::domain::telemetry::HistorySource;
use serde::Deserialize;

const ENV_PREFIX: &str = "CLIMATE_CARD";
const CLIMATE_TEMPERATURE_ATTRIBUTE: &str = "current_temperature";

#[derive(Debug, Deserialize, Clone)]
pub struct HostConfig {
    pub host: HostSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HostSettings {
    pub url: String,
    pub token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CardsConfig {
    #[serde(default)]
    pub cards: Vec<CardConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CardConfig {
    pub id: String,
    pub title: Option<String>,
    /// Climate entity driving the tile
    pub entity: String,
    /// Entity whose history is plotted, defaults to `entity`
    pub history_entity: Option<String>,
    /// Attribute to plot instead of the state
    pub history_attribute: Option<String>,
    #[serde(default = "default_true")]
    pub show_graph: bool,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: i64,
    #[serde(default)]
    pub graph: GraphOptions,
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_secs() -> i64 {
    30
}

impl CardConfig {
    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.entity.clone())
    }

    /// A dedicated history entity is plotted by state; the climate entity
    /// itself only has a numeric temperature attribute.
    pub fn history_source(&self) -> HistorySource {
        match (&self.history_entity, &self.history_attribute) {
            (Some(entity), None) => HistorySource::state_of(entity.clone()),
            (Some(entity), Some(attr)) => HistorySource::attribute_of(entity.clone(), attr.clone()),
            (None, Some(attr)) => HistorySource::attribute_of(self.entity.clone(), attr.clone()),
            (None, None) => {
                HistorySource::attribute_of(self.entity.clone(), CLIMATE_TEMPERATURE_ATTRIBUTE)
            }
        }
    }

    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs.clamp(5, 3600).unsigned_abs()
    }
}

/// Graph options as written in the config file. Every field is optional;
/// [`GraphOptions::resolve`] fills defaults and clamps once. Counts are
/// signed so that negative values clamp instead of failing to load.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GraphOptions {
    pub points: Option<i64>,
    pub smoothing_window: Option<i64>,
    pub smoothing_kernel: Option<SmoothingKernel>,
    pub double_smoothing: Option<bool>,
    pub curve: Option<CurveMode>,
    pub tension: Option<f64>,
    pub line_width: Option<f64>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub line_color: Option<String>,
    pub fill_color: Option<String>,
    pub hours: Option<i64>,
}

impl GraphOptions {
    pub fn resolve(&self) -> GraphStyle {
        let defaults = GraphStyle::default();
        let line_color = self
            .line_color
            .clone()
            .unwrap_or_else(|| defaults.line_color.clone());
        GraphStyle {
            points: self.points.map_or(defaults.points, count),
            smoothing_window: self
                .smoothing_window
                .map_or(defaults.smoothing_window, count),
            smoothing_kernel: self.smoothing_kernel.unwrap_or(defaults.smoothing_kernel),
            double_smoothing: self.double_smoothing.unwrap_or(defaults.double_smoothing),
            curve: self.curve.unwrap_or(defaults.curve),
            tension: self.tension.unwrap_or(defaults.tension),
            line_width: self.line_width.unwrap_or(defaults.line_width),
            height: self.height.unwrap_or(defaults.height),
            width: self.width.unwrap_or(defaults.width),
            // Fill follows the line colour unless set explicitly
            fill_color: self.fill_color.clone().unwrap_or_else(|| line_color.clone()),
            line_color,
            hours: self
                .hours
                .map_or(defaults.hours, |h| u32::try_from(h.max(0)).unwrap_or(u32::MAX)),
        }
        .clamped()
    }
}

fn count(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

fn load<T: serde::de::DeserializeOwned>(name: &str) -> anyhow::Result<T> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_host_config() -> anyhow::Result<HostConfig> {
    load("config/host")
}

pub fn load_cards_config() -> anyhow::Result<CardsConfig> {
    load("config/cards")
}
