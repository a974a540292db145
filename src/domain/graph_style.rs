// Graph style - Resolved rendering parameters for a card's sparkline
use serde::{Deserialize, Serialize};

pub const DEFAULT_POINTS: usize = 40;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 7;
pub const DEFAULT_TENSION: f64 = 0.5;
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;
pub const DEFAULT_HEIGHT: f64 = 80.0;
pub const DEFAULT_WIDTH: f64 = 300.0;
pub const DEFAULT_COLOR: &str = "#ff9800";
pub const DEFAULT_HOURS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingKernel {
    Uniform,
    #[default]
    Gaussian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveMode {
    #[default]
    Smooth,
    Simple,
}

/// Fully resolved style for one card. Build it with `Default` and struct
/// update syntax, then call [`GraphStyle::clamped`] once.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStyle {
    pub points: usize,
    pub smoothing_window: usize,
    pub smoothing_kernel: SmoothingKernel,
    pub double_smoothing: bool,
    pub curve: CurveMode,
    pub tension: f64,
    pub line_width: f64,
    pub height: f64,
    pub width: f64,
    pub line_color: String,
    pub fill_color: String,
    pub hours: u32,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            smoothing_kernel: SmoothingKernel::default(),
            double_smoothing: false,
            curve: CurveMode::default(),
            tension: DEFAULT_TENSION,
            line_width: DEFAULT_LINE_WIDTH,
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            line_color: DEFAULT_COLOR.to_string(),
            fill_color: DEFAULT_COLOR.to_string(),
            hours: DEFAULT_HOURS,
        }
    }
}

impl GraphStyle {
    /// Clamp every numeric option into its valid range. Misconfigured values
    /// are never rejected; non-finite floats fall back to their defaults.
    pub fn clamped(self) -> Self {
        Self {
            points: self.points.clamp(2, 500),
            smoothing_window: self.smoothing_window.clamp(1, 51),
            tension: clamp_f64(self.tension, 0.1, 1.0, DEFAULT_TENSION),
            line_width: clamp_f64(self.line_width, 0.0, 10.0, DEFAULT_LINE_WIDTH),
            height: clamp_f64(self.height, 20.0, 400.0, DEFAULT_HEIGHT),
            width: clamp_f64(self.width, 50.0, 2000.0, DEFAULT_WIDTH),
            hours: self.hours.clamp(1, 168),
            ..self
        }
    }

    pub fn draws_stroke(&self) -> bool {
        self.line_width > 0.0
    }
}

fn clamp_f64(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
