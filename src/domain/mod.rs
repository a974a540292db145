// Domain layer - Models and the pure graph math
pub mod card;
pub mod climate;
pub mod curve;
pub mod entity;
pub mod graph_style;
pub mod series;
pub mod telemetry;
