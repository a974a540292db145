// Climate domain model - Readings, setpoint and modes of a thermostat entity
use serde::Serialize;

use super::entity::EntityState;

const DEFAULT_MIN_TEMP: f64 = 7.0;
const DEFAULT_MAX_TEMP: f64 = 35.0;
const DEFAULT_TEMP_STEP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateState {
    pub entity_id: String,
    pub name: String,
    pub hvac_mode: String,
    pub hvac_modes: Vec<String>,
    pub fan_mode: Option<String>,
    pub fan_modes: Vec<String>,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub min_temp: f64,
    pub max_temp: f64,
    pub target_temp_step: f64,
    pub unit: Option<String>,
}

impl ClimateState {
    pub fn from_entity(entity: &EntityState) -> Self {
        let name = entity
            .attribute_str("friendly_name")
            .map(str::to_string)
            .unwrap_or_else(|| Self::format_name(&entity.entity_id));

        let min_temp = entity.attribute_f64("min_temp").unwrap_or(DEFAULT_MIN_TEMP);
        let max_temp = entity
            .attribute_f64("max_temp")
            .unwrap_or(DEFAULT_MAX_TEMP)
            .max(min_temp);
        let target_temp_step = entity
            .attribute_f64("target_temp_step")
            .filter(|step| *step > 0.0)
            .unwrap_or(DEFAULT_TEMP_STEP);

        Self {
            entity_id: entity.entity_id.clone(),
            name,
            hvac_mode: entity.state.clone(),
            hvac_modes: entity.attribute_strings("hvac_modes"),
            fan_mode: entity.attribute_str("fan_mode").map(str::to_string),
            fan_modes: entity.attribute_strings("fan_modes"),
            current_temperature: entity.attribute_f64("current_temperature"),
            target_temperature: entity.attribute_f64("temperature"),
            min_temp,
            max_temp,
            target_temp_step,
            unit: entity
                .attribute_str("unit_of_measurement")
                .map(str::to_string),
        }
    }

    fn format_name(entity_id: &str) -> String {
        // Convert "climate.living_room" to "living room"
        let object_id = entity_id.split_once('.').map_or(entity_id, |(_, id)| id);
        object_id.replace('_', " ")
    }

    /// Snap a requested setpoint onto the entity's step grid and its
    /// min/max bounds.
    pub fn clamp_setpoint(&self, requested: f64) -> f64 {
        let steps = ((requested - self.min_temp) / self.target_temp_step).round();
        let snapped = self.min_temp + steps * self.target_temp_step;
        // Keep the decimal representation tidy, 20.499999 -> 20.5
        let tidy = (snapped * 1000.0).round() / 1000.0;
        tidy.clamp(self.min_temp, self.max_temp)
    }

    /// Current setpoint moved by `steps` increments, if a setpoint exists.
    pub fn adjusted_setpoint(&self, steps: i32) -> Option<f64> {
        self.target_temperature
            .map(|target| self.clamp_setpoint(target + f64::from(steps) * self.target_temp_step))
    }

    pub fn supports_hvac_mode(&self, mode: &str) -> bool {
        self.hvac_modes.iter().any(|m| m == mode)
    }

    pub fn supports_fan_mode(&self, mode: &str) -> bool {
        self.fan_modes.iter().any(|m| m == mode)
    }
}
