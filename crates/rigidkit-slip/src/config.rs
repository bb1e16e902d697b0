//! Load-time wheel configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-wheel configuration consumed at controller load time.
///
/// Only the link name is required. Coefficients default to zero; a
/// zero normal force rejects the entry at load, a zero radius asks the
/// loader to derive the radius from the wheel's collision shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelConfig {
    /// Name of the wheel link inside the model.
    pub link_name: String,
    /// Unitless lateral slip compliance, >= 0.
    #[serde(default)]
    pub slip_compliance_lateral: f64,
    /// Unitless longitudinal slip compliance, >= 0.
    #[serde(default)]
    pub slip_compliance_longitudinal: f64,
    /// Static estimate of the normal force on the wheel, N.
    #[serde(default)]
    pub wheel_normal_force: f64,
    /// Wheel radius, m. Zero means derive from the collision shape.
    #[serde(default)]
    pub wheel_radius: f64,
}

/// Parse a JSON array of wheel entries, leniently.
///
/// Malformed entries (missing `link_name`, wrong types) are logged and
/// skipped so one bad entry never discards the rest. A payload that is
/// not an array yields no entries.
pub fn parse_configs(json: &str) -> Vec<WheelConfig> {
    let value: serde_json::Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            warn!("wheel configuration is not valid JSON: {e}");
            return Vec::new();
        }
    };
    let entries = match value.as_array() {
        Some(a) => a,
        None => {
            warn!("wheel configuration must be a JSON array");
            return Vec::new();
        }
    };

    let mut configs = Vec::new();
    for entry in entries {
        match serde_json::from_value::<WheelConfig>(entry.clone()) {
            Ok(config) => configs.push(config),
            Err(e) => warn!("skipping wheel entry {entry}: {e}"),
        }
    }
    configs
}
