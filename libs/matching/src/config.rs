//! Matching engine settings, read from the `[matching]` section

use config::ConfigError;
use serde::Deserialize;

use crate::geo::DEFAULT_RADIUS_KM;

/// Matching engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Maximum request-to-resource distance for a candidate pair, in km
    pub radius_km: f64,
    /// Cron expression (with seconds) driving scheduled discovery
    pub discovery_schedule: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            discovery_schedule: "0 */5 * * * *".to_string(),
        }
    }
}

impl MatchingConfig {
    /// Load the `[matching]` section from the settings file and environment
    ///
    /// # Environment Variables
    /// - `RELIEF__MATCHING__RADIUS_KM`: pairing radius (default: 50)
    /// - `RELIEF__MATCHING__DISCOVERY_SCHEDULE`: cron schedule (default: every 5 minutes)
    pub fn load() -> Result<Self, ConfigError> {
        let config: MatchingConfig = common::settings::load_section("matching")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject radii that would make the proximity gate meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(ConfigError::Message(format!(
                "matching.radius_km must be a positive number, got {}",
                self.radius_km
            )));
        }
        if self.discovery_schedule.split_whitespace().count() < 6 {
            return Err(ConfigError::Message(format!(
                "matching.discovery_schedule must have a seconds field, got {:?}",
                self.discovery_schedule
            )));
        }
        Ok(())
    }

    /// Same settings with a caller-supplied radius
    pub fn with_radius(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }
}
