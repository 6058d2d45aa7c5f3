//! Configuration management for gait trial processing

use crate::{
    anthropometry::Sex,
    constants::{DEFAULT_DERIVATIVE_ORDER, DEFAULT_GRAVITY, DEFAULT_SAMPLE_INTERVAL, DEFAULT_THRESHOLD_FRACTION},
    derivative::DerivativeOrder,
    Error, Result,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Subject and capture parameters
    pub trial: TrialConfig,

    /// Gait event detection parameters
    pub events: EventConfig,

    /// Inverse dynamics parameters
    pub dynamics: DynamicsConfig,
}

/// Subject and capture parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Total body mass in kg
    pub body_mass: f64,

    /// Sex selecting the anthropometric table
    pub sex: Sex,

    /// Sample interval in seconds
    pub sample_interval: f64,
}

/// Gait event detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Force threshold as a fraction of body weight
    pub threshold_fraction: f64,
}

/// Inverse dynamics parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    /// Gravity vector in the marker frame, m/s²
    pub gravity: [f64; 3],

    /// Order of the center-of-mass derivative used as acceleration (1 or 2)
    pub derivative_order: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trial: TrialConfig::default(),
            events: EventConfig::default(),
            dynamics: DynamicsConfig::default(),
        }
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            body_mass: 68.0,
            sex: Sex::Female,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            threshold_fraction: DEFAULT_THRESHOLD_FRACTION,
        }
    }
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            derivative_order: DEFAULT_DERIVATIVE_ORDER,
        }
    }
}

impl DynamicsConfig {
    /// Gravity as a vector
    #[must_use]
    pub fn gravity_vector(&self) -> Vector3<f64> {
        Vector3::from(self.gravity)
    }

    /// Derivative order as a typed value
    ///
    /// # Errors
    ///
    /// Returns an error if the order is neither 1 nor 2
    pub fn order(&self) -> Result<DerivativeOrder> {
        DerivativeOrder::try_from(self.derivative_order)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.trial.body_mass.is_finite() && self.trial.body_mass > 0.0) {
            return Err(Error::ConfigError(format!(
                "Body mass must be positive, got {}",
                self.trial.body_mass
            )));
        }
        if !(self.trial.sample_interval.is_finite() && self.trial.sample_interval > 0.0) {
            return Err(Error::ConfigError(format!(
                "Sample interval must be positive, got {}",
                self.trial.sample_interval
            )));
        }

        if !(self.events.threshold_fraction > 0.0 && self.events.threshold_fraction < 1.0) {
            return Err(Error::ConfigError(
                "Threshold fraction must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.dynamics.gravity.iter().any(|g| !g.is_finite()) {
            return Err(Error::ConfigError("Gravity components must be finite".to_string()));
        }
        self.dynamics
            .order()
            .map_err(|_| Error::ConfigError("Derivative order must be 1 or 2".to_string()))?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gait Kinetics Configuration

# Subject and capture
trial:
  body_mass: 68.0
  sex: female
  sample_interval: 0.01

# Gait event detection
events:
  threshold_fraction: 0.05

# Inverse dynamics (y is vertical)
dynamics:
  gravity: [0.0, -9.81, 0.0]
  derivative_order: 2
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dynamics.gravity_vector(), Vector3::new(0.0, -9.81, 0.0));
        assert_eq!(config.dynamics.order().unwrap(), DerivativeOrder::Second);
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_yaml("trial:\n  body_mass: 80.0\n  sex: male\n").unwrap();
        assert_eq!(config.trial.body_mass, 80.0);
        assert_eq!(config.trial.sex, Sex::Male);
        assert_eq!(config.trial.sample_interval, DEFAULT_SAMPLE_INTERVAL);
        assert_eq!(config.events.threshold_fraction, DEFAULT_THRESHOLD_FRACTION);
    }

    #[test]
    fn test_unknown_sex_rejected() {
        let result = Config::from_yaml("trial:\n  sex: other\n");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.trial.body_mass = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.trial.sample_interval = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.events.threshold_fraction = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.dynamics.derivative_order = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("gait_kinetics_config_{}.yaml", std::process::id()));
        let mut config = Config::default();
        config.trial.body_mass = 75.5;
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
