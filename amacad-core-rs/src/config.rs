//! Clustering parameters
//!
//! Loaded once at node activation and immutable afterwards. Durations are
//! written as floating-point seconds in JSON.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Weights of the F-value terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub distance: f64,
    pub speed: f64,
    pub destination: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            distance: 1.0,
            speed: 1.0,
            destination: 1.0,
        }
    }
}

/// Complete clustering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Reclustering starts when membership drops below this
    pub minimum_density: usize,
    /// Members a head admits before denying ADD requests
    pub maximum_density: usize,
    /// Neighbouring heads a head tolerates before reclustering
    pub maximum_cluster_density: usize,
    /// Warnings a head tolerates before handing off
    pub maximum_warning_count: u32,
    /// Speed change (m/s) that makes a member warn its head
    pub speed_threshold: f64,
    /// Bandwidth change that makes a member warn its head (reserved)
    pub bandwidth_threshold: f64,

    /// Mobility update / beacon period
    #[serde(with = "secs_f64")]
    pub time_difference: Duration,
    /// Maximum age of a neighbour table entry
    #[serde(with = "secs_f64")]
    pub time_to_live: Duration,
    /// Affiliation and join timeout
    #[serde(with = "secs_f64")]
    pub timeout_period: Duration,

    pub weights: Weights,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            minimum_density: 1,
            maximum_density: 10,
            maximum_cluster_density: 2,
            maximum_warning_count: 3,
            speed_threshold: 2.0,
            bandwidth_threshold: 0.0,
            time_difference: Duration::from_secs(1),
            time_to_live: Duration::from_secs(3),
            timeout_period: Duration::from_millis(500),
            weights: Weights::default(),
        }
    }
}

impl ClusterConfig {
    /// Parse from JSON, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ClusterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("time_difference", self.time_difference),
            ("time_to_live", self.time_to_live),
            ("timeout_period", self.timeout_period),
        ] {
            if value.is_zero() {
                return Err(ConfigError::NonPositiveDuration(name));
            }
        }

        for (name, value) in [
            ("distance", self.weights.distance),
            ("speed", self.weights.speed),
            ("destination", self.weights.destination),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        for (name, value) in [
            ("speed_threshold", self.speed_threshold),
            ("bandwidth_threshold", self.bandwidth_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if self.minimum_density > self.maximum_density {
            return Err(ConfigError::DensityRange {
                minimum: self.minimum_density,
                maximum: self.maximum_density,
            });
        }

        Ok(())
    }

    /// Set density limits
    pub fn with_density(mut self, minimum: usize, maximum: usize) -> Self {
        self.minimum_density = minimum;
        self.maximum_density = maximum;
        self
    }

    /// Set neighbouring head limit
    pub fn with_max_cluster_density(mut self, count: usize) -> Self {
        self.maximum_cluster_density = count;
        self
    }

    /// Set warning limit
    pub fn with_max_warnings(mut self, count: u32) -> Self {
        self.maximum_warning_count = count;
        self
    }

    /// Set timing parameters
    pub fn with_timing(mut self, time_difference: Duration, time_to_live: Duration, timeout_period: Duration) -> Self {
        self.time_difference = time_difference;
        self.time_to_live = time_to_live;
        self.timeout_period = timeout_period;
        self
    }

    /// Set scoring weights
    pub fn with_weights(mut self, distance: f64, speed: f64, destination: f64) -> Self {
        self.weights = Weights {
            distance,
            speed,
            destination,
        };
        self
    }
}

mod secs_f64 {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ClusterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ClusterConfig::default()
            .with_density(2, 5)
            .with_max_cluster_density(1)
            .with_max_warnings(4)
            .with_weights(0.5, 2.0, 0.1);

        assert_eq!(config.minimum_density, 2);
        assert_eq!(config.maximum_density, 5);
        assert_eq!(config.maximum_cluster_density, 1);
        assert_eq!(config.maximum_warning_count, 4);
        assert_eq!(config.weights.speed, 2.0);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ClusterConfig::from_json(
            r#"{ "maximum_density": 4, "time_to_live": 2.5, "weights": { "distance": 1.0, "speed": 3.0, "destination": 0.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.maximum_density, 4);
        assert_eq!(config.time_to_live, Duration::from_millis(2500));
        assert_eq!(config.weights.speed, 3.0);
        assert_eq!(config.minimum_density, 1);
    }

    #[test]
    fn test_json_roundtrip_keeps_seconds() {
        let json = serde_json::to_value(ClusterConfig::default()).unwrap();
        assert_eq!(json["timeout_period"], serde_json::json!(0.5));
    }

    #[test]
    fn test_rejects_invalid() {
        let zero_ttl = ClusterConfig::default().with_timing(
            Duration::from_secs(1),
            Duration::ZERO,
            Duration::from_secs(1),
        );
        assert!(matches!(
            zero_ttl.validate(),
            Err(ConfigError::NonPositiveDuration("time_to_live"))
        ));

        let negative = ClusterConfig::default().with_weights(1.0, -1.0, 1.0);
        assert!(matches!(negative.validate(), Err(ConfigError::InvalidWeight { name: "speed", .. })));

        let inverted = ClusterConfig::default().with_density(5, 2);
        assert!(matches!(inverted.validate(), Err(ConfigError::DensityRange { .. })));

    }

    #[test]
    fn test_parse_error_keeps_source() {
        let err = ClusterConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<serde_json::Error>().is_some());
        assert!(err.to_string().starts_with("JSON parse error: "));
    }
}
