use crate::error::Result;
use crate::utils::constants::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

/// Environment variable prefix for overrides, e.g. `WXDATA__THRESHOLDS__HOT=32`
pub const ENV_PREFIX: &str = "WXDATA";

/// Policy constants of the pipeline. Defaults mirror `utils::constants`;
/// tests and callers override individual values without touching stage code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    #[validate(nested)]
    pub bounds: PhysicalBounds,

    #[validate(nested)]
    pub thresholds: LabelThresholds,

    #[validate(nested)]
    pub imputation: UvImputation,

    #[validate(nested)]
    pub clouds: CloudFallbacks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_bound_order"))]
pub struct PhysicalBounds {
    pub humidity_min: f64,
    pub humidity_max: f64,
    pub clouds_min: f64,
    pub clouds_max: f64,
    pub pressure_min: f64,
    pub pressure_max: f64,
    #[validate(range(min = 0.0))]
    pub uv_min: f64,
}

impl Default for PhysicalBounds {
    fn default() -> Self {
        Self {
            humidity_min: MIN_HUMIDITY,
            humidity_max: MAX_HUMIDITY,
            clouds_min: MIN_CLOUDS,
            clouds_max: MAX_CLOUDS,
            pressure_min: MIN_PRESSURE_HPA,
            pressure_max: MAX_PRESSURE_HPA,
            uv_min: MIN_UV_INDEX,
        }
    }
}

fn validate_bound_order(bounds: &PhysicalBounds) -> std::result::Result<(), ValidationError> {
    let pairs = [
        (bounds.humidity_min, bounds.humidity_max),
        (bounds.clouds_min, bounds.clouds_max),
        (bounds.pressure_min, bounds.pressure_max),
    ];
    if pairs.iter().any(|(min, max)| min > max) {
        return Err(ValidationError::new("bound_min_exceeds_max"));
    }
    Ok(())
}

/// Fixed label thresholds: `>=` for hot/uv_high/windy, `<=` for cold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LabelThresholds {
    #[validate(range(min = -90.0, max = 60.0))]
    pub hot: f64,

    #[validate(range(min = -90.0, max = 60.0))]
    pub cold: f64,

    #[validate(range(min = 0.0))]
    pub uv_high: f64,

    #[validate(range(min = 0.0))]
    pub windy: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            hot: HOT_THRESHOLD_C,
            cold: COLD_THRESHOLD_C,
            uv_high: UV_HIGH_THRESHOLD,
            windy: WINDY_THRESHOLD_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UvImputation {
    #[validate(range(min = 0.0))]
    pub default_uv_index: f64,
}

impl Default for UvImputation {
    fn default() -> Self {
        Self {
            default_uv_index: DEFAULT_UV_INDEX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CloudFallbacks {
    #[validate(range(min = 0.0, max = 100.0))]
    pub weather_history: f64,
}

impl Default for CloudFallbacks {
    fn default() -> Self {
        Self {
            weather_history: HISTORY_CLOUD_FALLBACK,
        }
    }
}

impl PipelineConfig {
    /// Load defaults, then an optional config file, then `WXDATA__*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(?config, "Loaded pipeline configuration");
        Ok(config)
    }

    pub fn with_thresholds(mut self, thresholds: LabelThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_bounds(mut self, bounds: PhysicalBounds) -> Self {
        self.bounds = bounds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_match_policy_constants() {
        let config = PipelineConfig::default();

        assert_eq!(config.thresholds.hot, 30.0);
        assert_eq!(config.thresholds.cold, 15.0);
        assert_eq!(config.thresholds.uv_high, 5.0);
        assert_eq!(config.thresholds.windy, 10.0);
        assert_eq!(config.bounds.pressure_min, 870.0);
        assert_eq!(config.bounds.pressure_max, 1100.0);
        assert_eq!(config.imputation.default_uv_index, 3.0);
        assert_eq!(config.clouds.weather_history, 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_other_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[thresholds]")?;
        writeln!(file, "hot = 32.5")?;

        let config = PipelineConfig::load(Some(file.path()))?;

        assert_eq!(config.thresholds.hot, 32.5);
        assert_eq!(config.thresholds.cold, 15.0);
        assert_eq!(config.bounds, PhysicalBounds::default());

        Ok(())
    }

    #[test]
    fn test_inverted_bounds_fail_validation() {
        let config = PipelineConfig::default().with_bounds(PhysicalBounds {
            pressure_min: 1100.0,
            pressure_max: 870.0,
            ..PhysicalBounds::default()
        });

        assert!(config.validate().is_err());
    }
}
