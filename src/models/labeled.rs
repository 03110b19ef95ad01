use crate::config::LabelThresholds;
use crate::models::{CleanObservation, CloudOrigin};
use serde::{Deserialize, Serialize};

/// Five independent binary targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Labels {
    pub rain: bool,
    pub hot: bool,
    pub cold: bool,
    pub uv_high: bool,
    pub windy: bool,
}

impl Labels {
    /// Apply the fixed thresholds. No label depends on another.
    pub fn derive(
        rain: bool,
        temp: f64,
        uv_index: f64,
        wind_speed: f64,
        thresholds: &LabelThresholds,
    ) -> Self {
        Self {
            rain,
            hot: temp >= thresholds.hot,
            cold: temp <= thresholds.cold,
            uv_high: uv_index >= thresholds.uv_high,
            windy: wind_speed >= thresholds.windy,
        }
    }

    /// Labels in `LABEL_COLUMNS` order as 0/1
    pub fn as_array(&self) -> [u8; 5] {
        [
            self.rain as u8,
            self.hot as u8,
            self.cold as u8,
            self.uv_high as u8,
            self.windy as u8,
        ]
    }

    pub fn active_count(&self) -> usize {
        self.as_array().iter().filter(|&&v| v == 1).count()
    }
}

/// A cleaned observation with its UV resolved and labels attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledObservation {
    pub temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub clouds: f64,
    pub uv_index: f64,
    pub rain: bool,
    pub source: String,
    pub labels: Labels,
    pub cloud_origin: CloudOrigin,
}

impl LabeledObservation {
    pub fn from_clean(
        record: CleanObservation,
        uv_fill: f64,
        thresholds: &LabelThresholds,
    ) -> Self {
        let uv_index = record.uv_index.unwrap_or(uv_fill);
        let labels = Labels::derive(
            record.rain,
            record.temp,
            uv_index,
            record.wind_speed,
            thresholds,
        );

        Self {
            temp: record.temp,
            humidity: record.humidity,
            wind_speed: record.wind_speed,
            pressure: record.pressure,
            clouds: record.clouds,
            uv_index,
            rain: record.rain,
            source: record.source,
            labels,
            cloud_origin: record.cloud_origin,
        }
    }

    /// Features in `FEATURE_COLUMNS` order
    pub fn features(&self) -> [f64; 6] {
        [
            self.temp,
            self.humidity,
            self.wind_speed,
            self.pressure,
            self.clouds,
            self.uv_index,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_for(temp: f64, uv: f64, wind: f64) -> Labels {
        Labels::derive(false, temp, uv, wind, &LabelThresholds::default())
    }

    #[test]
    fn test_hot_boundary() {
        assert!(labels_for(30.0, 0.0, 0.0).hot);
        assert!(!labels_for(29.999, 0.0, 0.0).hot);
    }

    #[test]
    fn test_cold_boundary() {
        assert!(labels_for(15.0, 0.0, 0.0).cold);
        assert!(!labels_for(15.001, 0.0, 0.0).cold);
    }

    #[test]
    fn test_uv_and_wind_boundaries() {
        assert!(labels_for(20.0, 5.0, 10.0).uv_high);
        assert!(labels_for(20.0, 5.0, 10.0).windy);
        assert!(!labels_for(20.0, 4.99, 9.99).uv_high);
        assert!(!labels_for(20.0, 4.99, 9.99).windy);
    }

    #[test]
    fn test_labels_are_independent() {
        let thresholds = LabelThresholds {
            hot: 10.0,
            cold: 20.0,
            ..LabelThresholds::default()
        };
        let labels = Labels::derive(true, 15.0, 8.0, 12.0, &thresholds);

        assert_eq!(labels.as_array(), [1, 1, 1, 1, 1]);
        assert_eq!(labels.active_count(), 5);
        assert_eq!(labels_for(20.0, 1.0, 1.0).active_count(), 0);
    }

    #[test]
    fn test_from_clean_uses_fill_only_when_unknown() {
        let record = CleanObservation {
            temp: 31.0,
            humidity: 40.0,
            wind_speed: 3.0,
            pressure: 1013.0,
            clouds: 95.0,
            uv_index: None,
            rain: true,
            source: "sample".to_string(),
            cloud_origin: CloudOrigin::Observed,
        };

        let imputed = LabeledObservation::from_clean(record.clone(), 6.0, &LabelThresholds::default());
        assert_eq!(imputed.uv_index, 6.0);
        assert!(imputed.labels.uv_high);

        let observed = LabeledObservation::from_clean(
            CleanObservation {
                uv_index: Some(2.0),
                ..record
            },
            6.0,
            &LabelThresholds::default(),
        );
        assert_eq!(observed.uv_index, 2.0);
        assert!(!observed.labels.uv_high);
        assert!(observed.labels.hot);
        assert!(observed.labels.rain);
    }
}
