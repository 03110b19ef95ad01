use crate::error::{ProcessingError, Result};
use crate::utils::constants::SERVING_DEFAULT_UV_INDEX;
use crate::utils::units::kph_to_ms;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The six canonical features of a single serving request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub clouds: f64,
    pub uv_index: f64,
}

/// Fields as extracted from a payload, before mandatory checks
#[derive(Debug, Default)]
struct PartialFeatures {
    temp: Option<f64>,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    pressure: Option<f64>,
    clouds: Option<f64>,
    uv_index: Option<f64>,
}

impl FeatureVector {
    /// Coerce a JSON payload into a feature vector.
    ///
    /// Accepted shapes: a flat object (`temp`, `humidity`, ...), the same
    /// object nested under `features`, a WeatherAPI `current` block
    /// (`temp_c`, `wind_kph`, `pressure_mb`, `cloud`, `uv`), optionally
    /// wrapped in `{"current": ...}`, and an OpenWeather block
    /// (`main`, `wind`, `clouds`, `uvi`).
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let object = payload.as_object().ok_or_else(|| {
            ProcessingError::InvalidFormat("Feature payload must be a JSON object".to_string())
        })?;

        if let Some(inner) = object.get("features") {
            return Self::from_payload(inner);
        }
        if let Some(inner) = object.get("current").filter(|v| v.is_object()) {
            return Self::from_payload(inner);
        }

        let partial = if object.contains_key("temp_c") || object.contains_key("wind_kph") {
            PartialFeatures {
                temp: number(payload, &["temp_c"])?,
                humidity: number(payload, &["humidity"])?,
                wind_speed: number(payload, &["wind_kph"])?.map(kph_to_ms),
                pressure: number(payload, &["pressure_mb"])?,
                clouds: number(payload, &["cloud"])?,
                uv_index: number(payload, &["uv"])?,
            }
        } else if object.contains_key("main") {
            PartialFeatures {
                temp: number(payload, &["main", "temp"])?,
                humidity: number(payload, &["main", "humidity"])?,
                wind_speed: number(payload, &["wind", "speed"])?,
                pressure: number(payload, &["main", "pressure"])?,
                clouds: number(payload, &["clouds", "all"])?,
                uv_index: number(payload, &["uvi"])?,
            }
        } else {
            PartialFeatures {
                temp: number(payload, &["temp"])?,
                humidity: number(payload, &["humidity"])?,
                wind_speed: number(payload, &["wind_speed"])?,
                pressure: number(payload, &["pressure"])?,
                clouds: number(payload, &["clouds"])?,
                // A present uv_index of 0 is kept; uvi is read only when uv_index is absent
                uv_index: match number(payload, &["uv_index"])? {
                    Some(uv) => Some(uv),
                    None => number(payload, &["uvi"])?,
                },
            }
        };

        partial.complete()
    }

    /// Features in `FEATURE_COLUMNS` order
    pub fn to_array(&self) -> [f64; 6] {
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

impl PartialFeatures {
    fn complete(self) -> Result<FeatureVector> {
        let require = |value: Option<f64>, name: &str| {
            value.ok_or_else(|| ProcessingError::MissingFeature(name.to_string()))
        };

        Ok(FeatureVector {
            temp: require(self.temp, "temp")?,
            humidity: require(self.humidity, "humidity")?,
            wind_speed: require(self.wind_speed, "wind_speed")?,
            pressure: require(self.pressure, "pressure")?,
            clouds: require(self.clouds, "clouds")?,
            uv_index: self.uv_index.unwrap_or(SERVING_DEFAULT_UV_INDEX),
        })
    }
}

/// Look up a numeric value by path. Absent or null is `None`; numeric
/// strings are accepted; anything else is a format error.
fn number(payload: &Value, path: &[&str]) -> Result<Option<f64>> {
    let mut current = payload;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    match current {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            ProcessingError::InvalidFormat(format!(
                "Feature '{}' is not numeric: '{}'",
                path.join("."),
                s
            ))
        }),
        other => Err(ProcessingError::InvalidFormat(format!(
            "Feature '{}' is not numeric: {}",
            path.join("."),
            other
        ))),
    }
}
