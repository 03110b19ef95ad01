use serde::{Deserialize, Serialize};

/// How a cloud-cover value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudOrigin {
    Observed, // Numeric cloud-cover column
    Bucketed, // Ordinal category mapped through a fixed table
    Estimated, // Keyword match on a free-text description
    Fallback, // Nothing usable, fixed fallback value
}

impl CloudOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudOrigin::Observed => "observed",
            CloudOrigin::Bucketed => "bucketed",
            CloudOrigin::Estimated => "estimated",
            CloudOrigin::Fallback => "fallback",
        }
    }
}

/// One input row after adapter conversion. Fields stay optional here:
/// adapters never drop rows, cleaning decides what survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalObservation {
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
    pub clouds: Option<f64>,
    /// `None` is the "unknown" sentinel resolved by pool-wide imputation
    pub uv_index: Option<f64>,
    pub rain: Option<bool>,
    pub source: String,
    pub cloud_origin: CloudOrigin,
}

impl CanonicalObservation {
    pub fn new(source: &str) -> Self {
        Self {
            temp: None,
            humidity: None,
            wind_speed: None,
            pressure: None,
            clouds: None,
            uv_index: None,
            rain: None,
            source: source.to_string(),
            cloud_origin: CloudOrigin::Observed,
        }
    }

    pub fn temp(mut self, value: Option<f64>) -> Self {
        self.temp = value;
        self
    }

    pub fn humidity(mut self, value: Option<f64>) -> Self {
        self.humidity = value;
        self
    }

    pub fn wind_speed(mut self, value: Option<f64>) -> Self {
        self.wind_speed = value;
        self
    }

    pub fn pressure(mut self, value: Option<f64>) -> Self {
        self.pressure = value;
        self
    }

    pub fn clouds(mut self, value: Option<f64>, origin: CloudOrigin) -> Self {
        self.clouds = value;
        self.cloud_origin = origin;
        self
    }

    pub fn uv_index(mut self, value: Option<f64>) -> Self {
        self.uv_index = value;
        self
    }

    pub fn rain(mut self, value: Option<bool>) -> Self {
        self.rain = value;
        self
    }

    /// Names of the mandatory fields that are missing
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let checks = [
            (self.temp.is_none(), "temp"),
            (self.humidity.is_none(), "humidity"),
            (self.wind_speed.is_none(), "wind_speed"),
            (self.pressure.is_none(), "pressure"),
            (self.clouds.is_none(), "clouds"),
            (self.rain.is_none(), "rain"),
        ];
        for (is_missing, name) in checks {
            if is_missing {
                missing.push(name);
            }
        }
        missing
    }
}

/// A record that passed cleaning: all mandatory fields present and clipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanObservation {
    pub temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub clouds: f64,
    pub uv_index: Option<f64>,
    pub rain: bool,
    pub source: String,
    pub cloud_origin: CloudOrigin,
}

/// Exact-match identity of an observation across sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    temp: u64,
    humidity: u64,
    wind_speed: u64,
    pressure: u64,
    clouds: u64,
    rain: bool,
}

impl CleanObservation {
    pub fn dedup_key(&self) -> DedupKey {
        // Adding 0.0 folds -0.0 into 0.0 so both hash alike
        let bits = |v: f64| (v + 0.0).to_bits();
        DedupKey {
            temp: bits(self.temp),
            humidity: bits(self.humidity),
            wind_speed: bits(self.wind_speed),
            pressure: bits(self.pressure),
            clouds: bits(self.clouds),
            rain: self.rain,
        }
    }
}
