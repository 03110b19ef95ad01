//! Source adapters: one per known raw dataset schema.
//!
//! Each adapter maps its native columns onto [`CanonicalObservation`]s,
//! converting units and deriving the rain outcome the way its source
//! encodes it. Adding a dataset means adding an adapter and registering
//! it; existing adapters stay untouched.

pub mod classification;
pub mod forecast;
pub mod global_repository;
pub mod sample;
pub mod weather_history;

pub use classification::ClassificationAdapter;
pub use forecast::ForecastAdapter;
pub use global_repository::GlobalRepositoryAdapter;
pub use sample::SampleAdapter;
pub use weather_history::WeatherHistoryAdapter;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::CanonicalObservation;
use crate::processors::CloudEstimator;
use crate::readers::{RawTable, TableReader};
use crate::utils::constants::RAIN_KEYWORDS;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub trait SourceAdapter: Send + Sync {
    /// Provenance tag stamped on every record of this source
    fn name(&self) -> &'static str;

    /// Location of the source relative to the data directory
    fn default_location(&self) -> &'static str;

    /// Optional sources are skipped when their file does not exist
    fn is_optional(&self) -> bool {
        false
    }

    /// Convert a raw table. Fails only on schema mismatch; bad cells
    /// become missing fields for the cleaning stage to drop.
    fn adapt(&self, table: &RawTable) -> Result<Vec<CanonicalObservation>>;

    fn load(&self, path: &Path, reader: &TableReader) -> Result<Vec<CanonicalObservation>> {
        let table = reader.read(path)?;
        self.adapt(&table)
    }
}

/// An adapter bound to the file it reads
#[derive(Clone)]
pub struct SourceInput {
    pub adapter: Arc<dyn SourceAdapter>,
    pub path: PathBuf,
}

impl SourceInput {
    pub fn new(adapter: Arc<dyn SourceAdapter>, path: PathBuf) -> Self {
        Self { adapter, path }
    }

    pub fn name(&self) -> &'static str {
        self.adapter.name()
    }
}

impl std::fmt::Debug for SourceInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceInput")
            .field("adapter", &self.adapter.name())
            .field("path", &self.path)
            .finish()
    }
}

/// Known adapters in registration order. The order is the concatenation
/// order of the pool, so it decides which duplicate survives.
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    pub fn with_defaults(config: &PipelineConfig) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(ForecastAdapter::new()));
        registry.register(Arc::new(GlobalRepositoryAdapter::new()));
        registry.register(Arc::new(ClassificationAdapter::new()));
        registry.register(Arc::new(WeatherHistoryAdapter::new(
            CloudEstimator::new(),
            config.clouds.weather_history,
        )));
        registry.register(Arc::new(SampleAdapter::new()));
        registry
    }

    /// Register an adapter; a later registration with the same name replaces the earlier one in place
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        match self.adapters.iter().position(|a| a.name() == adapter.name()) {
            Some(index) => self.adapters[index] = adapter,
            None => self.adapters.push(adapter),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Bind every registered adapter not in `exclude` to its default file under `data_dir`
    pub fn sources_in(&self, data_dir: &Path, exclude: &[String]) -> Vec<SourceInput> {
        self.adapters
            .iter()
            .filter(|a| !exclude.iter().any(|name| name == a.name()))
            .map(|a| SourceInput::new(a.clone(), data_dir.join(a.default_location())))
            .collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults(&PipelineConfig::default())
    }
}

/// Explicit categorical label: "rain" / "no rain"; anything else is unknown
pub fn rain_from_label(text: Option<&str>) -> Option<bool> {
    match text?.trim().to_lowercase().as_str() {
        "rain" => Some(true),
        "no rain" => Some(false),
        _ => None,
    }
}

/// Free-text condition mentioning rain, drizzle, showers, storms or thunder
pub fn rain_from_condition(text: Option<&str>) -> bool {
    text.map(|t| t.to_lowercase())
        .is_some_and(|t| RAIN_KEYWORDS.iter().any(|k| t.contains(k)))
}

/// Precipitation-type field equal to "rain"
pub fn rain_from_precip_type(text: Option<&str>) -> bool {
    text.is_some_and(|t| t.trim().eq_ignore_ascii_case("rain"))
}

/// Loosely coded rain flag: numeric 0/1, booleans, yes/no or rain/no rain
pub fn parse_rain_flag(text: Option<&str>) -> Option<bool> {
    let text = text?.trim().to_lowercase();
    match text.as_str() {
        "1" | "true" | "yes" | "rain" => Some(true),
        "0" | "false" | "no" | "no rain" => Some(false),
        other => match other.parse::<f64>() {
            Ok(v) if v == 1.0 => Some(true),
            Ok(v) if v == 0.0 => Some(false),
            _ => None,
        },
    }
}

/// Ordinal cloud-cover buckets mapped to policy percentages
pub fn cloud_bucket_percent(text: Option<&str>) -> Option<f64> {
    match text?.trim().to_lowercase().as_str() {
        "clear" => Some(5.0),
        "partly cloudy" => Some(45.0),
        "cloudy" => Some(70.0),
        "overcast" => Some(95.0),
        _ => None,
    }
}
