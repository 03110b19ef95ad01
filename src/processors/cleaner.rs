use crate::config::PhysicalBounds;
use crate::models::{CanonicalObservation, CleanObservation};
use rayon::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub input_records: usize,
    pub kept_records: usize,
    pub dropped_missing: usize,
    pub clipped_records: usize,
}

/// Enforces physical bounds on one adapter's output
pub struct Cleaner {
    bounds: PhysicalBounds,
}

impl Cleaner {
    pub fn new(bounds: PhysicalBounds) -> Self {
        Self { bounds }
    }

    /// Clean every record of one source, keeping input order
    pub fn clean(
        &self,
        records: Vec<CanonicalObservation>,
        source: &str,
    ) -> (Vec<CleanObservation>, CleaningStats) {
        let input_records = records.len();

        let results: Vec<Option<(CleanObservation, bool)>> = records
            .into_par_iter()
            .map(|record| self.clean_record(record, source))
            .collect();

        let mut stats = CleaningStats {
            input_records,
            ..CleaningStats::default()
        };
        let mut cleaned = Vec::with_capacity(input_records);

        for result in results {
            match result {
                Some((record, clipped)) => {
                    if clipped {
                        stats.clipped_records += 1;
                    }
                    cleaned.push(record);
                }
                None => stats.dropped_missing += 1,
            }
        }
        stats.kept_records = cleaned.len();

        if stats.dropped_missing > 0 {
            tracing::debug!(
                source,
                dropped = stats.dropped_missing,
                "Dropped records with missing mandatory fields"
            );
        }

        (cleaned, stats)
    }

    /// `None` when a mandatory field is missing or non-finite.
    /// The flag reports whether any value was clipped.
    pub fn clean_record(
        &self,
        record: CanonicalObservation,
        source: &str,
    ) -> Option<(CleanObservation, bool)> {
        let temp = finite(record.temp)?;
        let humidity = finite(record.humidity)?;
        let wind_speed = finite(record.wind_speed)?;
        let pressure = finite(record.pressure)?;
        let clouds = finite(record.clouds)?;
        let rain = record.rain?;
        let uv_index = finite(record.uv_index);

        let b = &self.bounds;
        let clean = CleanObservation {
            temp,
            humidity: clip(humidity, b.humidity_min, b.humidity_max),
            wind_speed,
            pressure: clip(pressure, b.pressure_min, b.pressure_max),
            clouds: clip(clouds, b.clouds_min, b.clouds_max),
            uv_index: uv_index.map(|uv| uv.max(b.uv_min)),
            rain,
            source: source.to_string(),
            cloud_origin: record.cloud_origin,
        };

        let clipped = clean.humidity != humidity
            || clean.pressure != pressure
            || clean.clouds != clouds
            || clean.uv_index != uv_index;

        Some((clean, clipped))
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(PhysicalBounds::default())
    }
}

/// Infinite values count as missing
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn clip(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
