use crate::models::CleanObservation;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationStats {
    pub pooled_records: usize,
    pub duplicates_removed: usize,
    pub rejected_negative_wind: usize,
    pub rejected_missing_pressure: usize,
    pub output_records: usize,
    /// Duplicates dropped, keyed by the provenance of the dropped record
    pub duplicates_by_source: BTreeMap<String, usize>,
}

/// Pools the cleaned output of every source into one deduplicated sequence
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Concatenate batches in the given order, drop exact duplicates
    /// (first seen wins), then re-check wind and pressure.
    pub fn aggregate(
        &self,
        batches: Vec<Vec<CleanObservation>>,
    ) -> (Vec<CleanObservation>, AggregationStats) {
        let pooled: Vec<CleanObservation> = batches.into_iter().flatten().collect();

        let mut stats = AggregationStats {
            pooled_records: pooled.len(),
            ..AggregationStats::default()
        };

        let deduplicated = self.deduplicate(pooled, &mut stats);

        let mut output = Vec::with_capacity(deduplicated.len());
        for record in deduplicated {
            if record.wind_speed < 0.0 {
                stats.rejected_negative_wind += 1;
                continue;
            }
            if !record.pressure.is_finite() {
                stats.rejected_missing_pressure += 1;
                continue;
            }
            output.push(record);
        }
        stats.output_records = output.len();

        tracing::debug!(
            pooled = stats.pooled_records,
            duplicates = stats.duplicates_removed,
            negative_wind = stats.rejected_negative_wind,
            "Aggregated sources"
        );

        (output, stats)
    }

    fn deduplicate(
        &self,
        records: Vec<CleanObservation>,
        stats: &mut AggregationStats,
    ) -> Vec<CleanObservation> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut unique = Vec::with_capacity(records.len());

        for record in records {
            if seen.insert(record.dedup_key()) {
                unique.push(record);
            } else {
                stats.duplicates_removed += 1;
                *stats
                    .duplicates_by_source
                    .entry(record.source.clone())
                    .or_default() += 1;
            }
        }

        unique
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CloudOrigin;

    fn obs(source: &str, temp: f64, wind_speed: f64) -> CleanObservation {
        CleanObservation {
            temp,
            humidity: 50.0,
            wind_speed,
            pressure: 1013.0,
            clouds: 40.0,
            uv_index: None,
            rain: false,
            source: source.to_string(),
            cloud_origin: CloudOrigin::Observed,
        }
    }

    #[test]
    fn test_first_occurrence_wins_across_sources() {
        let mut with_uv = obs("b", 20.0, 3.0);
        with_uv.uv_index = Some(8.0);

        let (records, stats) = Aggregator::new().aggregate(vec![
            vec![obs("a", 20.0, 3.0), obs("a", 21.0, 3.0)],
            vec![with_uv, obs("b", 22.0, 3.0)],
        ]);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].source, "a");
        assert_eq!(records[0].uv_index, None);
        assert_eq!(stats.duplicates_removed, 1);
        assert_eq!(stats.duplicates_by_source.get("b"), Some(&1));
    }

    #[test]
    fn test_rain_is_part_of_the_key() {
        let mut rainy = obs("a", 20.0, 3.0);
        rainy.rain = true;

        let (records, stats) = Aggregator::new().aggregate(vec![vec![obs("a", 20.0, 3.0), rainy]]);

        assert_eq!(records.len(), 2);
        assert_eq!(stats.duplicates_removed, 0);
    }

    #[test]
    fn test_negative_wind_rejected_after_dedup() {
        let (records, stats) = Aggregator::new().aggregate(vec![
            vec![obs("a", 20.0, -2.0), obs("a", 20.0, -2.0)],
            vec![obs("b", 25.0, 0.0)],
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "b");
        assert_eq!(stats.duplicates_removed, 1);
        assert_eq!(stats.rejected_negative_wind, 1);
        assert_eq!(stats.output_records, 1);
    }

    #[test]
    fn test_non_finite_pressure_rejected() {
        let mut broken = obs("a", 20.0, 1.0);
        broken.pressure = f64::NAN;

        let (records, stats) = Aggregator::new().aggregate(vec![vec![broken]]);

        assert!(records.is_empty());
        assert_eq!(stats.rejected_missing_pressure, 1);
    }
}
