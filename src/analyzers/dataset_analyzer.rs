use crate::error::{ProcessingError, Result};
use crate::models::DatasetRow;
use crate::utils::constants::{FEATURE_COLUMNS, LABEL_COLUMNS};
use crate::writers::{OutputFormat, ParquetWriter};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Rows and positive-label rates of one provenance tag
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSummary {
    pub rows: usize,
    pub label_rates: [f64; 5],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStatistics {
    pub total_records: usize,
    pub label_rates: [f64; 5],
    pub feature_ranges: [FeatureRange; 6],
    pub sources: BTreeMap<String, SourceSummary>,
}

impl DatasetStatistics {
    pub fn detailed_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Dataset Summary ===\n");
        summary.push_str(&format!("Total Records: {}\n", self.total_records));

        summary.push_str("\nFeatures:\n");
        for (name, range) in FEATURE_COLUMNS.iter().zip(self.feature_ranges.iter()) {
            summary.push_str(&format!(
                "  {:<12} min {:>8.2}  max {:>8.2}  mean {:>8.2}\n",
                name, range.min, range.max, range.mean
            ));
        }

        summary.push_str("\nLabel rates:\n");
        for (name, rate) in LABEL_COLUMNS.iter().zip(self.label_rates.iter()) {
            summary.push_str(&format!("  {:<14} {:>5.1}%\n", name, rate * 100.0));
        }

        summary.push_str("\nBy source:\n");
        for (source, stats) in &self.sources {
            let rates: Vec<String> = stats
                .label_rates
                .iter()
                .map(|r| format!("{:.2}", r))
                .collect();
            summary.push_str(&format!(
                "  {} ({} rows): {}\n",
                source,
                stats.rows,
                rates.join(" / ")
            ));
        }

        summary
    }
}

pub struct DatasetAnalyzer;

impl DatasetAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Read a built dataset (CSV or Parquet) and analyze up to `limit` rows; 0 means all
    pub fn analyze_file(&self, path: &Path, limit: usize) -> Result<DatasetStatistics> {
        let rows = read_dataset_rows(path, limit)?;
        self.analyze(&rows)
    }

    pub fn analyze(&self, rows: &[DatasetRow]) -> Result<DatasetStatistics> {
        if rows.is_empty() {
            return Err(ProcessingError::InvalidFormat(
                "No records to analyze".to_string(),
            ));
        }

        let mut label_totals = [0usize; 5];
        let mut per_source: BTreeMap<String, (usize, [usize; 5])> = BTreeMap::new();
        let mut mins = [f64::INFINITY; 6];
        let mut maxs = [f64::NEG_INFINITY; 6];
        let mut sums = [0.0f64; 6];

        for row in rows {
            let features = [
                row.temp,
                row.humidity,
                row.wind_speed,
                row.pressure,
                row.clouds,
                row.uv_index,
            ];
            for (i, value) in features.iter().enumerate() {
                mins[i] = mins[i].min(*value);
                maxs[i] = maxs[i].max(*value);
                sums[i] += value;
            }

            let entry = per_source.entry(row.source.clone()).or_default();
            entry.0 += 1;
            for (i, label) in row.labels().iter().enumerate() {
                label_totals[i] += *label as usize;
                entry.1[i] += *label as usize;
            }
        }

        let total = rows.len();
        let feature_ranges = std::array::from_fn(|i| FeatureRange {
            min: mins[i],
            max: maxs[i],
            mean: sums[i] / total as f64,
        });

        let sources = per_source
            .into_iter()
            .map(|(source, (count, positives))| {
                let summary = SourceSummary {
                    rows: count,
                    label_rates: rates(&positives, count),
                };
                (source, summary)
            })
            .collect();

        Ok(DatasetStatistics {
            total_records: total,
            label_rates: rates(&label_totals, total),
            feature_ranges,
            sources,
        })
    }
}

impl Default for DatasetAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn rates(positives: &[usize; 5], total: usize) -> [f64; 5] {
    positives.map(|p| p as f64 / total as f64)
}

/// Rows of a written dataset, format chosen by extension; `limit` 0 reads all
pub fn read_dataset_rows(path: &Path, limit: usize) -> Result<Vec<DatasetRow>> {
    let limit = if limit == 0 { usize::MAX } else { limit };

    match OutputFormat::from_path(path) {
        OutputFormat::Parquet => ParquetWriter::new().read_rows(path, limit),
        OutputFormat::Csv => {
            let mut reader = csv::Reader::from_path(path)?;
            let mut rows = Vec::new();
            for row in reader.deserialize().take(limit) {
                rows.push(row?);
            }
            Ok(rows)
        }
    }
}
