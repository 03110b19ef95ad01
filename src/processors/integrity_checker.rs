use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{Dataset, LabeledObservation, Labels};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub valid_records: usize,
    pub violations: Vec<RecordViolation>,
    pub source_statistics: BTreeMap<String, SourceStatistics>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RecordViolation {
    pub row: usize,
    pub source: String,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    NonFinite,
    OutOfRange,
    NegativeWind,
    Duplicate,
    RainMismatch,
    LabelMismatch,
}

#[derive(Debug, Clone, Default)]
pub struct SourceStatistics {
    pub total_records: usize,
    pub violating_records: usize,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
}

/// Re-checks the labeled pool before it becomes a [`Dataset`]
pub struct IntegrityChecker {
    config: PipelineConfig,
}

impl IntegrityChecker {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn check_integrity(&self, records: &[LabeledObservation]) -> IntegrityReport {
        let mut report = IntegrityReport {
            total_records: records.len(),
            ..IntegrityReport::default()
        };
        let mut seen = HashSet::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            let before = report.violations.len();

            self.check_record(row, record, &mut report);

            let bits = |v: f64| (v + 0.0).to_bits();
            let key = (
                [
                    bits(record.temp),
                    bits(record.humidity),
                    bits(record.wind_speed),
                    bits(record.pressure),
                    bits(record.clouds),
                ],
                record.rain,
            );
            if !seen.insert(key) {
                push(
                    &mut report,
                    row,
                    record,
                    ViolationType::Duplicate,
                    "duplicate of an earlier row".to_string(),
                );
            }

            let violated = report.violations.len() > before;
            if !violated {
                report.valid_records += 1;
            }

            let stats = report
                .source_statistics
                .entry(record.source.clone())
                .or_default();
            stats.total_records += 1;
            if violated {
                stats.violating_records += 1;
            }
            stats.min_temp = Some(stats.min_temp.map_or(record.temp, |t| t.min(record.temp)));
            stats.max_temp = Some(stats.max_temp.map_or(record.temp, |t| t.max(record.temp)));
        }

        report
    }

    fn check_record(&self, row: usize, record: &LabeledObservation, report: &mut IntegrityReport) {
        let b = &self.config.bounds;

        if record.features().iter().any(|v| !v.is_finite()) {
            push(
                report,
                row,
                record,
                ViolationType::NonFinite,
                "feature value is missing or non-finite".to_string(),
            );
            return;
        }

        let ranges = [
            ("humidity", record.humidity, b.humidity_min, b.humidity_max),
            ("clouds", record.clouds, b.clouds_min, b.clouds_max),
            ("pressure", record.pressure, b.pressure_min, b.pressure_max),
            ("uv_index", record.uv_index, b.uv_min, f64::INFINITY),
        ];
        for (name, value, min, max) in ranges {
            if !(min..=max).contains(&value) {
                push(
                    report,
                    row,
                    record,
                    ViolationType::OutOfRange,
                    format!("{} {} is outside [{}, {}]", name, value, min, max),
                );
            }
        }

        if record.wind_speed < 0.0 {
            push(
                report,
                row,
                record,
                ViolationType::NegativeWind,
                format!("wind_speed {} is negative", record.wind_speed),
            );
        }

        if record.labels.rain != record.rain {
            push(
                report,
                row,
                record,
                ViolationType::RainMismatch,
                "label_rain differs from rain".to_string(),
            );
        }

        let expected = Labels::derive(
            record.rain,
            record.temp,
            record.uv_index,
            record.wind_speed,
            &self.config.thresholds,
        );
        if expected != record.labels {
            push(
                report,
                row,
                record,
                ViolationType::LabelMismatch,
                format!(
                    "labels {:?} do not match thresholds, expected {:?}",
                    record.labels.as_array(),
                    expected.as_array()
                ),
            );
        }
    }

    /// Seal the pool into a [`Dataset`], refusing it on any violation
    pub fn assemble(&self, records: Vec<LabeledObservation>) -> Result<Dataset> {
        let report = self.check_integrity(&records);

        if let Some(first) = report.violations.first() {
            tracing::error!(
                violations = report.violations.len(),
                "Labeled pool failed integrity check"
            );
            return Err(ProcessingError::InvariantViolation(format!(
                "{} violation(s); first at row {} ({}): {}",
                report.violations.len(),
                first.row,
                first.source,
                first.details
            )));
        }

        Ok(Dataset::sealed(records))
    }

    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Valid Records: {} ({:.1}%)\n",
            report.valid_records,
            percent(report.valid_records, report.total_records)
        ));
        summary.push_str(&format!("Violations: {}\n", report.violations.len()));

        if !report.source_statistics.is_empty() {
            summary.push_str("\nBy source:\n");
            for (source, stats) in &report.source_statistics {
                summary.push_str(&format!(
                    "  {}: {} records, {} violating",
                    source, stats.total_records, stats.violating_records
                ));
                if let (Some(min), Some(max)) = (stats.min_temp, stats.max_temp) {
                    summary.push_str(&format!(", temp {:.1} to {:.1}", min, max));
                }
                summary.push('\n');
            }
        }

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. Row {} ({}) {:?}: {}\n",
                    i + 1,
                    violation.row,
                    violation.source,
                    violation.violation_type,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

fn push(
    report: &mut IntegrityReport,
    row: usize,
    record: &LabeledObservation,
    violation_type: ViolationType,
    details: String,
) {
    report.violations.push(RecordViolation {
        row,
        source: record.source.clone(),
        violation_type,
        details,
    });
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}
