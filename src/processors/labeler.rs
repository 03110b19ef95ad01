use crate::config::{LabelThresholds, PipelineConfig, UvImputation};
use crate::models::{CleanObservation, LabeledObservation};

/// How missing UV values were filled for one pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvResolution {
    pub fill_value: f64,
    pub observed_count: usize,
    pub imputed_count: usize,
    pub from_median: bool,
}

/// Resolves UV across the whole pool, then applies the label thresholds
pub struct Labeler {
    thresholds: LabelThresholds,
    default_uv_index: f64,
}

impl Labeler {
    pub fn new(thresholds: LabelThresholds, imputation: &UvImputation) -> Self {
        Self {
            thresholds,
            default_uv_index: imputation.default_uv_index,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.thresholds.clone(), &config.imputation)
    }

    /// Median of the observed UV values in the pool, or the default when
    /// no record observed UV. Must see the final pooled set.
    pub fn resolve_uv(&self, records: &[CleanObservation]) -> UvResolution {
        let mut observed: Vec<f64> = records.iter().filter_map(|r| r.uv_index).collect();
        let observed_count = observed.len();
        let imputed_count = records.len() - observed_count;

        match median(&mut observed) {
            Some(value) => UvResolution {
                fill_value: value,
                observed_count,
                imputed_count,
                from_median: true,
            },
            None => UvResolution {
                fill_value: self.default_uv_index,
                observed_count,
                imputed_count,
                from_median: false,
            },
        }
    }

    pub fn label(&self, records: Vec<CleanObservation>) -> (Vec<LabeledObservation>, UvResolution) {
        let resolution = self.resolve_uv(&records);

        tracing::info!(
            fill_value = resolution.fill_value,
            observed = resolution.observed_count,
            imputed = resolution.imputed_count,
            from_median = resolution.from_median,
            "Resolved UV index"
        );

        let labeled = records
            .into_iter()
            .map(|record| {
                LabeledObservation::from_clean(record, resolution.fill_value, &self.thresholds)
            })
            .collect();

        (labeled, resolution)
    }
}

impl Default for Labeler {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Median; the mean of the two middle values for even counts
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;

    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
