pub mod aggregator;
pub mod cleaner;
pub mod cloud_estimator;
pub mod integrity_checker;
pub mod labeler;
pub mod pipeline;

pub use aggregator::{AggregationStats, Aggregator};
pub use cleaner::{Cleaner, CleaningStats};
pub use cloud_estimator::{CloudEstimator, KeywordRule};
pub use integrity_checker::{
    IntegrityChecker, IntegrityReport, RecordViolation, SourceStatistics, ViolationType,
};
pub use labeler::{median, Labeler, UvResolution};
pub use pipeline::{Pipeline, PipelineOutput, SourceReport, SourceStatus};
