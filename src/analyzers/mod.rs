pub mod dataset_analyzer;

pub use dataset_analyzer::{
    read_dataset_rows, DatasetAnalyzer, DatasetStatistics, FeatureRange, SourceSummary,
};
