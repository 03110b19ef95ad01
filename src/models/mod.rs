pub mod dataset;
pub mod feature_vector;
pub mod labeled;
pub mod observation;

pub use dataset::{output_columns, Dataset, DatasetRow};
pub use feature_vector::FeatureVector;
pub use labeled::{LabeledObservation, Labels};
pub use observation::{CanonicalObservation, CleanObservation, CloudOrigin, DedupKey};
