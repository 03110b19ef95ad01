pub mod dataset_reader;
pub mod table_reader;

pub use dataset_reader::{DatasetReader, TrainingSet};
pub use table_reader::{decode_text, parse_number, Column, RawTable, TableReader};
