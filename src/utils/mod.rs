pub mod constants;
pub mod filename;
pub mod progress;
pub mod units;

pub use constants::*;
pub use filename::{default_output_path, generate_dated_output_filename};
pub use progress::ProgressReporter;
