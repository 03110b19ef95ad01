use crate::utils::constants::{DEFAULT_DATA_DIR, DEFAULT_OUTPUT_FILE, PROCESSED_DIR};
use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Default output path: data/processed/weather_training.csv
pub fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
        .join(PROCESSED_DIR)
        .join(DEFAULT_OUTPUT_FILE)
}

/// Dated output filename with format: weather-training-{YYMMDD}.{extension}
pub fn generate_dated_output_filename(dir: &Path, extension: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "weather-training-{:02}{:02}{:02}.{}",
        year, month, day, extension
    );
    dir.join(filename)
}
