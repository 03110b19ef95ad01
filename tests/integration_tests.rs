use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use weather_dataset_builder::adapters::{
    AdapterRegistry, ForecastAdapter, SampleAdapter, SourceAdapter, SourceInput,
};
use weather_dataset_builder::analyzers::DatasetAnalyzer;
use weather_dataset_builder::config::{LabelThresholds, PipelineConfig};
use weather_dataset_builder::models::FeatureVector;
use weather_dataset_builder::processors::{Pipeline, PipelineOutput, SourceStatus};
use weather_dataset_builder::readers::DatasetReader;
use weather_dataset_builder::writers::{CsvWriter, ParquetWriter};
use weather_dataset_builder::ProcessingError;

const FORECAST: &str = "Temperature,Humidity,Wind_Speed,Cloud_Cover,Pressure,Rain\n\
    31,40,3,95,1013,rain\n\
    12,80,11,60,1005,no rain\n";

const GLOBAL: &str = "country,temperature_celsius,condition_text,wind_kph,pressure_mb,humidity,cloud\n\
    Spain,25,Sunny,18,1008,60,30\n";

const CLASSIFICATION: &str = "Temperature,Humidity,Wind Speed,Cloud Cover,Atmospheric Pressure,UV Index,Weather Type\n\
    20,50,4,overcast,1012,8,Rainy\n\
    22,55,2,clear,1015,2,Sunny\n";

const HISTORY: &str = "Formatted Date,Summary,Precip Type,Temperature (C),Humidity,Wind Speed (km/h),Loud Cover,Pressure (millibars)\n\
    2006-04-01,Partly Cloudy,rain,9.5,0.89,36,0,1015.13\n\
    2006-04-02,Foggy,snow,-2,0.95,7.2,0,1020\n";

const SAMPLE: &str = "temp,humidity,wind_speed,pressure,clouds,rain\n\
    31,40,3,1013,95,1\n\
    31,150,-2,1013,,rain\n";

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "kaggle/weather_forecast_data.csv", FORECAST);
    write(dir.path(), "kaggle/GlobalWeatherRepository.csv", GLOBAL);
    write(dir.path(), "kaggle/weather_classification_data.csv", CLASSIFICATION);
    write(dir.path(), "kaggle/weatherHistory.csv", HISTORY);
    write(dir.path(), "samples/weather_sample.csv", SAMPLE);
    dir
}

fn build(dir: &Path, exclude: &[&str]) -> weather_dataset_builder::Result<PipelineOutput> {
    let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
    let sources = AdapterRegistry::default().sources_in(dir, &exclude);
    Pipeline::default().with_max_workers(4).run(&sources, None)
}

#[test]
fn test_two_source_scenario_keeps_only_valid_row() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "invalid.csv",
        "Temperature,Humidity,Wind_Speed,Cloud_Cover,Pressure,Rain\n31,150,-2,95,1013,rain\n",
    );
    write(
        dir.path(),
        "valid.csv",
        "temp,humidity,wind_speed,pressure,clouds,rain\n31,40,3,1013,95,1\n",
    );

    let forecast: Arc<dyn SourceAdapter> = Arc::new(ForecastAdapter::new());
    let sample: Arc<dyn SourceAdapter> = Arc::new(SampleAdapter::new());
    let sources = vec![
        SourceInput::new(forecast, dir.path().join("invalid.csv")),
        SourceInput::new(sample, dir.path().join("valid.csv")),
    ];

    let output = Pipeline::default().run(&sources, None).unwrap();

    assert_eq!(output.aggregation.rejected_negative_wind, 1);
    assert_eq!(output.dataset.len(), 1);

    let out_path = dir.path().join("out.csv");
    CsvWriter::new()
        .write_dataset(&output.dataset, &out_path)
        .unwrap();

    let rows = DatasetAnalyzer::new().analyze_file(&out_path, 0).unwrap();
    assert_eq!(rows.total_records, 1);

    let training = DatasetReader::new().load(&out_path).unwrap();
    assert_eq!(training.features, vec![[31.0, 40.0, 3.0, 1013.0, 95.0, 3.0]]);
    // label_rain, label_hot, label_cold, label_uv_high, label_windy
    assert_eq!(training.labels, vec![[1, 1, 0, 0, 0]]);
    assert_eq!(training.sources, Some(vec!["sample".to_string()]));
}

#[test]
fn test_all_sources_pooled_in_registration_order() {
    let dir = data_dir();
    let output = build(dir.path(), &[]).unwrap();
    let rows = output.dataset.rows();

    let sources: Vec<&str> = rows.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(
        sources,
        vec![
            "weather_forecast_data",
            "weather_forecast_data",
            "global_weather_repository",
            "weather_classification_data",
            "weather_classification_data",
            "weather_history",
            "weather_history",
        ]
    );

    // The sample duplicate of the first forecast row loses to it
    assert_eq!(output.aggregation.duplicates_removed, 1);
    assert_eq!(output.aggregation.duplicates_by_source.get("sample"), Some(&1));
    let sample = output.sources.iter().find(|s| s.name == "sample").unwrap();
    assert_eq!(sample.cleaning.dropped_missing, 1);

    // Observed UV 8 and 2 give a pool median of 5
    assert!(output.uv.from_median);
    assert_eq!(output.uv.fill_value, 5.0);
    assert_eq!(rows[2].uv_index, 5.0);
    assert!(rows[2].labels.uv_high);
    assert_eq!(rows[2].wind_speed, 5.0);
    assert!(!rows[4].labels.uv_high);

    let history = &rows[5];
    assert_eq!(history.wind_speed, 10.0);
    assert_eq!(history.clouds, 55.0);
    assert!(history.labels.windy && history.labels.cold && history.labels.rain);
    assert!((history.humidity - 89.0).abs() < 1e-9);
    assert_eq!(rows[6].clouds, 85.0);

    let origins = &output
        .sources
        .iter()
        .find(|s| s.name == "weather_history")
        .unwrap()
        .cloud_origins;
    assert_eq!(origins.get("estimated"), Some(&2));
}

#[test]
fn test_output_invariants_hold() {
    let dir = data_dir();
    let output = build(dir.path(), &[]).unwrap();

    let mut seen = HashSet::new();
    for row in output.dataset.to_rows() {
        assert!((0.0..=100.0).contains(&row.humidity));
        assert!((0.0..=100.0).contains(&row.clouds));
        assert!((870.0..=1100.0).contains(&row.pressure));
        assert!(row.wind_speed >= 0.0);
        assert!(row.uv_index >= 0.0);
        assert_eq!(row.label_rain, row.rain);
        assert!(row.labels().iter().all(|&l| l <= 1));

        let key = (
            row.temp.to_bits(),
            row.humidity.to_bits(),
            row.wind_speed.to_bits(),
            row.pressure.to_bits(),
            row.clouds.to_bits(),
            row.rain,
        );
        assert!(seen.insert(key), "duplicate row {:?}", row);
    }
}

#[test]
fn test_runs_are_idempotent() {
    let dir = data_dir();
    let first = build(dir.path(), &[]).unwrap();
    let second = build(dir.path(), &[]).unwrap();

    assert_eq!(first.dataset.to_rows(), second.dataset.to_rows());

    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    CsvWriter::new().write_dataset(&first.dataset, &a).unwrap();
    CsvWriter::new().write_dataset(&second.dataset, &b).unwrap();
    assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
}

#[test]
fn test_uv_fill_depends_on_included_sources() {
    let dir = data_dir();
    let output = build(dir.path(), &["weather_classification_data"]).unwrap();

    assert!(!output.uv.from_median);
    assert_eq!(output.uv.fill_value, 3.0);
    assert!(output.dataset.rows().iter().all(|r| r.uv_index == 3.0));
}

#[test]
fn test_missing_optional_sample_is_skipped() {
    let dir = data_dir();
    fs::remove_file(dir.path().join("samples/weather_sample.csv")).unwrap();

    let output = build(dir.path(), &[]).unwrap();

    let sample = output.sources.iter().find(|s| s.name == "sample").unwrap();
    assert_eq!(sample.status, SourceStatus::Skipped);
    assert_eq!(output.dataset.len(), 7);
    assert_eq!(output.aggregation.duplicates_removed, 0);
}

#[test]
fn test_missing_required_source_names_source_and_path() {
    let dir = data_dir();
    let history = dir.path().join("kaggle/weatherHistory.csv");
    fs::remove_file(&history).unwrap();

    let err = match build(dir.path(), &[]) {
        Err(err) => err,
        Ok(output) => panic!("expected failure, got {} rows", output.dataset.len()),
    };

    let message = err.to_string();
    assert!(message.contains("weather_history"), "{}", message);
    assert!(message.contains("weatherHistory.csv"), "{}", message);
    match err {
        ProcessingError::Source {
            source_name,
            path,
            inner,
        } => {
            assert_eq!(source_name, "weather_history");
            assert_eq!(path, history);
            assert!(matches!(*inner, ProcessingError::Io(_)));
        }
        other => panic!("expected source error, got {:?}", other),
    }
}

#[test]
fn test_header_drift_names_source_and_column() {
    let dir = data_dir();
    write(
        dir.path(),
        "kaggle/weather_forecast_data.csv",
        "Temperature,Humidity,Wind_Speed,Cloud_Cover,Rain\n31,40,3,95,rain\n",
    );

    match build(dir.path(), &[]) {
        Err(ProcessingError::Schema {
            source_name,
            column,
        }) => {
            assert_eq!(source_name, "weather_forecast_data");
            assert_eq!(column, "Pressure");
        }
        other => panic!("expected schema error, got {:?}", other.map(|o| o.dataset.len())),
    }
}

#[test]
fn test_parquet_output_round_trip() {
    let dir = data_dir();
    let output = build(dir.path(), &[]).unwrap();
    let path = dir.path().join("processed/weather_training.parquet");
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    ParquetWriter::new()
        .with_compression("zstd")
        .unwrap()
        .write_dataset(&output.dataset, &path)
        .unwrap();

    let info = ParquetWriter::new().get_file_info(&path).unwrap();
    assert_eq!(info.total_rows, 7);

    let stats = DatasetAnalyzer::new().analyze_file(&path, 0).unwrap();
    assert_eq!(stats.total_records, 7);
    assert_eq!(stats.sources["weather_forecast_data"].rows, 2);

    let training = DatasetReader::new().load(&path).unwrap();
    assert_eq!(training.len(), 7);
    assert_eq!(training.dropped_rows, 0);
    assert_eq!(training.labels[0], [1, 1, 0, 1, 0]);
}

#[test]
fn test_threshold_override_changes_labels_only() {
    let dir = data_dir();
    let config = PipelineConfig::default().with_thresholds(LabelThresholds {
        hot: 25.0,
        ..LabelThresholds::default()
    });
    let sources = AdapterRegistry::with_defaults(&config).sources_in(dir.path(), &[]);

    let output = Pipeline::new(config).run(&sources, None).unwrap();
    let global = &output.dataset.rows()[2];

    assert_eq!(global.temp, 25.0);
    assert!(global.labels.hot);
    assert_eq!(output.dataset.len(), 7);
}

#[test]
fn test_serving_payload_coercion() {
    let payload = json!({
        "current": {
            "temp_c": 31.0,
            "humidity": 40,
            "wind_kph": 18.0,
            "pressure_mb": 1013.0,
            "cloud": 95
        }
    });

    let features = FeatureVector::from_payload(&payload).unwrap();
    assert_eq!(features.to_array(), [31.0, 40.0, 5.0, 1013.0, 95.0, 0.0]);

    let incomplete = json!({"temp": 20.0, "humidity": 50.0, "wind_speed": 2.0, "pressure": 1000.0});
    assert!(matches!(
        FeatureVector::from_payload(&incomplete),
        Err(ProcessingError::MissingFeature(_))
    ));
}
