use crate::adapters::{AdapterRegistry, SourceInput};
use crate::analyzers::{read_dataset_rows, DatasetAnalyzer};
use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::FeatureVector;
use crate::processors::{IntegrityChecker, Pipeline, PipelineOutput, SourceStatus};
use crate::readers::DatasetReader;
use crate::utils::constants::{DEFAULT_DATA_DIR, PROCESSED_DIR};
use crate::utils::filename::{default_output_path, generate_dated_output_filename};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, OutputFormat, ParquetWriter};
use std::io::Read;
use std::path::{Path, PathBuf};

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build {
            data_dir,
            output_file,
            format,
            compression,
            config,
            exclude,
            no_sample,
            max_workers,
            use_mmap,
            dated,
        } => {
            let exclude = excluded_sources(exclude, no_sample);
            let config = PipelineConfig::load(config.as_deref())?;
            let format = match format {
                Some(f) => OutputFormat::parse(&f)?,
                None => output_file
                    .as_deref()
                    .map(OutputFormat::from_path)
                    .unwrap_or(OutputFormat::Csv),
            };
            let output_file = resolve_output_path(output_file, format, dated);

            println!("Building weather training dataset...");
            println!("Data directory: {}", data_dir.display());
            println!("Output file: {}", output_file.display());
            println!("Workers: {}", max_workers);

            // Built before running so a bad compression name fails early
            let parquet_writer = ParquetWriter::new().with_compression(&compression)?;

            let sources = AdapterRegistry::with_defaults(&config).sources_in(&data_dir, &exclude);
            let pipeline = Pipeline::new(config)
                .with_max_workers(max_workers)
                .with_mmap(use_mmap);
            let output = run_pipeline(pipeline, sources).await?;

            print_run_report(&output);

            if let Some(parent) = output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }

            println!(
                "\nWriting {} records to {}...",
                output.dataset.len(),
                output_file.display()
            );
            match format {
                OutputFormat::Csv => CsvWriter::new().write_dataset(&output.dataset, &output_file)?,
                OutputFormat::Parquet => {
                    parquet_writer.write_dataset(&output.dataset, &output_file)?;
                    let file_info = parquet_writer.get_file_info(&output_file)?;
                    println!("\n{}", file_info.summary());
                }
            }

            println!("Build complete!");
        }

        Commands::Validate {
            data_dir,
            config,
            exclude,
            no_sample,
            max_workers,
        } => {
            let exclude = excluded_sources(exclude, no_sample);
            println!("Validating weather sources...");
            println!("Data directory: {}", data_dir.display());

            let config = PipelineConfig::load(config.as_deref())?;
            let checker = IntegrityChecker::new(config.clone());
            let sources = AdapterRegistry::with_defaults(&config).sources_in(&data_dir, &exclude);
            let pipeline = Pipeline::new(config).with_max_workers(max_workers);

            let output = run_pipeline(pipeline, sources).await?;

            print_run_report(&output);

            let report = checker.check_integrity(output.dataset.rows());
            println!("\n{}", checker.generate_summary(&report));
            println!("All sources passed validation, no output file written");
        }

        Commands::Info {
            file,
            sample,
            analysis_limit,
        } => {
            println!("Analyzing dataset: {}", file.display());

            let stats = DatasetAnalyzer::new().analyze_file(&file, analysis_limit)?;
            println!("\n{}", stats.detailed_summary());

            if OutputFormat::from_path(&file) == OutputFormat::Parquet {
                let file_info = ParquetWriter::new().get_file_info(&file)?;
                println!("File Details:");
                println!("{}", file_info.summary());
            }

            let training = DatasetReader::new().load(&file)?;
            println!(
                "\nTraining contract: {} usable rows, {} dropped for missing features",
                training.len(),
                training.dropped_rows
            );

            if sample > 0 {
                println!("\nSample Records (showing up to {} records):", sample);
                match read_dataset_rows(&file, sample) {
                    Ok(rows) => {
                        for (i, row) in rows.iter().enumerate() {
                            println!(
                                "{}. [{}] temp={:.1}°C hum={:.0}% wind={:.1}m/s p={:.0}hPa clouds={:.0}% uv={:.1} labels={:?}",
                                i + 1,
                                row.source,
                                row.temp,
                                row.humidity,
                                row.wind_speed,
                                row.pressure,
                                row.clouds,
                                row.uv_index,
                                row.labels()
                            );
                        }
                    }
                    Err(e) => println!("Error reading sample data: {}", e),
                }
            }
        }

        Commands::Features { payload } => {
            let text = match payload {
                Some(path) => std::fs::read_to_string(&path)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };

            let value: serde_json::Value = serde_json::from_str(&text)?;
            let features = FeatureVector::from_payload(&value)?;
            println!("{}", serde_json::to_string_pretty(&features)?);
        }
    }

    Ok(())
}

/// The pipeline is CPU-bound; keep it off the async runtime threads
async fn run_pipeline(pipeline: Pipeline, sources: Vec<SourceInput>) -> Result<PipelineOutput> {
    tokio::task::spawn_blocking(move || {
        let progress = ProgressReporter::for_sources(sources.len() as u64, false);
        pipeline.run(&sources, Some(&progress))
    })
    .await?
}

/// Sources to leave out of a run; `--no-sample` is shorthand for excluding "sample"
pub fn excluded_sources(mut exclude: Vec<String>, no_sample: bool) -> Vec<String> {
    if no_sample && !exclude.iter().any(|name| name == "sample") {
        exclude.push("sample".to_string());
    }
    exclude
}

/// Explicit path, or the default location; `dated` swaps in a dated file name
/// in the same directory. The default file takes the format's extension.
pub fn resolve_output_path(
    output_file: Option<PathBuf>,
    format: OutputFormat,
    dated: bool,
) -> PathBuf {
    let base = output_file
        .unwrap_or_else(|| default_output_path().with_extension(format.extension()));

    if !dated {
        return base;
    }

    let dir = base
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR).join(PROCESSED_DIR));
    generate_dated_output_filename(&dir, format.extension())
}

fn print_run_report(output: &PipelineOutput) {
    println!("\nSources:");
    for source in &output.sources {
        match source.status {
            SourceStatus::Skipped => {
                println!("  {}: skipped ({} not found)", source.name, source.path.display())
            }
            SourceStatus::Loaded => {
                let origins: Vec<String> = source
                    .cloud_origins
                    .iter()
                    .map(|(origin, count)| format!("{} {}", count, origin))
                    .collect();
                println!(
                    "  {}: {} read, {} kept, {} dropped, {} clipped; clouds: {}",
                    source.name,
                    source.cleaning.input_records,
                    source.cleaning.kept_records,
                    source.cleaning.dropped_missing,
                    source.cleaning.clipped_records,
                    origins.join(", ")
                );
            }
        }
    }

    let agg = &output.aggregation;
    println!(
        "\nPooled {} records: {} duplicates removed, {} negative wind, {} missing pressure",
        agg.pooled_records,
        agg.duplicates_removed,
        agg.rejected_negative_wind,
        agg.rejected_missing_pressure
    );

    if output.uv.from_median {
        println!(
            "UV index: {} observed, {} filled with pool median {:.2}",
            output.uv.observed_count, output.uv.imputed_count, output.uv.fill_value
        );
    } else {
        println!(
            "UV index: none observed, {} filled with default {:.2}",
            output.uv.imputed_count, output.uv.fill_value
        );
    }

    println!("Dataset rows: {}", output.dataset.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_sources() {
        assert!(excluded_sources(Vec::new(), false).is_empty());
        assert_eq!(excluded_sources(Vec::new(), true), vec!["sample"]);
        assert_eq!(
            excluded_sources(vec!["sample".to_string()], true),
            vec!["sample"]
        );
        assert_eq!(
            excluded_sources(vec!["weather_history".to_string()], true),
            vec!["weather_history", "sample"]
        );
    }

    #[test]
    fn test_resolve_output_path() {
        assert_eq!(
            resolve_output_path(None, OutputFormat::Csv, false),
            PathBuf::from("data/processed/weather_training.csv")
        );
        assert_eq!(
            resolve_output_path(None, OutputFormat::Parquet, false),
            PathBuf::from("data/processed/weather_training.parquet")
        );
        assert_eq!(
            resolve_output_path(Some(PathBuf::from("out/x.csv")), OutputFormat::Csv, false),
            PathBuf::from("out/x.csv")
        );

        let dated = resolve_output_path(Some(PathBuf::from("out/x.csv")), OutputFormat::Csv, true);
        assert_eq!(dated.parent(), Some(Path::new("out")));
        assert!(dated
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("weather-training-") && n.ends_with(".csv")));
    }
}
