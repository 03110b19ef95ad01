use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-dataset-builder")]
#[command(about = "Builds a labeled weather training dataset from heterogeneous sources")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize, clean, deduplicate and label every source into one table
    Build {
        #[arg(short, long, default_value = "data", help = "Directory holding kaggle/ and samples/")]
        data_dir: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path [default: data/processed/weather_training.csv]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, help = "Output format: csv or parquet [default: from extension]")]
        format: Option<String>,

        #[arg(short, long, default_value = "snappy", help = "Parquet compression")]
        compression: String,

        #[arg(long, help = "TOML file overriding thresholds, bounds and fallbacks")]
        config: Option<PathBuf>,

        #[arg(long, value_name = "SOURCE", help = "Skip a source by name (repeatable)")]
        exclude: Vec<String>,

        #[arg(long, help = "Skip the optional sample source")]
        no_sample: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(long, help = "Memory-map source files instead of buffered reads")]
        use_mmap: bool,

        #[arg(long, help = "Name the output weather-training-{YYMMDD}.{ext}")]
        dated: bool,
    },

    /// Run the whole pipeline and report, without writing any output
    Validate {
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_name = "SOURCE")]
        exclude: Vec<String>,

        #[arg(long, help = "Skip the optional sample source")]
        no_sample: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Display statistics of a built dataset and check the training contract
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,

        #[arg(
            long,
            default_value = "0",
            help = "Maximum records to analyze (0 = all records)"
        )]
        analysis_limit: usize,
    },

    /// Coerce a JSON serving payload into the six-feature vector
    Features {
        #[arg(help = "JSON payload file; reads stdin when omitted")]
        payload: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let cli = Cli::parse_from(["weather-dataset-builder", "build"]);

        match cli.command {
            Commands::Build {
                data_dir,
                output_file,
                compression,
                exclude,
                no_sample,
                ..
            } => {
                assert_eq!(data_dir, PathBuf::from("data"));
                assert!(output_file.is_none());
                assert_eq!(compression, "snappy");
                assert!(exclude.is_empty());
                assert!(!no_sample);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_repeated_exclude_and_global_flags() {
        let cli = Cli::parse_from([
            "weather-dataset-builder",
            "build",
            "--exclude",
            "weather_history",
            "--exclude",
            "sample",
            "--verbose",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Build { exclude, .. } => {
                assert_eq!(exclude, vec!["weather_history", "sample"]);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_validate_accepts_no_sample() {
        let cli = Cli::parse_from(["weather-dataset-builder", "validate", "--no-sample"]);

        match cli.command {
            Commands::Validate {
                no_sample, exclude, ..
            } => {
                assert!(no_sample);
                assert!(exclude.is_empty());
            }
            _ => panic!("expected validate"),
        }
    }
}
