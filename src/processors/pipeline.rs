use crate::adapters::SourceInput;
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{CanonicalObservation, CleanObservation, Dataset};
use crate::processors::{
    AggregationStats, Aggregator, Cleaner, CleaningStats, IntegrityChecker, Labeler, UvResolution,
};
use crate::readers::TableReader;
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Loaded,
    /// Optional source whose file does not exist
    Skipped,
}

/// What happened to one source during a run
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub name: String,
    pub path: PathBuf,
    pub status: SourceStatus,
    pub cleaning: CleaningStats,
    /// Cleaned records per cloud origin
    pub cloud_origins: BTreeMap<&'static str, usize>,
}

impl SourceReport {
    fn skipped(input: &SourceInput) -> Self {
        Self {
            name: input.name().to_string(),
            path: input.path.clone(),
            status: SourceStatus::Skipped,
            cleaning: CleaningStats::default(),
            cloud_origins: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub dataset: Dataset,
    pub sources: Vec<SourceReport>,
    pub aggregation: AggregationStats,
    pub uv: UvResolution,
}

/// Runs adapters in parallel, then cleans, pools, labels and assembles
pub struct Pipeline {
    config: PipelineConfig,
    max_workers: usize,
    use_mmap: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            max_workers: num_cpus::get(),
            use_mmap: false,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build the dataset from the given sources. Results are collected in
    /// input order whatever order the adapters finish in.
    pub fn run(
        &self,
        sources: &[SourceInput],
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutput> {
        tracing::info!(
            sources = sources.len(),
            workers = self.max_workers,
            "Starting pipeline"
        );

        if let Some(p) = progress {
            p.set_message("Reading sources...");
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let reader = TableReader::with_mmap(self.use_mmap);
        let cleaner = Cleaner::new(self.config.bounds.clone());

        let loaded: Vec<Result<(SourceReport, Vec<CleanObservation>)>> = pool.install(|| {
            sources
                .par_iter()
                .map(|input| {
                    let result = self.load_source(input, &reader, &cleaner);
                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    result
                })
                .collect()
        });

        // First failure in registration order wins, independent of finishing order
        let loaded = loaded.into_iter().collect::<Result<Vec<_>>>()?;
        let (reports, batches): (Vec<_>, Vec<_>) = loaded.into_iter().unzip();

        if let Some(p) = progress {
            p.set_message("Pooling and labeling...");
        }

        let (dataset, aggregation, uv) = self.finish(batches)?;

        if let Some(p) = progress {
            p.finish_with_message(&format!("Built {} rows", dataset.len()));
        }

        Ok(PipelineOutput {
            dataset,
            sources: reports,
            aggregation,
            uv,
        })
    }

    /// Run the stages after adaptation on already-adapted batches,
    /// one batch per source in pooling order
    pub fn process_batches(
        &self,
        batches: Vec<(String, Vec<CanonicalObservation>)>,
    ) -> Result<Dataset> {
        let cleaner = Cleaner::new(self.config.bounds.clone());
        let cleaned = batches
            .into_iter()
            .map(|(source, records)| cleaner.clean(records, &source).0)
            .collect();

        let (dataset, _, _) = self.finish(cleaned)?;
        Ok(dataset)
    }

    fn load_source(
        &self,
        input: &SourceInput,
        reader: &TableReader,
        cleaner: &Cleaner,
    ) -> Result<(SourceReport, Vec<CleanObservation>)> {
        let name = input.name();

        if input.adapter.is_optional() && !input.path.exists() {
            tracing::warn!(
                source = name,
                path = %input.path.display(),
                "Optional source not found, skipping"
            );
            return Ok((SourceReport::skipped(input), Vec::new()));
        }

        let records = input
            .adapter
            .load(&input.path, reader)
            .map_err(|err| err.in_source(name, &input.path))?;
        let (cleaned, stats) = cleaner.clean(records, name);

        let mut cloud_origins = BTreeMap::new();
        for record in &cleaned {
            *cloud_origins.entry(record.cloud_origin.as_str()).or_insert(0) += 1;
        }

        tracing::info!(
            source = name,
            read = stats.input_records,
            kept = stats.kept_records,
            clipped = stats.clipped_records,
            "Loaded source"
        );

        let report = SourceReport {
            name: name.to_string(),
            path: input.path.clone(),
            status: SourceStatus::Loaded,
            cleaning: stats,
            cloud_origins,
        };

        Ok((report, cleaned))
    }

    fn finish(
        &self,
        batches: Vec<Vec<CleanObservation>>,
    ) -> Result<(Dataset, AggregationStats, UvResolution)> {
        let (pooled, aggregation) = Aggregator::new().aggregate(batches);

        let (labeled, uv) = Labeler::from_config(&self.config).label(pooled);

        let dataset = IntegrityChecker::new(self.config.clone()).assemble(labeled)?;

        tracing::info!(
            rows = dataset.len(),
            duplicates = aggregation.duplicates_removed,
            "Assembled dataset"
        );

        Ok((dataset, aggregation, uv))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
