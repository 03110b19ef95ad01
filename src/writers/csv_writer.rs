use crate::error::Result;
use crate::models::{output_columns, Dataset};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use crate::writers::staging_dir;
use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes a dataset as CSV. The file appears at `path` only once complete.
pub struct CsvWriter {
    buffer_size: usize,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn write_dataset(&self, dataset: &Dataset, path: &Path) -> Result<()> {
        let tmp = NamedTempFile::new_in(staging_dir(path))?;

        {
            let file = BufWriter::with_capacity(self.buffer_size, tmp.as_file());
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);

            // Header written explicitly so an empty dataset still has one
            writer.write_record(output_columns())?;
            for row in dataset.to_rows() {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }

        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        tracing::info!(rows = dataset.len(), path = %path.display(), "Wrote CSV dataset");
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
