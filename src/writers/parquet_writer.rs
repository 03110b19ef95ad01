use crate::error::{ProcessingError, Result};
use crate::models::{Dataset, DatasetRow};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use crate::writers::staging_dir;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Write the dataset through a temporary file renamed into place on success
    pub fn write_dataset(&self, dataset: &Dataset, path: &Path) -> Result<()> {
        let schema = Self::create_schema();
        let rows = dataset.to_rows();

        let tmp = NamedTempFile::new_in(staging_dir(path))?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(tmp.as_file().try_clone()?, schema.clone(), Some(props))?;
        for chunk in rows.chunks(self.row_group_size) {
            let batch = Self::rows_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        tracing::info!(rows = rows.len(), path = %path.display(), "Wrote Parquet dataset");
        Ok(())
    }

    /// Output schema; field order is the dataset column order
    pub fn create_schema() -> Arc<Schema> {
        let float = |name: &str| Field::new(name, DataType::Float64, false);
        let flag = |name: &str| Field::new(name, DataType::UInt8, false);

        Arc::new(Schema::new(vec![
            float("temp"),
            float("humidity"),
            float("wind_speed"),
            float("pressure"),
            float("clouds"),
            float("uv_index"),
            flag("rain"),
            Field::new("source", DataType::Utf8, false),
            flag("label_rain"),
            flag("label_hot"),
            flag("label_cold"),
            flag("label_uv_high"),
            flag("label_windy"),
        ]))
    }

    fn rows_to_batch(rows: &[DatasetRow], schema: Arc<Schema>) -> Result<RecordBatch> {
        let floats = |f: fn(&DatasetRow) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
        };
        let flags = |f: fn(&DatasetRow) -> u8| -> ArrayRef {
            Arc::new(UInt8Array::from(rows.iter().map(f).collect::<Vec<_>>()))
        };
        let sources: ArrayRef = Arc::new(StringArray::from(
            rows.iter().map(|r| r.source.as_str()).collect::<Vec<_>>(),
        ));

        let batch = RecordBatch::try_new(
            schema,
            vec![
                floats(|r| r.temp),
                floats(|r| r.humidity),
                floats(|r| r.wind_speed),
                floats(|r| r.pressure),
                floats(|r| r.clouds),
                floats(|r| r.uv_index),
                flags(|r| r.rain),
                sources,
                flags(|r| r.label_rain),
                flags(|r| r.label_hot),
                flags(|r| r.label_cold),
                flags(|r| r.label_uv_high),
                flags(|r| r.label_windy),
            ],
        )?;

        Ok(batch)
    }

    /// Read up to `limit` rows back, locating columns by name
    pub fn read_rows(&self, path: &Path, limit: usize) -> Result<Vec<DatasetRow>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.clamp(1, 8192))
            .build()?;

        let mut rows = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;

            let temp = float_column(&batch, "temp")?;
            let humidity = float_column(&batch, "humidity")?;
            let wind_speed = float_column(&batch, "wind_speed")?;
            let pressure = float_column(&batch, "pressure")?;
            let clouds = float_column(&batch, "clouds")?;
            let uv_index = float_column(&batch, "uv_index")?;
            let rain = flag_column(&batch, "rain")?;
            let source = string_column(&batch, "source")?;
            let label_rain = flag_column(&batch, "label_rain")?;
            let label_hot = flag_column(&batch, "label_hot")?;
            let label_cold = flag_column(&batch, "label_cold")?;
            let label_uv_high = flag_column(&batch, "label_uv_high")?;
            let label_windy = flag_column(&batch, "label_windy")?;

            for i in 0..batch.num_rows() {
                if rows.len() >= limit {
                    return Ok(rows);
                }
                rows.push(DatasetRow {
                    temp: temp.value(i),
                    humidity: humidity.value(i),
                    wind_speed: wind_speed.value(i),
                    pressure: pressure.value(i),
                    clouds: clouds.value(i),
                    uv_index: uv_index.value(i),
                    rain: rain.value(i),
                    source: source.value(i).to_string(),
                    label_rain: label_rain.value(i),
                    label_hot: label_hot.value(i),
                    label_cold: label_cold.value(i),
                    label_uv_high: label_uv_high.value(i),
                    label_windy: label_windy.value(i),
                });
            }
        }

        Ok(rows)
    }

    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            self.compression
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let index = batch
        .schema()
        .index_of(name)
        .map_err(|_| ProcessingError::MissingColumn(name.to_string()))?;
    Ok(batch.column(index))
}

fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    column(batch, name)?
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))
}

fn flag_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a UInt8Array> {
    column(batch, name)?
        .as_any()
        .downcast_ref::<UInt8Array>()
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    column(batch, name)?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            avg_rows
        )
    }
}
