use crate::error::{ProcessingError, Result};
use crate::readers::table_reader::{RawTable, TableReader};
use crate::utils::constants::{FEATURE_COLUMNS, LABEL_COLUMNS, SOURCE_COLUMN};
use arrow::array::{Array, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Feature and label matrices ready for a training loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub features: Vec<[f64; 6]>,
    pub labels: Vec<[u8; 5]>,
    /// Provenance per row, when the table carries a source column
    pub sources: Option<Vec<String>>,
    pub dropped_rows: usize,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Column-wise view shared by the CSV and Parquet paths
struct LoadedColumns {
    features: Vec<Vec<Option<f64>>>,
    labels: Vec<Vec<Option<f64>>>,
    sources: Option<Vec<Option<String>>>,
    rows: usize,
}

/// Loads a built dataset under the training contract: every feature and
/// label column must exist, rows with a missing feature are dropped.
pub struct DatasetReader {
    table_reader: TableReader,
}

impl DatasetReader {
    pub fn new() -> Self {
        Self {
            table_reader: TableReader::new(),
        }
    }

    pub fn load(&self, path: &Path) -> Result<TrainingSet> {
        let is_parquet = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));

        let columns = if is_parquet {
            Self::parquet_columns(path)?
        } else {
            let table = self.table_reader.read(path)?;
            Self::table_columns(&table)?
        };

        let set = Self::assemble(columns)?;
        tracing::info!(
            rows = set.len(),
            dropped = set.dropped_rows,
            path = %path.display(),
            "Loaded training set"
        );
        Ok(set)
    }

    /// Apply the training contract to an in-memory CSV table
    pub fn from_table(table: &RawTable) -> Result<TrainingSet> {
        Self::assemble(Self::table_columns(table)?)
    }

    fn table_columns(table: &RawTable) -> Result<LoadedColumns> {
        let required = |name: &str| {
            table
                .find_column(name)
                .map(|c| c.numbers())
                .ok_or_else(|| ProcessingError::MissingColumn(name.to_string()))
        };

        let features = FEATURE_COLUMNS
            .iter()
            .map(|&name| required(name))
            .collect::<Result<Vec<_>>>()?;
        let labels = LABEL_COLUMNS
            .iter()
            .map(|&name| required(name))
            .collect::<Result<Vec<_>>>()?;
        let sources = table.find_column(SOURCE_COLUMN).map(|c| {
            c.texts()
                .into_iter()
                .map(|t| t.map(str::to_string))
                .collect()
        });

        Ok(LoadedColumns {
            features,
            labels,
            sources,
            rows: table.len(),
        })
    }

    fn parquet_columns(path: &Path) -> Result<LoadedColumns> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = builder.schema().clone();
        let reader = builder.build()?;

        let mut loaded = LoadedColumns {
            features: vec![Vec::new(); FEATURE_COLUMNS.len()],
            labels: vec![Vec::new(); LABEL_COLUMNS.len()],
            sources: None,
            rows: 0,
        };
        for name in FEATURE_COLUMNS.iter().chain(LABEL_COLUMNS.iter()) {
            if schema.index_of(name).is_err() {
                return Err(ProcessingError::MissingColumn(name.to_string()));
            }
        }
        if schema.index_of(SOURCE_COLUMN).is_ok() {
            loaded.sources = Some(Vec::new());
        }

        for batch_result in reader {
            let batch = batch_result?;

            for (i, name) in FEATURE_COLUMNS.iter().enumerate() {
                loaded.features[i].extend(numeric_values(&batch, name)?);
            }
            for (i, name) in LABEL_COLUMNS.iter().enumerate() {
                loaded.labels[i].extend(numeric_values(&batch, name)?);
            }
            if let Some(sources) = loaded.sources.as_mut() {
                let index = batch.schema().index_of(SOURCE_COLUMN)?;
                let column = cast(batch.column(index), &DataType::Utf8)?;
                let strings = column
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| {
                        ProcessingError::InvalidFormat("Invalid source column type".to_string())
                    })?;
                sources.extend((0..strings.len()).map(|i| {
                    (!strings.is_null(i)).then(|| strings.value(i).to_string())
                }));
            }
            loaded.rows += batch.num_rows();
        }

        Ok(loaded)
    }

    fn assemble(columns: LoadedColumns) -> Result<TrainingSet> {
        let mut set = TrainingSet {
            sources: columns.sources.as_ref().map(|_| Vec::new()),
            ..TrainingSet::default()
        };

        for row in 0..columns.rows {
            let mut features = [0.0; 6];
            let mut complete = true;
            for (i, column) in columns.features.iter().enumerate() {
                match column.get(row).copied().flatten() {
                    Some(value) => features[i] = value,
                    None => complete = false,
                }
            }
            if !complete {
                set.dropped_rows += 1;
                continue;
            }

            let mut labels = [0u8; 5];
            for (i, column) in columns.labels.iter().enumerate() {
                labels[i] = match column.get(row).copied().flatten() {
                    Some(v) if v == 0.0 => 0,
                    Some(v) if v == 1.0 => 1,
                    other => {
                        return Err(ProcessingError::InvalidFormat(format!(
                            "{} must be 0 or 1 in row {}, found {:?}",
                            LABEL_COLUMNS[i], row, other
                        )))
                    }
                };
            }

            set.features.push(features);
            set.labels.push(labels);
            if let (Some(out), Some(sources)) = (set.sources.as_mut(), columns.sources.as_ref()) {
                out.push(sources.get(row).cloned().flatten().unwrap_or_default());
            }
        }

        Ok(set)
    }
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric_values(batch: &RecordBatch, name: &str) -> Result<Vec<Option<f64>>> {
    let index = batch
        .schema()
        .index_of(name)
        .map_err(|_| ProcessingError::MissingColumn(name.to_string()))?;
    let column = cast(batch.column(index), &DataType::Float64)?;
    let values = column
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column type", name)))?;

    Ok(values
        .iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "temp,humidity,wind_speed,pressure,clouds,uv_index,rain,source,label_rain,label_hot,label_cold,label_uv_high,label_windy";

    #[test]
    fn test_load_csv_drops_rows_with_missing_features() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("train.csv");
        fs::write(
            &path,
            format!(
                "{}\n31,40,3,1012,90,6,1,sample,1,1,0,1,0\n20,,3,1012,90,6,0,sample,0,0,0,1,0\n",
                HEADER
            ),
        )?;

        let set = DatasetReader::new().load(&path)?;

        assert_eq!(set.len(), 1);
        assert_eq!(set.dropped_rows, 1);
        assert_eq!(set.features[0], [31.0, 40.0, 3.0, 1012.0, 90.0, 6.0]);
        assert_eq!(set.labels[0], [1, 1, 0, 1, 0]);
        assert_eq!(set.sources, Some(vec!["sample".to_string()]));
        Ok(())
    }

    #[test]
    fn test_missing_label_column_is_an_error() {
        let table = RawTable::from_csv_str(
            "temp,humidity,wind_speed,pressure,clouds,uv_index,label_rain,label_hot,label_cold,label_uv_high\n",
        )
        .unwrap();

        match DatasetReader::from_table(&table) {
            Err(ProcessingError::MissingColumn(column)) => assert_eq!(column, "label_windy"),
            _ => panic!("expected missing column"),
        }
    }

    #[test]
    fn test_source_column_is_optional() -> Result<()> {
        let table = RawTable::from_csv_str(
            "temp,humidity,wind_speed,pressure,clouds,uv_index,label_rain,label_hot,label_cold,label_uv_high,label_windy\n\
             10,50,12,1000,20,0,0,0,1,0,1\n",
        )?;

        let set = DatasetReader::from_table(&table)?;

        assert_eq!(set.sources, None);
        assert_eq!(set.labels[0], [0, 0, 1, 0, 1]);
        Ok(())
    }

    #[test]
    fn test_non_binary_label_rejected() -> Result<()> {
        let table = RawTable::from_csv_str(&format!(
            "{}\n10,50,12,1000,20,0,0,s,2,0,1,0,1\n",
            HEADER
        ))?;

        assert!(DatasetReader::from_table(&table).is_err());
        Ok(())
    }
}
