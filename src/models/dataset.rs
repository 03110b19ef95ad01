use crate::models::LabeledObservation;
use crate::utils::constants::{FEATURE_COLUMNS, LABEL_COLUMNS, RAIN_COLUMN, SOURCE_COLUMN};
use serde::{Deserialize, Serialize};

/// Column order of the output table: features, outcome, provenance, labels
pub fn output_columns() -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = FEATURE_COLUMNS.to_vec();
    columns.push(RAIN_COLUMN);
    columns.push(SOURCE_COLUMN);
    columns.extend(LABEL_COLUMNS);
    columns
}

/// One row of the persisted table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub clouds: f64,
    pub uv_index: f64,
    pub rain: u8,
    pub source: String,
    pub label_rain: u8,
    pub label_hot: u8,
    pub label_cold: u8,
    pub label_uv_high: u8,
    pub label_windy: u8,
}

impl DatasetRow {
    pub fn labels(&self) -> [u8; 5] {
        [
            self.label_rain,
            self.label_hot,
            self.label_cold,
            self.label_uv_high,
            self.label_windy,
        ]
    }
}

impl From<&LabeledObservation> for DatasetRow {
    fn from(record: &LabeledObservation) -> Self {
        let [label_rain, label_hot, label_cold, label_uv_high, label_windy] =
            record.labels.as_array();
        Self {
            temp: record.temp,
            humidity: record.humidity,
            wind_speed: record.wind_speed,
            pressure: record.pressure,
            clouds: record.clouds,
            uv_index: record.uv_index,
            rain: record.rain as u8,
            source: record.source.clone(),
            label_rain,
            label_hot,
            label_cold,
            label_uv_high,
            label_windy,
        }
    }
}

/// The final labeled table. Built once by assembly; read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    rows: Vec<LabeledObservation>,
}

impl Dataset {
    pub(crate) fn sealed(rows: Vec<LabeledObservation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[LabeledObservation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> Vec<&'static str> {
        output_columns()
    }

    pub fn to_rows(&self) -> Vec<DatasetRow> {
        self.rows.iter().map(DatasetRow::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_column_order() {
        assert_eq!(
            output_columns(),
            vec![
                "temp",
                "humidity",
                "wind_speed",
                "pressure",
                "clouds",
                "uv_index",
                "rain",
                "source",
                "label_rain",
                "label_hot",
                "label_cold",
                "label_uv_high",
                "label_windy",
            ]
        );
    }

    #[test]
    fn test_csv_header_follows_field_order() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .serialize(DatasetRow {
                temp: 1.0,
                humidity: 2.0,
                wind_speed: 3.0,
                pressure: 900.0,
                clouds: 5.0,
                uv_index: 6.0,
                rain: 1,
                source: "s".to_string(),
                label_rain: 1,
                label_hot: 0,
                label_cold: 1,
                label_uv_high: 1,
                label_windy: 0,
            })
            .unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let header = data.lines().next().unwrap();

        assert_eq!(header, output_columns().join(","));
    }
}
