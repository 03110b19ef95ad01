use crate::adapters::{cloud_bucket_percent, SourceAdapter};
use crate::error::Result;
use crate::models::{CanonicalObservation, CloudOrigin};
use crate::readers::RawTable;

const NAME: &str = "weather_classification_data";

/// Kaggle "weather_classification_data.csv": cloud cover as an ordinal
/// bucket, rain from the weather type, and the only source with UV.
pub struct ClassificationAdapter;

impl ClassificationAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClassificationAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for ClassificationAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_location(&self) -> &'static str {
        "kaggle/weather_classification_data.csv"
    }

    fn adapt(&self, table: &RawTable) -> Result<Vec<CanonicalObservation>> {
        let temp = table.column(NAME, "Temperature")?;
        let humidity = table.column(NAME, "Humidity")?;
        let wind_speed = table.column(NAME, "Wind Speed")?;
        let pressure = table.column(NAME, "Atmospheric Pressure")?;
        let cloud_cover = table.column(NAME, "Cloud Cover")?;
        let weather_type = table.column(NAME, "Weather Type")?;
        let uv_index = table.column(NAME, "UV Index")?;

        let records = (0..table.len())
            .map(|row| {
                let rain = weather_type
                    .text(row)
                    .is_some_and(|t| t.to_lowercase().contains("rain"));

                CanonicalObservation::new(NAME)
                    .temp(temp.number(row))
                    .humidity(humidity.number(row))
                    .wind_speed(wind_speed.number(row))
                    .pressure(pressure.number(row))
                    .clouds(cloud_bucket_percent(cloud_cover.text(row)), CloudOrigin::Bucketed)
                    .uv_index(uv_index.number(row))
                    .rain(Some(rain))
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapt_maps_buckets_and_uv() -> Result<()> {
        let table = RawTable::from_csv_str(
            "Temperature,Humidity,Wind Speed,Precipitation (%),Cloud Cover,Atmospheric Pressure,UV Index,Season,Visibility (km),Location,Weather Type\n\
             14.0,73,9.5,82.0,partly cloudy,1010.82,2,Winter,3.5,inland,Rainy\n\
             39.0,96,8.5,71.0,clear,1011.43,7,Spring,10.0,inland,Sunny\n\
             30.0,64,7.0,16.0,foggy,1018.72,5,Spring,5.5,mountain,Cloudy\n",
        )?;

        let records = ClassificationAdapter::new().adapt(&table)?;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].clouds, Some(45.0));
        assert_eq!(records[0].cloud_origin, CloudOrigin::Bucketed);
        assert_eq!(records[0].rain, Some(true));
        assert_eq!(records[0].uv_index, Some(2.0));
        assert_eq!(records[1].clouds, Some(5.0));
        assert_eq!(records[1].rain, Some(false));
        assert_eq!(records[1].uv_index, Some(7.0));
        // Unknown bucket leaves clouds missing
        assert_eq!(records[2].clouds, None);

        Ok(())
    }
}
