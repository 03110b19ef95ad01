use crate::adapters::{rain_from_condition, SourceAdapter};
use crate::error::Result;
use crate::models::{CanonicalObservation, CloudOrigin};
use crate::readers::RawTable;
use crate::utils::units::{kph_to_ms, millibar_to_hpa};

const NAME: &str = "global_weather_repository";

/// Kaggle "GlobalWeatherRepository.csv": wind in kph, pressure in
/// millibars, rain inferred from the condition text. The repository's own
/// UV column is not used; UV is left to pool-wide imputation.
pub struct GlobalRepositoryAdapter;

impl GlobalRepositoryAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GlobalRepositoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for GlobalRepositoryAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_location(&self) -> &'static str {
        "kaggle/GlobalWeatherRepository.csv"
    }

    fn adapt(&self, table: &RawTable) -> Result<Vec<CanonicalObservation>> {
        let temp = table.column(NAME, "temperature_celsius")?;
        let humidity = table.column(NAME, "humidity")?;
        let wind_kph = table.column(NAME, "wind_kph")?;
        let pressure_mb = table.column(NAME, "pressure_mb")?;
        let cloud = table.column(NAME, "cloud")?;
        let condition = table.column(NAME, "condition_text")?;

        let records = (0..table.len())
            .map(|row| {
                CanonicalObservation::new(NAME)
                    .temp(temp.number(row))
                    .humidity(humidity.number(row))
                    .wind_speed(wind_kph.number(row).map(kph_to_ms))
                    .pressure(pressure_mb.number(row).map(millibar_to_hpa))
                    .clouds(cloud.number(row), CloudOrigin::Observed)
                    .rain(Some(rain_from_condition(condition.text(row))))
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapt_converts_kph_and_reads_condition() -> Result<()> {
        let table = RawTable::from_csv_str(
            "country,temperature_celsius,condition_text,wind_kph,pressure_mb,humidity,cloud,uv_index\n\
             Turkey,18.0,Light rain shower,18.0,1012.0,72,75,4.0\n\
             Chile,9.5,Sunny,36.0,1020.0,40,0,6.0\n\
             Peru,12.0,,abc,1001.0,55,20,3.0\n",
        )?;

        let records = GlobalRepositoryAdapter::new().adapt(&table)?;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].wind_speed, Some(5.0));
        assert_eq!(records[0].rain, Some(true));
        assert_eq!(records[0].uv_index, None);
        assert_eq!(records[1].wind_speed, Some(10.0));
        assert_eq!(records[1].rain, Some(false));
        assert_eq!(records[2].wind_speed, None);
        assert_eq!(records[2].rain, Some(false));

        Ok(())
    }
}
