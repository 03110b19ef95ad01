use crate::adapters::{rain_from_label, SourceAdapter};
use crate::error::Result;
use crate::models::{CanonicalObservation, CloudOrigin};
use crate::readers::RawTable;

const NAME: &str = "weather_forecast_data";

/// Kaggle "weather_forecast_data.csv": already in canonical units, rain
/// given as a "rain"/"no rain" label, no UV.
pub struct ForecastAdapter;

impl ForecastAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ForecastAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for ForecastAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_location(&self) -> &'static str {
        "kaggle/weather_forecast_data.csv"
    }

    fn adapt(&self, table: &RawTable) -> Result<Vec<CanonicalObservation>> {
        let temp = table.column(NAME, "Temperature")?;
        let humidity = table.column(NAME, "Humidity")?;
        let wind_speed = table.column(NAME, "Wind_Speed")?;
        let pressure = table.column(NAME, "Pressure")?;
        let clouds = table.column(NAME, "Cloud_Cover")?;
        let rain = table.column(NAME, "Rain")?;

        let records = (0..table.len())
            .map(|row| {
                CanonicalObservation::new(NAME)
                    .temp(temp.number(row))
                    .humidity(humidity.number(row))
                    .wind_speed(wind_speed.number(row))
                    .pressure(pressure.number(row))
                    .clouds(clouds.number(row), CloudOrigin::Observed)
                    .rain(rain_from_label(rain.text(row)))
            })
            .collect();

        Ok(records)
    }
}
