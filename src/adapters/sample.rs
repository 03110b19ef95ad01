use crate::adapters::{parse_rain_flag, SourceAdapter};
use crate::error::Result;
use crate::models::{CanonicalObservation, CloudOrigin};
use crate::readers::RawTable;

const NAME: &str = "sample";

/// Hand-collected sample file already using the canonical column names.
/// Optional: a run without the file simply has no sample records.
pub struct SampleAdapter;

impl SampleAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SampleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for SampleAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_location(&self) -> &'static str {
        "samples/weather_sample.csv"
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn adapt(&self, table: &RawTable) -> Result<Vec<CanonicalObservation>> {
        let temp = table.column(NAME, "temp")?;
        let humidity = table.column(NAME, "humidity")?;
        let wind_speed = table.column(NAME, "wind_speed")?;
        let pressure = table.column(NAME, "pressure")?;
        let clouds = table.column(NAME, "clouds")?;
        let rain = table.column(NAME, "rain")?;

        let records = (0..table.len())
            .map(|row| {
                CanonicalObservation::new(NAME)
                    .temp(temp.number(row))
                    .humidity(humidity.number(row))
                    .wind_speed(wind_speed.number(row))
                    .pressure(pressure.number(row))
                    .clouds(clouds.number(row), CloudOrigin::Observed)
                    .rain(parse_rain_flag(rain.text(row)))
            })
            .collect();

        Ok(records)
    }
}
