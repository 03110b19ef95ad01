use crate::adapters::{rain_from_precip_type, SourceAdapter};
use crate::error::Result;
use crate::models::{CanonicalObservation, CloudOrigin};
use crate::processors::CloudEstimator;
use crate::readers::RawTable;
use crate::utils::units::{kmh_to_ms, millibar_to_hpa, normalize_humidity_column};

const NAME: &str = "weather_history";

/// Kaggle "weatherHistory.csv": fractional humidity, wind in km/h,
/// pressure in millibars, a mostly-empty "Loud Cover" fraction and a
/// text summary used to estimate clouds when that fraction is absent or zero.
pub struct WeatherHistoryAdapter {
    estimator: CloudEstimator,
    cloud_fallback: f64,
}

impl WeatherHistoryAdapter {
    pub fn new(estimator: CloudEstimator, cloud_fallback: f64) -> Self {
        Self {
            estimator,
            cloud_fallback,
        }
    }

    fn resolve_clouds(&self, loud_cover: Option<f64>, summary: Option<&str>) -> (f64, CloudOrigin) {
        match loud_cover.map(|fraction| fraction * 100.0) {
            Some(percent) if percent != 0.0 => (percent, CloudOrigin::Observed),
            _ => match self.estimator.classify(summary) {
                Some(estimate) => (estimate, CloudOrigin::Estimated),
                None => (self.cloud_fallback, CloudOrigin::Fallback),
            },
        }
    }
}

impl SourceAdapter for WeatherHistoryAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_location(&self) -> &'static str {
        "kaggle/weatherHistory.csv"
    }

    fn adapt(&self, table: &RawTable) -> Result<Vec<CanonicalObservation>> {
        let temp = table.column(NAME, "Temperature (C)")?;
        let humidity = table.column(NAME, "Humidity")?;
        let wind_kmh = table.column(NAME, "Wind Speed (km/h)")?;
        let pressure_mb = table.column(NAME, "Pressure (millibars)")?;
        let loud_cover = table.column(NAME, "Loud Cover")?;
        let precip_type = table.column(NAME, "Precip Type")?;
        let summary = table.column(NAME, "Summary")?;

        let mut humidity_values = humidity.numbers();
        if normalize_humidity_column(&mut humidity_values) {
            tracing::debug!(source = NAME, "Rescaled fractional humidity to percent");
        }

        let records = humidity_values
            .into_iter()
            .enumerate()
            .map(|(row, humidity)| {
                let (clouds, origin) =
                    self.resolve_clouds(loud_cover.number(row), summary.text(row));

                CanonicalObservation::new(NAME)
                    .temp(temp.number(row))
                    .humidity(humidity)
                    .wind_speed(wind_kmh.number(row).map(kmh_to_ms))
                    .pressure(pressure_mb.number(row).map(millibar_to_hpa))
                    .clouds(Some(clouds), origin)
                    .rain(Some(rain_from_precip_type(precip_type.text(row))))
            })
            .collect();

        Ok(records)
    }
}
