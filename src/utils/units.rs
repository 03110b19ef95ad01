use crate::utils::constants::{FRACTIONAL_HUMIDITY_MAX, KMH_PER_MS};

/// km/h to m/s by dividing by 3.6
pub fn kmh_to_ms(value: f64) -> f64 {
    value / KMH_PER_MS
}

/// kph to m/s via metres per hour over seconds per hour
pub fn kph_to_ms(value: f64) -> f64 {
    value * 1000.0 / 3600.0
}

/// Millibars and hectopascals are the same unit
pub fn millibar_to_hpa(value: f64) -> f64 {
    value
}

/// Rescale a humidity column to percent when every value looks like a fraction.
/// NaN cells are ignored; an infinite cell counts toward the maximum.
/// Columns with no numeric values are left as they are.
pub fn normalize_humidity_column(values: &mut [Option<f64>]) -> bool {
    let max = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    match max {
        Some(max) if max <= FRACTIONAL_HUMIDITY_MAX => {
            for value in values.iter_mut().flatten() {
                *value *= 100.0;
            }
            true
        }
        _ => false,
    }
}
