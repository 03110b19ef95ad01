/// Canonical feature columns, in output order
pub const FEATURE_COLUMNS: [&str; 6] = [
    "temp",
    "humidity",
    "wind_speed",
    "pressure",
    "clouds",
    "uv_index",
];

/// Derived label columns, in output order
pub const LABEL_COLUMNS: [&str; 5] = [
    "label_rain",
    "label_hot",
    "label_cold",
    "label_uv_high",
    "label_windy",
];

pub const RAIN_COLUMN: &str = "rain";
pub const SOURCE_COLUMN: &str = "source";

/// Physical bounds
pub const MIN_HUMIDITY: f64 = 0.0;
pub const MAX_HUMIDITY: f64 = 100.0;
pub const MIN_CLOUDS: f64 = 0.0;
pub const MAX_CLOUDS: f64 = 100.0;
pub const MIN_PRESSURE_HPA: f64 = 870.0;
pub const MAX_PRESSURE_HPA: f64 = 1100.0;
pub const MIN_UV_INDEX: f64 = 0.0;

/// Label thresholds
pub const HOT_THRESHOLD_C: f64 = 30.0;
pub const COLD_THRESHOLD_C: f64 = 15.0;
pub const UV_HIGH_THRESHOLD: f64 = 5.0;
pub const WINDY_THRESHOLD_MS: f64 = 10.0;

/// UV value used when no source in the pool observed UV at all
pub const DEFAULT_UV_INDEX: f64 = 3.0;

/// UV value assumed by the serving contract when a request omits it
pub const SERVING_DEFAULT_UV_INDEX: f64 = 0.0;

/// Cloud estimator fallbacks
pub const DEFAULT_CLOUD_FALLBACK: f64 = 50.0;
pub const HISTORY_CLOUD_FALLBACK: f64 = 60.0;

/// A humidity column whose maximum is at or below this is a fraction
pub const FRACTIONAL_HUMIDITY_MAX: f64 = 1.5;

/// Unit conversion
pub const KMH_PER_MS: f64 = 3.6;

/// Keywords in a condition text that imply rain
pub const RAIN_KEYWORDS: [&str; 5] = ["rain", "drizzle", "shower", "storm", "thunder"];

/// Default input and output locations
pub const DEFAULT_DATA_DIR: &str = "data";
pub const PROCESSED_DIR: &str = "processed";
pub const DEFAULT_OUTPUT_FILE: &str = "weather_training.csv";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
