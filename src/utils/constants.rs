/// Places converted when no configuration overrides them
pub const DEFAULT_PLACES: [&str; 7] = [
    "southampton",
    "loughborough",
    "liverpool",
    "bath",
    "oxford",
    "cambridge",
    "sheffield",
];

/// Years converted when no configuration overrides them
pub const DEFAULT_YEARS: [i32; 2] = [2004, 2005];

/// HelioClim export layout
pub const DEFAULT_SKIP_ROWS: usize = 25;
pub const DEFAULT_DELIMITER: &str = ";";
pub const DEFAULT_COMMENT_MARKER: &str = "#";
pub const DEFAULT_YEAR_COLUMN: usize = 0;
pub const DEFAULT_VALUE_COLUMN: usize = 5;

/// File extensions
pub const INPUT_EXTENSION: &str = "csv";
pub const OUTPUT_EXTENSION: &str = "txt";

/// 15-minute cadence, in hours
pub const DEFAULT_SAMPLE_INTERVAL_HOURS: f64 = 0.25;

/// Output number formatting
pub const DEFAULT_PRECISION: usize = 6;
pub const SCIENTIFIC_PRECISION: usize = 18;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "HELIOCLIM";
