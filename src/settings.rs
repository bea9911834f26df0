use crate::error::{ProcessingError, Result};
use crate::models::Place;
use crate::utils::constants::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use validator::Validate;

/// What to do when more than one export matches a place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Fail discovery and list the candidates
    #[default]
    Reject,
    /// Take the first candidate in sorted order and log the choice
    First,
}

/// What to do when a place fails to convert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the whole run at the first error
    #[default]
    Abort,
    /// Record the failure, carry on with the remaining places
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// Fixed-point, e.g. `0.250000`
    #[default]
    Fixed,
    /// Exponent notation, e.g. `2.500000000000000000e-01`
    Scientific,
}

/// Immutable configuration for one conversion run.
///
/// Values are layered: built-in defaults, then an optional config file, then
/// `HELIOCLIM__*` environment variables, then command-line overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConverterConfig {
    #[validate(length(min = 1))]
    pub places: Vec<String>,

    #[validate(length(min = 1))]
    pub years: Vec<i32>,

    pub input_dir: PathBuf,

    pub output_dir: PathBuf,

    /// Explicit export per place, bypassing discovery
    pub sources: BTreeMap<String, PathBuf>,

    pub skip_rows: usize,

    #[validate(length(equal = 1))]
    pub delimiter: String,

    pub comment_marker: Option<String>,

    pub year_column: usize,

    pub value_column: usize,

    pub sample_interval_hours: f64,

    pub number_format: NumberFormat,

    #[validate(range(max = 30))]
    pub precision: usize,

    pub on_ambiguous: AmbiguityPolicy,

    pub on_failure: FailurePolicy,

    #[validate(range(min = 1))]
    pub max_workers: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            places: DEFAULT_PLACES.iter().map(|p| p.to_string()).collect(),
            years: DEFAULT_YEARS.to_vec(),
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            sources: BTreeMap::new(),
            skip_rows: DEFAULT_SKIP_ROWS,
            delimiter: DEFAULT_DELIMITER.to_string(),
            comment_marker: Some(DEFAULT_COMMENT_MARKER.to_string()),
            year_column: DEFAULT_YEAR_COLUMN,
            value_column: DEFAULT_VALUE_COLUMN,
            sample_interval_hours: DEFAULT_SAMPLE_INTERVAL_HOURS,
            number_format: NumberFormat::Fixed,
            precision: DEFAULT_PRECISION,
            on_ambiguous: AmbiguityPolicy::Reject,
            on_failure: FailurePolicy::Abort,
            max_workers: 1,
        }
    }
}

impl ConverterConfig {
    /// Load configuration from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("places")
                .with_list_parse_key("years"),
        );

        let config: ConverterConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Check field constraints and cross-field consistency.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        self.delimiter_byte()?;
        let comment = self.comment_byte()?;
        if comment == Some(self.delimiter_byte()?) {
            return Err(ProcessingError::Config(
                "Comment marker must differ from the delimiter".to_string(),
            ));
        }

        if self.year_column == self.value_column {
            return Err(ProcessingError::Config(format!(
                "Year and value columns must differ (both {})",
                self.year_column
            )));
        }

        if !self.sample_interval_hours.is_finite() || self.sample_interval_hours <= 0.0 {
            return Err(ProcessingError::Config(format!(
                "Sample interval must be a positive number of hours, got {}",
                self.sample_interval_hours
            )));
        }

        let places = self.places()?;
        let mut seen = HashSet::new();
        for place in &places {
            if !seen.insert(place.as_str()) {
                return Err(ProcessingError::Config(format!(
                    "Place '{}' is configured more than once",
                    place
                )));
            }
        }

        for year in &self.years {
            if NaiveDate::from_ymd_opt(*year, 1, 1).is_none() {
                return Err(ProcessingError::Config(format!(
                    "Year {} is out of range",
                    year
                )));
            }
        }

        for place in self.sources.keys() {
            if !seen.contains(place.as_str()) {
                return Err(ProcessingError::Config(format!(
                    "Source given for unconfigured place '{}'",
                    place
                )));
            }
        }

        Ok(())
    }

    pub fn places(&self) -> Result<Vec<Place>> {
        self.places.iter().map(|p| Place::new(p.clone())).collect()
    }

    /// Explicit source for `place`, resolved against the input directory
    pub fn source_for(&self, place: &Place) -> Option<PathBuf> {
        self.sources
            .get(place.as_str())
            .map(|path| self.input_dir.join(path))
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        single_ascii_byte(&self.delimiter, "Delimiter")
    }

    pub fn comment_byte(&self) -> Result<Option<u8>> {
        match self.comment_marker.as_deref() {
            None | Some("") => Ok(None),
            Some(marker) => single_ascii_byte(marker, "Comment marker").map(Some),
        }
    }
}

fn single_ascii_byte(value: &str, what: &str) -> Result<u8> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(ProcessingError::Config(format!(
            "{} must be a single ASCII character, got '{}'",
            what, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_places_and_layout() {
        let config = ConverterConfig::default();

        assert_eq!(config.places.len(), 7);
        assert_eq!(config.places[0], "southampton");
        assert_eq!(config.years, vec![2004, 2005]);
        assert_eq!(config.skip_rows, 25);
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.year_column, 0);
        assert_eq!(config.value_column, 5);
        assert_eq!(config.sample_interval_hours, 0.25);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_rejects_bad_delimiter() {
        let config = ConverterConfig {
            delimiter: ";;".to_string(),
            ..Default::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_rejects_same_columns() {
        let config = ConverterConfig {
            value_column: 0,
            ..Default::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_rejects_empty_places_and_duplicates() {
        let empty = ConverterConfig {
            places: vec![],
            ..Default::default()
        };
        assert!(empty.check().is_err());

        let duplicated = ConverterConfig {
            places: vec!["bath".to_string(), "bath".to_string()],
            ..Default::default()
        };
        assert!(duplicated.check().is_err());
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        let config = ConverterConfig {
            sample_interval_hours: 0.0,
            ..Default::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_rejects_source_for_unknown_place() {
        let mut config = ConverterConfig::default();
        config
            .sources
            .insert("bristol".to_string(), PathBuf::from("bristol.csv"));
        assert!(config.check().is_err());
    }

    #[test]
    fn test_load_from_toml_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "places = [\"oxford\", \"bath\"]")?;
        writeln!(file, "years = [2010]")?;
        writeln!(file, "number_format = \"scientific\"")?;
        writeln!(file, "on_failure = \"continue\"")?;
        writeln!(file, "[sources]")?;
        writeln!(file, "bath = \"bath_export.csv\"")?;
        file.flush()?;

        let config = ConverterConfig::load(Some(file.path()))?;

        assert_eq!(config.places, vec!["oxford", "bath"]);
        assert_eq!(config.years, vec![2010]);
        assert_eq!(config.number_format, NumberFormat::Scientific);
        assert_eq!(config.on_failure, FailurePolicy::Continue);
        assert_eq!(config.skip_rows, 25);
        assert_eq!(
            config.source_for(&Place::new("bath")?),
            Some(PathBuf::from("./bath_export.csv"))
        );
        assert!(config.check().is_ok());

        Ok(())
    }
}
