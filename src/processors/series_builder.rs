use crate::models::{IrradiationTable, Place, Sample, YearSeries};
use crate::settings::ConverterConfig;
use crate::utils::constants::DEFAULT_SAMPLE_INTERVAL_HOURS;

/// Turns the rows of one year into an output series.
///
/// The time axis is synthesized from the row count alone: sample `i` is
/// labelled `i * interval` hours after midnight on Jan 1. Rows are assumed to
/// be chronological at the configured cadence; no time column is read.
pub struct SeriesBuilder {
    interval_hours: f64,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self {
            interval_hours: DEFAULT_SAMPLE_INTERVAL_HOURS,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new().with_interval(config.sample_interval_hours)
    }

    pub fn with_interval(mut self, interval_hours: f64) -> Self {
        self.interval_hours = interval_hours;
        self
    }

    pub fn build(&self, place: &Place, table: &IrradiationTable, year: i32) -> YearSeries {
        let values: Vec<f64> = table.values_for_year(year).collect();
        let clamped = values.iter().filter(|&&v| needs_clamping(v)).count();

        let samples = self
            .time_axis(values.len())
            .into_iter()
            .zip(values)
            .map(|(hours, value)| Sample::new(hours, clamp(value)))
            .collect();

        YearSeries::new(place.clone(), year, samples, clamped)
    }

    /// `n` evenly spaced points on `[0, (n - 1) * interval]`
    pub fn time_axis(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * self.interval_hours).collect()
    }
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Floor to zero. NaN and negative zero also become `0.0`.
pub fn clamp(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

fn needs_clamping(value: f64) -> bool {
    value < 0.0 || value.is_nan()
}
