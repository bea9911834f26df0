use crate::error::{ProcessingError, Result};
use crate::models::YearSeries;
use crate::settings::{ConverterConfig, NumberFormat};
use crate::utils::constants::{DEFAULT_PRECISION, SCIENTIFIC_PRECISION};
use crate::utils::filename::output_path;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes a `YearSeries` as a header-annotated two-column text file.
pub struct SeriesWriter {
    format: NumberFormat,
    precision: usize,
}

impl SeriesWriter {
    pub fn new() -> Self {
        Self {
            format: NumberFormat::Fixed,
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new().with_format(config.number_format, config.precision)
    }

    pub fn with_format(mut self, format: NumberFormat, precision: usize) -> Self {
        self.format = format;
        self.precision = precision;
        self
    }

    /// numpy `savetxt` default layout: `%.18e`
    pub fn scientific() -> Self {
        Self::new().with_format(NumberFormat::Scientific, SCIENTIFIC_PRECISION)
    }

    pub fn header_lines(place: &str, year: i32) -> [String; 2] {
        [
            format!("HelioClim data for {}.", place),
            format!(
                "Columns: Hours after midnight, Jan 1 {}. Diffuse Solar Irradiation (Wh/m2).",
                year
            ),
        ]
    }

    pub fn format_number(&self, value: f64) -> String {
        match self.format {
            NumberFormat::Fixed => format!("{:.*}", self.precision, value),
            NumberFormat::Scientific => scientific(value, self.precision),
        }
    }

    /// Full file content for `series`
    pub fn render(&self, series: &YearSeries) -> String {
        let mut out = String::with_capacity(128 + series.len() * 2 * (self.precision + 8));

        for line in Self::header_lines(series.place.as_str(), series.year) {
            out.push_str("# ");
            out.push_str(&line);
            out.push('\n');
        }

        for sample in &series.samples {
            out.push_str(&self.format_number(sample.hours));
            out.push(' ');
            out.push_str(&self.format_number(sample.value));
            out.push('\n');
        }

        out
    }

    /// Write `<output_dir>/<place>_<year>.txt`, replacing any existing file.
    pub fn write_series(&self, series: &YearSeries, output_dir: &Path) -> Result<PathBuf> {
        let path = output_path(output_dir, series.place.as_str(), series.year);

        self.write_to(series, &path)
            .map_err(|source| ProcessingError::Write {
                path: path.clone(),
                source,
            })?;

        debug!("Wrote {} samples to {}", series.len(), path.display());
        Ok(path)
    }

    fn write_to(&self, series: &YearSeries, path: &Path) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.render(series).as_bytes())?;
        writer.flush()
    }
}

impl Default for SeriesWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// `{:e}` with a signed, at least two-digit exponent: `2.5e-1` -> `2.5e-01`
fn scientific(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*e}", precision, value);

    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            Err(_) => formatted,
        },
        None => formatted,
    }
}
