use crate::models::{Place, YearSeries};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct YearOutcome {
    pub year: i32,
    pub rows: usize,
    pub clamped: usize,
    pub span_hours: f64,
    /// Last timestamp as labelled by the synthesized axis
    pub ends_at: Option<String>,
    /// `None` when nothing was written (inspection)
    pub output: Option<PathBuf>,
}

impl YearOutcome {
    pub fn from_series(series: &YearSeries, output: Option<PathBuf>) -> Self {
        Self {
            year: series.year,
            rows: series.len(),
            clamped: series.clamped,
            span_hours: series.span_hours(),
            ends_at: series
                .end()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            output,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaceOutcome {
    pub place: String,
    pub source: Option<PathBuf>,
    pub years: Vec<YearOutcome>,
    pub error: Option<String>,
}

impl PlaceOutcome {
    pub fn new(place: &Place) -> Self {
        Self {
            place: place.to_string(),
            source: None,
            years: Vec::new(),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a batch, in configured place order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub places: Vec<PlaceOutcome>,
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: PlaceOutcome) {
        self.places.push(outcome);
    }

    pub fn total_places(&self) -> usize {
        self.places.len()
    }

    pub fn failed_places(&self) -> usize {
        self.places.iter().filter(|p| !p.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PlaceOutcome> {
        self.places.iter().filter(|p| !p.is_success())
    }

    pub fn files_written(&self) -> usize {
        self.years().filter(|y| y.output.is_some()).count()
    }

    pub fn total_samples(&self) -> usize {
        self.years().map(|y| y.rows).sum()
    }

    pub fn total_clamped(&self) -> usize {
        self.years().map(|y| y.clamped).sum()
    }

    fn years(&self) -> impl Iterator<Item = &YearOutcome> {
        self.places.iter().flat_map(|p| p.years.iter())
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Conversion Report ===\n");
        summary.push_str(&format!(
            "Places: {} ({} failed)\n",
            self.total_places(),
            self.failed_places()
        ));
        summary.push_str(&format!("Files written: {}\n", self.files_written()));
        summary.push_str(&format!("Samples: {}\n", self.total_samples()));
        summary.push_str(&format!(
            "Negative values clamped: {}\n",
            self.total_clamped()
        ));

        for place in &self.places {
            summary.push('\n');
            match &place.source {
                Some(source) => {
                    summary.push_str(&format!("{} <- {}\n", place.place, source.display()))
                }
                None => summary.push_str(&format!("{}\n", place.place)),
            }

            for year in &place.years {
                summary.push_str(&format!(
                    "  {}: {} rows, {} clamped, {:.2} h",
                    year.year, year.rows, year.clamped, year.span_hours
                ));
                if let Some(ends_at) = &year.ends_at {
                    summary.push_str(&format!(" (until {})", ends_at));
                }
                if let Some(output) = &year.output {
                    summary.push_str(&format!(" -> {}", output.display()));
                }
                summary.push('\n');
            }

            if let Some(error) = &place.error {
                summary.push_str(&format!("  FAILED: {}\n", error));
            }
        }

        summary
    }
}
