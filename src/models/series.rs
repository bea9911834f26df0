use crate::models::Place;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

/// One output line: hours after midnight on Jan 1 and the clamped value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub hours: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(hours: f64, value: f64) -> Self {
        Self { hours, value }
    }
}

/// The output series for one (place, year) pair
#[derive(Debug, Clone, Serialize)]
pub struct YearSeries {
    pub place: Place,
    pub year: i32,
    pub samples: Vec<Sample>,
    /// Number of negative (or NaN) inputs floored to zero
    pub clamped: usize,
}

impl YearSeries {
    pub fn new(place: Place, year: i32, samples: Vec<Sample>, clamped: usize) -> Self {
        Self {
            place,
            year,
            samples,
            clamped,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Hours covered by the synthesized axis, zero for fewer than two samples
    pub fn span_hours(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.hours)
    }

    /// Midnight, Jan 1 of the series year
    pub fn start(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    /// Timestamp the last sample is labelled with, `None` when it falls
    /// outside the representable date range.
    pub fn end(&self) -> Option<NaiveDateTime> {
        let last = self.samples.last()?;
        let millis = (last.hours * 3_600_000.0).round();
        if !(millis.is_finite() && millis.abs() < i64::MAX as f64) {
            return None;
        }

        let offset = TimeDelta::try_milliseconds(millis as i64)?;
        self.start()?.checked_add_signed(offset)
    }
}
