pub mod converter;
pub mod report;
pub mod series_builder;

pub use converter::Converter;
pub use report::{ConversionReport, PlaceOutcome, YearOutcome};
pub use series_builder::{clamp, SeriesBuilder};
