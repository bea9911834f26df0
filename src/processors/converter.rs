use crate::error::{ProcessingError, Result};
use crate::models::Place;
use crate::processors::report::{ConversionReport, PlaceOutcome, YearOutcome};
use crate::processors::SeriesBuilder;
use crate::readers::{HelioClimReader, InputDiscovery};
use crate::settings::{ConverterConfig, FailurePolicy};
use crate::utils::progress::ProgressReporter;
use crate::writers::SeriesWriter;
use rayon::prelude::*;
use tracing::{error, info, info_span, warn};

/// Runs discover → load → filter/clamp → write for every configured place.
///
/// Places are processed in configured order, years in configured order within
/// each place. With `FailurePolicy::Abort` the first error ends the run and
/// outputs already written stay on disk; with `FailurePolicy::Continue` the
/// failing place is recorded in the report and the batch carries on.
pub struct Converter {
    config: ConverterConfig,
    places: Vec<Place>,
    discovery: InputDiscovery,
    reader: HelioClimReader,
    builder: SeriesBuilder,
    writer: SeriesWriter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Convert,
    Inspect,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.check()?;

        Ok(Self {
            places: config.places()?,
            discovery: InputDiscovery::new(config.input_dir.clone())
                .with_policy(config.on_ambiguous),
            reader: HelioClimReader::from_config(&config)?,
            builder: SeriesBuilder::from_config(&config),
            writer: SeriesWriter::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Convert every (place, year) pair and write the output files.
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<ConversionReport> {
        self.execute(Mode::Convert, progress)
    }

    /// Discover and load every place without writing anything.
    pub fn inspect(&self, progress: Option<&ProgressReporter>) -> Result<ConversionReport> {
        self.execute(Mode::Inspect, progress)
    }

    fn execute(&self, mode: Mode, progress: Option<&ProgressReporter>) -> Result<ConversionReport> {
        info!(
            "{} {} places for years {:?}",
            if mode == Mode::Convert {
                "Converting"
            } else {
                "Inspecting"
            },
            self.places.len(),
            self.config.years
        );

        let report = if self.config.max_workers > 1 {
            self.execute_parallel(mode, progress)?
        } else {
            self.execute_sequential(mode, progress)?
        };

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Processed {} places ({} failed)",
                report.total_places(),
                report.failed_places()
            ));
        }

        Ok(report)
    }

    fn execute_sequential(
        &self,
        mode: Mode,
        progress: Option<&ProgressReporter>,
    ) -> Result<ConversionReport> {
        let mut report = ConversionReport::new();

        for place in &self.places {
            let (outcome, failure) = self.process_place(place, mode, progress);
            report.push(outcome);

            if let Some(e) = failure {
                if self.config.on_failure == FailurePolicy::Abort {
                    return Err(e);
                }
            }
        }

        Ok(report)
    }

    /// Places are independent, so they can run on a thread pool. Under the
    /// abort policy the first failure in configured order is returned once
    /// every place has finished.
    fn execute_parallel(
        &self,
        mode: Mode,
        progress: Option<&ProgressReporter>,
    ) -> Result<ConversionReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let results: Vec<(PlaceOutcome, Option<ProcessingError>)> = pool.install(|| {
            self.places
                .par_iter()
                .map(|place| self.process_place(place, mode, progress))
                .collect()
        });

        let mut report = ConversionReport::new();
        let mut first_failure = None;

        for (outcome, failure) in results {
            report.push(outcome);
            if first_failure.is_none() {
                first_failure = failure;
            }
        }

        match first_failure {
            Some(e) if self.config.on_failure == FailurePolicy::Abort => Err(e),
            _ => Ok(report),
        }
    }

    fn process_place(
        &self,
        place: &Place,
        mode: Mode,
        progress: Option<&ProgressReporter>,
    ) -> (PlaceOutcome, Option<ProcessingError>) {
        let _span = info_span!("place", place = %place).entered();

        if let Some(p) = progress {
            p.set_message(&format!("Processing {}...", place));
        }

        let mut outcome = PlaceOutcome::new(place);
        let failure = match self.convert_place(place, mode, &mut outcome) {
            Ok(()) => None,
            Err(e) => {
                error!("Failed: {}", e);
                outcome.error = Some(e.to_string());
                Some(e)
            }
        };

        if let Some(p) = progress {
            p.increment(1);
        }

        (outcome, failure)
    }

    fn convert_place(&self, place: &Place, mode: Mode, outcome: &mut PlaceOutcome) -> Result<()> {
        let explicit = self.config.source_for(place);
        let source = self.discovery.resolve_or(place, explicit.as_deref())?;
        info!("Reading {}", source.display());
        outcome.source = Some(source.clone());

        let table = self.reader.read_table(&source)?;

        for &year in &self.config.years {
            let series = self.builder.build(place, &table, year);

            if series.is_empty() {
                warn!("No rows for {}; output has header only", year);
            }

            let output = match mode {
                Mode::Convert => {
                    let path = self
                        .writer
                        .write_series(&series, &self.config.output_dir)
                        .map_err(|e| {
                            error!("Writing year {} failed", year);
                            e
                        })?;
                    info!(
                        "Wrote {} ({} samples, {} clamped)",
                        path.display(),
                        series.len(),
                        series.clamped
                    );
                    Some(path)
                }
                Mode::Inspect => None,
            };

            outcome.years.push(YearOutcome::from_series(&series, output));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn export(rows: &[(i32, f64)]) -> String {
        let mut content = String::new();
        for i in 0..25 {
            content.push_str(&format!("# metadata {}\n", i));
        }
        for (year, value) in rows {
            content.push_str(&format!("{};01;01;00;00;{}\n", year, value));
        }
        content
    }

    fn config(dir: &Path, places: &[&str], years: &[i32]) -> ConverterConfig {
        ConverterConfig {
            places: places.iter().map(|p| p.to_string()).collect(),
            years: years.to_vec(),
            input_dir: dir.to_path_buf(),
            output_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ConverterConfig {
            years: vec![],
            ..Default::default()
        };
        assert!(Converter::new(config).is_err());
    }

    #[test]
    fn test_abort_stops_at_first_failure() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("oxford_request.csv"), export(&[(2004, 1.0)]))?;
        fs::write(dir.path().join("york_request.csv"), export(&[(2004, 1.0)]))?;

        let converter = Converter::new(config(dir.path(), &["oxford", "bath", "york"], &[2004]))?;
        let err = converter.run(None).unwrap_err();

        assert!(matches!(err, ProcessingError::NoInputFile { ref place, .. } if place == "bath"));
        assert!(dir.path().join("oxford_2004.txt").exists());
        assert!(!dir.path().join("york_2004.txt").exists());
        Ok(())
    }

    #[test]
    fn test_continue_isolates_failures() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("oxford_request.csv"), export(&[(2004, 1.0)]))?;
        fs::write(dir.path().join("york_request.csv"), export(&[(2004, 1.0)]))?;

        let mut cfg = config(dir.path(), &["oxford", "bath", "york"], &[2004]);
        cfg.on_failure = FailurePolicy::Continue;

        let report = Converter::new(cfg)?.run(None)?;

        assert_eq!(report.total_places(), 3);
        assert_eq!(report.failed_places(), 1);
        assert_eq!(report.places[1].place, "bath");
        assert!(!report.places[1].is_success());
        assert!(dir.path().join("oxford_2004.txt").exists());
        assert!(dir.path().join("york_2004.txt").exists());
        Ok(())
    }

    #[test]
    fn test_parallel_abort_returns_first_failure_in_order() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("oxford_request.csv"), export(&[(2004, 1.0)]))?;
        fs::write(dir.path().join("york_request.csv"), export(&[(2004, 1.0)]))?;

        let mut cfg = config(dir.path(), &["oxford", "bath", "leeds", "york"], &[2004]);
        cfg.max_workers = 3;

        let err = Converter::new(cfg)?.run(None).unwrap_err();

        assert!(matches!(err, ProcessingError::NoInputFile { ref place, .. } if place == "bath"));
        // No rollback: independent places still get written.
        assert!(dir.path().join("oxford_2004.txt").exists());
        assert!(dir.path().join("york_2004.txt").exists());
        Ok(())
    }

    #[test]
    fn test_parallel_continue_isolates_failures() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("oxford_request.csv"), export(&[(2004, 1.0)]))?;
        fs::write(dir.path().join("york_request.csv"), export(&[(2004, 1.0)]))?;

        let mut cfg = config(dir.path(), &["oxford", "bath", "york"], &[2004]);
        cfg.max_workers = 3;
        cfg.on_failure = FailurePolicy::Continue;

        let report = Converter::new(cfg)?.run(None)?;

        assert_eq!(report.total_places(), 3);
        assert_eq!(report.failed_places(), 1);
        assert_eq!(report.places[1].place, "bath");
        assert!(report.places[1].error.is_some());
        assert!(report.places[0].is_success());
        assert!(report.places[2].is_success());
        assert!(dir.path().join("oxford_2004.txt").exists());
        assert!(dir.path().join("york_2004.txt").exists());
        Ok(())
    }

    #[test]
    fn test_inspect_writes_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("oxford_request.csv"),
            export(&[(2004, -1.0), (2004, 2.0), (2005, 3.0)]),
        )?;

        let report = Converter::new(config(dir.path(), &["oxford"], &[2004, 2005]))?.inspect(None)?;

        let years = &report.places[0].years;
        assert_eq!(years[0].rows, 2);
        assert_eq!(years[0].clamped, 1);
        assert_eq!(years[1].rows, 1);
        assert_eq!(report.files_written(), 0);
        assert!(!dir.path().join("oxford_2004.txt").exists());
        Ok(())
    }

    #[test]
    fn test_parallel_matches_sequential() -> Result<()> {
        let dir = TempDir::new()?;
        let places = ["bath", "leeds", "oxford", "york"];
        for (i, place) in places.iter().enumerate() {
            let rows: Vec<(i32, f64)> = (0..50).map(|j| (2004, (j as f64) - i as f64 * 3.0)).collect();
            fs::write(dir.path().join(format!("{}_request.csv", place)), export(&rows))?;
        }

        let sequential_dir = TempDir::new()?;
        let mut sequential = config(dir.path(), &places, &[2004]);
        sequential.output_dir = sequential_dir.path().to_path_buf();
        Converter::new(sequential)?.run(None)?;

        let parallel_dir = TempDir::new()?;
        let mut parallel = config(dir.path(), &places, &[2004]);
        parallel.output_dir = parallel_dir.path().to_path_buf();
        parallel.max_workers = 3;
        let report = Converter::new(parallel)?.run(None)?;

        let order: Vec<&str> = report.places.iter().map(|p| p.place.as_str()).collect();
        assert_eq!(order, places);

        for place in places {
            let name = format!("{}_2004.txt", place);
            assert_eq!(
                fs::read(sequential_dir.path().join(&name))?,
                fs::read(parallel_dir.path().join(&name))?
            );
        }
        Ok(())
    }
}
