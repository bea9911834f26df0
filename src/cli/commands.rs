use crate::cli::args::{Cli, Commands};
use crate::cli::logging::init_logging;
use crate::error::{ProcessingError, Result};
use crate::processors::{ConversionReport, Converter};
use crate::settings::ConverterConfig;
use crate::utils::progress::ProgressReporter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Convert {
            options,
            output_dir,
            format,
            precision,
            quiet,
        } => {
            let mut config = options.load_config()?;
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(format) = format {
                config.number_format = format;
            }
            if let Some(precision) = precision {
                config.precision = precision;
            }

            let converter = prepare_conversion(config)?;
            let config = converter.config();

            println!("Converting HelioClim exports...");
            println!("Input directory: {}", config.input_dir.display());
            println!("Output directory: {}", config.output_dir.display());
            println!("Places: {}", config.places.join(", "));
            println!("Years: {:?}", config.years);

            let progress =
                ProgressReporter::new(converter.places().len() as u64, "Converting...", quiet);
            let report = converter.run(Some(&progress))?;
            drop(progress);

            println!("\n{}", report.summary());

            check_failures(&report)?;

            println!("Conversion complete!");
        }

        Commands::Inspect { options, json } => {
            let config = options.load_config()?;
            let converter = Converter::new(config)?;

            let progress = if json {
                ProgressReporter::silent()
            } else {
                println!("Inspecting HelioClim exports...");
                ProgressReporter::new(converter.places().len() as u64, "Inspecting...", false)
            };
            let report = converter.inspect(Some(&progress))?;
            drop(progress);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("\n{}", report.summary());
            }

            check_failures(&report)?;
        }
    }

    Ok(())
}

/// Validate the configuration, then create the output directory.
fn prepare_conversion(config: ConverterConfig) -> Result<Converter> {
    let converter = Converter::new(config)?;
    std::fs::create_dir_all(&converter.config().output_dir)?;
    Ok(converter)
}

fn check_failures(report: &ConversionReport) -> Result<()> {
    let failed = report.failed_places();
    if failed == 0 {
        return Ok(());
    }

    for outcome in report.failures() {
        eprintln!(
            "{}: {}",
            outcome.place,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    Err(ProcessingError::BatchFailed {
        failed,
        total: report.total_places(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Place;
    use crate::processors::PlaceOutcome;
    use tempfile::TempDir;

    #[test]
    fn test_invalid_config_creates_no_output_dir() {
        let dir = TempDir::new().unwrap();
        let output_dir = dir.path().join("out");
        let config = ConverterConfig {
            output_dir: output_dir.clone(),
            precision: 99,
            ..Default::default()
        };

        assert!(prepare_conversion(config).is_err());
        assert!(!output_dir.exists());
    }

    #[test]
    fn test_valid_config_creates_output_dir() -> Result<()> {
        let dir = TempDir::new()?;
        let output_dir = dir.path().join("nested").join("out");
        let config = ConverterConfig {
            output_dir: output_dir.clone(),
            ..Default::default()
        };

        let converter = prepare_conversion(config)?;

        assert!(output_dir.is_dir());
        assert_eq!(converter.config().output_dir, output_dir);
        Ok(())
    }

    #[test]
    fn test_check_failures_counts_failed_places() {
        let mut report = ConversionReport::new();
        report.push(PlaceOutcome::new(&Place::new("oxford").unwrap()));
        let mut bath = PlaceOutcome::new(&Place::new("bath").unwrap());
        bath.error = Some("No input file for place 'bath'".to_string());
        report.push(bath);

        match check_failures(&report) {
            Err(ProcessingError::BatchFailed { failed, total }) => {
                assert_eq!(failed, 1);
                assert_eq!(total, 2);
            }
            other => panic!("expected batch failure, got {:?}", other),
        }
    }

    #[test]
    fn test_check_failures_passes_clean_report() {
        let mut report = ConversionReport::new();
        report.push(PlaceOutcome::new(&Place::new("oxford").unwrap()));
        assert!(check_failures(&report).is_ok());
    }
}
