use crate::utils::constants::{INPUT_EXTENSION, OUTPUT_EXTENSION};
use std::path::{Path, PathBuf};

/// Glob pattern matching a place's exports: `<dir>/<place>*.csv`
///
/// The place name is escaped so characters such as `[` are matched literally.
pub fn input_glob_pattern(input_dir: &Path, place: &str) -> String {
    let dir = glob::Pattern::escape(&input_dir.to_string_lossy());
    let place = glob::Pattern::escape(place);

    if dir.is_empty() {
        format!("{}*.{}", place, INPUT_EXTENSION)
    } else {
        format!("{}/{}*.{}", dir.trim_end_matches('/'), place, INPUT_EXTENSION)
    }
}

/// Output file name with format: {place}_{year}.txt
pub fn output_filename(place: &str, year: i32) -> String {
    format!("{}_{}.{}", place, year, OUTPUT_EXTENSION)
}

pub fn output_path(output_dir: &Path, place: &str, year: i32) -> PathBuf {
    output_dir.join(output_filename(place, year))
}

/// Whether `file_name` starts with `place` followed by a non-alphanumeric
/// character, so `bath` accepts `bath_2020.csv` but not `bathurst_2020.csv`.
pub fn matches_place_boundary(file_name: &str, place: &str) -> bool {
    match file_name.strip_prefix(place) {
        Some(rest) => rest
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphanumeric()),
        None => false,
    }
}
