pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{input_glob_pattern, matches_place_boundary, output_filename, output_path};
pub use progress::ProgressReporter;
