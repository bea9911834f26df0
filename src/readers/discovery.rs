use crate::error::{ProcessingError, Result};
use crate::models::Place;
use crate::settings::AmbiguityPolicy;
use crate::utils::filename::{input_glob_pattern, matches_place_boundary};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolves the single export belonging to each place.
pub struct InputDiscovery {
    input_dir: PathBuf,
    policy: AmbiguityPolicy,
}

impl InputDiscovery {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            policy: AmbiguityPolicy::Reject,
        }
    }

    pub fn with_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// All `<place>*.csv` files whose name continues past the place prefix
    /// with a non-alphanumeric character, in sorted order.
    pub fn candidates(&self, place: &Place) -> Result<Vec<PathBuf>> {
        let pattern = input_glob_pattern(&self.input_dir, place.as_str());
        let mut candidates = Vec::new();

        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|e| ProcessingError::Io(e.into_error()))?;

            if !path.is_file() {
                continue;
            }

            let accepted = path
                .file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|name| matches_place_boundary(name, place.as_str()));

            if accepted {
                candidates.push(path);
            } else {
                debug!("Skipping {} for place '{}'", path.display(), place);
            }
        }

        candidates.sort();
        Ok(candidates)
    }

    /// Resolve exactly one export for `place`.
    pub fn resolve(&self, place: &Place) -> Result<PathBuf> {
        let mut candidates = self.candidates(place)?;

        match candidates.len() {
            0 => Err(ProcessingError::NoInputFile {
                place: place.to_string(),
                pattern: input_glob_pattern(&self.input_dir, place.as_str()),
            }),
            1 => Ok(candidates.remove(0)),
            _ => match self.policy {
                AmbiguityPolicy::Reject => Err(ProcessingError::AmbiguousInput {
                    place: place.to_string(),
                    candidates,
                }),
                AmbiguityPolicy::First => {
                    let chosen = candidates.remove(0);
                    warn!(
                        "{} files match place '{}'; using {} and ignoring {}",
                        candidates.len() + 1,
                        place,
                        chosen.display(),
                        candidates
                            .iter()
                            .map(|p| p.display().to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                    Ok(chosen)
                }
            },
        }
    }

    /// Use `explicit` when given, otherwise discover.
    pub fn resolve_or(&self, place: &Place, explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) if path.is_file() => Ok(path.to_path_buf()),
            Some(path) => Err(ProcessingError::NoInputFile {
                place: place.to_string(),
                pattern: path.display().to_string(),
            }),
            None => self.resolve(place),
        }
    }
}
