use crate::error::{ProcessingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A configured location: the prefix of its input export and the stem of
/// its output files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Place(String);

impl Place {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(ProcessingError::Config(
                "Place name must not be empty".to_string(),
            ));
        }

        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ProcessingError::Config(format!(
                "Place name '{}' must not contain path components",
                name
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Place {
    type Error = ProcessingError;

    fn try_from(value: String) -> Result<Self> {
        Place::new(value)
    }
}

impl From<Place> for String {
    fn from(place: Place) -> Self {
        place.0
    }
}

impl AsRef<str> for Place {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
