use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The two significant columns of one export row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrradiationRow {
    /// Calendar year, stored as a float in the export
    pub year: f64,
    /// Diffuse irradiation in Wh/m2, possibly negative
    pub value: f64,
}

impl IrradiationRow {
    pub fn new(year: f64, value: f64) -> Self {
        Self { year, value }
    }

    /// Exact comparison; exports encode whole calendar years.
    pub fn is_year(&self, year: i32) -> bool {
        self.year == f64::from(year)
    }
}

/// All rows loaded from a single export, in file order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrradiationTable {
    pub source: PathBuf,
    pub rows: Vec<IrradiationRow>,
}

impl IrradiationTable {
    pub fn new(source: PathBuf, rows: Vec<IrradiationRow>) -> Self {
        Self { source, rows }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of rows for `year`, order preserved
    pub fn values_for_year(&self, year: i32) -> impl Iterator<Item = f64> + '_ {
        self.rows
            .iter()
            .filter(move |row| row.is_year(year))
            .map(|row| row.value)
    }
}
