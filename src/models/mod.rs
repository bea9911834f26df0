pub mod irradiation;
pub mod place;
pub mod series;

pub use irradiation::{IrradiationRow, IrradiationTable};
pub use place::Place;
pub use series::{Sample, YearSeries};
