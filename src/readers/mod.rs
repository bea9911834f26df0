pub mod discovery;
pub mod helioclim_reader;

pub use discovery::InputDiscovery;
pub use helioclim_reader::HelioClimReader;
