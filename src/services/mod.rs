pub mod processing;
pub mod trend;
