//! Simulated datasets with known truth for checking FDR control and power.

mod simulate;

pub use simulate::{simulate, SimulatedData, SimulationConfig};
