//! Configuration and execution of a dsfdr run.

mod config;
mod runner;

pub use config::DsfdrConfig;
pub use runner::{dsfdr, Dsfdr};
