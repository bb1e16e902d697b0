#![warn(missing_docs)]

//! Per-wheel slip-compliance feedback controller.
//!
//! Maintains a mapping from wheel links to slip-compliance
//! coefficients and pushes updated surface parameters into the contact
//! solver every simulation step. Configuration is validated per wheel
//! at load time; a bad entry is skipped with a logged reason and never
//! aborts the others.

mod config;
mod controller;

pub use config::{parse_configs, WheelConfig};
pub use controller::WheelSlipController;
