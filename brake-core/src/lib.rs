#![no_std]

// Control-loop logic for the two-wheel anti-lock brake controller.
//
// Every component here is portable across the MCU firmware and host tooling:
// handlers take the shared `ControlState` by reference and never block, so the
// same code runs from interrupt-driven tasks or from a synthetic event script.

pub mod actuator;
pub mod config;
pub mod control;
pub mod duty;
pub mod lever;
pub mod slip;
pub mod state;
pub mod timebase;
pub mod wheel;

pub use config::{BrakeCalibration, CalibrationError};
pub use state::{ControlSnapshot, ControlState};

/// Elapsed time-base ticks.
pub type Ticks = u32;
