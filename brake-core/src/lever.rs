//! Brake lever sampling.
//!
//! The lever is a slide potentiometer read by a free-running 8-bit converter.
//! Samples are inverted around a midpoint so that pulling the lever (a lower
//! reading) requests more braking. Each completed sample drives the duty
//! mapper immediately; nothing is buffered.

use crate::config::BrakeCalibration;
use crate::duty::{ActuatorCommands, DutyMapper};
use crate::state::ControlState;

/// One completed 8-bit conversion of the lever position.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LeverSample(pub u8);

/// Capability interface for the free-running lever converter.
pub trait LeverSource {
    /// Returns the next completed conversion, or `None` if none is ready.
    fn next_sample(&mut self) -> Option<LeverSample>;
}

/// Converts lever samples into brake-intensity requests.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LeverSampler {
    mid: i16,
}

impl LeverSampler {
    #[must_use]
    pub const fn new(calibration: &BrakeCalibration) -> Self {
        Self {
            mid: calibration.lever_mid,
        }
    }

    /// Unclamped request: `mid - sample`.
    #[must_use]
    pub fn intensity_request(&self, sample: LeverSample) -> i16 {
        self.mid - i16::from(sample.0)
    }

    /// Handles a completed conversion by running the duty mapper.
    #[must_use]
    pub fn on_sample(
        &self,
        sample: LeverSample,
        mapper: &DutyMapper,
        state: &ControlState,
    ) -> ActuatorCommands {
        mapper.compute_commands(self.intensity_request(sample), state)
    }
}
