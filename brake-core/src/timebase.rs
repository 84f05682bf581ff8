//! Fixed-interval tick source feeding both wheels' counters.

use core::time::Duration;

use crate::config::BrakeCalibration;
use crate::state::ControlState;

/// Advances the per-wheel tick counters.
///
/// The time base only ever increments; counters are reset exclusively by the
/// wheel estimators when a pulse completes.
pub struct TimeBase;

impl TimeBase {
    /// Interval at which [`TimeBase::tick`] must be invoked.
    #[must_use]
    pub const fn interval(calibration: &BrakeCalibration) -> Duration {
        calibration.tick_interval
    }

    pub fn tick(state: &ControlState) {
        state.advance_ticks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::Wheel;

    #[test]
    fn tick_advances_both_wheels() {
        let state = ControlState::default();
        TimeBase::tick(&state);
        TimeBase::tick(&state);

        assert_eq!(state.ticks(Wheel::Front), 2);
        assert_eq!(state.ticks(Wheel::Rear), 2);
    }

    #[test]
    fn default_interval_is_ten_micros() {
        assert_eq!(
            TimeBase::interval(&BrakeCalibration::DEFAULT),
            Duration::from_micros(10)
        );
    }
}
