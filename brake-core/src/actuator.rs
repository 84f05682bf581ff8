//! Actuator channel driver.
//!
//! Each caliper servo is driven by a fixed-frequency waveform whose duty the
//! hardware holds until the next write. The driver only touches a channel when
//! its commanded value changes.

use crate::duty::{ActuatorCommands, DutyCommand};
use crate::state::ControlState;
use crate::wheel::Wheel;

/// Capability interface for one pair of actuator outputs.
pub trait ActuatorSink {
    /// Updates the duty for the wheel's channel. Must not block.
    fn set_duty(&mut self, wheel: Wheel, duty: DutyCommand);
}

/// Sink that discards every write.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopActuatorSink;

impl ActuatorSink for NoopActuatorSink {
    fn set_duty(&mut self, _wheel: Wheel, _duty: DutyCommand) {}
}

/// Pushes commanded duties into an [`ActuatorSink`].
pub struct ActuatorDriver<S> {
    sink: S,
    last: [Option<DutyCommand>; 2],
}

impl<S> ActuatorDriver<S>
where
    S: ActuatorSink,
{
    #[must_use]
    pub const fn new(sink: S) -> Self {
        Self {
            sink,
            last: [None, None],
        }
    }

    /// Writes channels whose duty differs from the last value written.
    /// Returns the number of channels updated.
    pub fn apply(&mut self, commands: ActuatorCommands) -> usize {
        let mut written = 0;
        for wheel in Wheel::ALL {
            let duty = commands.get(wheel);
            let slot = &mut self.last[wheel.as_index()];
            if *slot != Some(duty) {
                self.sink.set_duty(wheel, duty);
                *slot = Some(duty);
                written += 1;
            }
        }
        written
    }

    /// Applies whatever the shared state currently commands.
    pub fn refresh(&mut self, state: &ControlState) -> usize {
        self.apply(state.commands())
    }

    /// Last duty written to the wheel's channel, if any.
    #[must_use]
    pub fn last(&self, wheel: Wheel) -> Option<DutyCommand> {
        self.last[wheel.as_index()]
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
