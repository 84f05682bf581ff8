//! Lever intensity to actuator duty mapping.

use crate::config::BrakeCalibration;
use crate::slip::{SlipDecision, SlipDetector};
use crate::state::ControlState;
use crate::wheel::Wheel;

/// Brake intensity clamped into `[0, max_intensity]`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct BrakeIntensity(u8);

impl BrakeIntensity {
    /// Clamps a raw request; out-of-range values are never rejected.
    #[must_use]
    pub fn from_request(raw: i16, max_intensity: u8) -> Self {
        let clamped = raw.clamp(0, i16::from(max_intensity));
        Self(u8::try_from(clamped).unwrap_or(max_intensity))
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Duty value in units of the actuator's full-scale period.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct DutyCommand(u16);

impl DutyCommand {
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Pair of duty commands, one per actuator channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ActuatorCommands {
    pub front: DutyCommand,
    pub rear: DutyCommand,
}

impl ActuatorCommands {
    #[must_use]
    pub const fn new(front: DutyCommand, rear: DutyCommand) -> Self {
        Self { front, rear }
    }

    #[must_use]
    pub const fn get(&self, wheel: Wheel) -> DutyCommand {
        match wheel {
            Wheel::Front => self.front,
            Wheel::Rear => self.rear,
        }
    }
}

/// Combines the lever request with the slip decision.
#[derive(Copy, Clone, Debug)]
pub struct DutyMapper {
    detector: SlipDetector,
    max_intensity: u8,
    min_duty: u16,
    scale: u16,
}

impl DutyMapper {
    #[must_use]
    pub const fn new(calibration: &BrakeCalibration) -> Self {
        Self {
            detector: SlipDetector::new(calibration.difference_threshold),
            max_intensity: calibration.max_intensity,
            min_duty: calibration.min_duty,
            scale: calibration.duty_scale,
        }
    }

    /// Pure mapping used by [`DutyMapper::compute_commands`].
    ///
    /// Duties beyond the 16-bit command range saturate; a validated
    /// calibration never gets there.
    #[must_use]
    pub fn map(&self, intensity: BrakeIntensity, decision: SlipDecision) -> ActuatorCommands {
        let applied = u32::from(self.min_duty)
            + u32::from(intensity.value()) * u32::from(self.scale);
        let applied = u16::try_from(applied).unwrap_or(u16::MAX);
        let released = self.min_duty;

        // The slower wheel's brake is released outright, whatever the lever says.
        let front = if decision == SlipDecision::FrontSlower {
            released
        } else {
            applied
        };
        let rear = if decision == SlipDecision::RearSlower {
            released
        } else {
            applied
        };

        ActuatorCommands::new(DutyCommand::new(front), DutyCommand::new(rear))
    }

    /// Refreshes the slip decision, maps the request and stores the commands.
    #[must_use]
    pub fn compute_commands(&self, request: i16, state: &ControlState) -> ActuatorCommands {
        let decision = self.detector.evaluate(state);
        let intensity = BrakeIntensity::from_request(request, self.max_intensity);
        let commands = self.map(intensity, decision);
        state.store_commands(commands);
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> DutyMapper {
        DutyMapper::new(&BrakeCalibration::DEFAULT)
    }

    #[test]
    fn intensity_clamps_both_ends() {
        assert_eq!(BrakeIntensity::from_request(-127, 235).value(), 0);
        assert_eq!(BrakeIntensity::from_request(0, 235).value(), 0);
        assert_eq!(BrakeIntensity::from_request(128, 235).value(), 128);
        assert_eq!(BrakeIntensity::from_request(500, 235).value(), 235);
    }

    #[test]
    fn balanced_maps_both_channels_linearly() {
        let mapper = mapper();
        for (request, expected) in [(0, 1_000), (100, 2_600), (200, 4_200), (235, 4_760)] {
            let commands = mapper.map(BrakeIntensity::from_request(request, 235), SlipDecision::Balanced);
            assert_eq!(commands.front.raw(), expected);
            assert_eq!(commands.rear.raw(), expected);
        }
    }

    #[test]
    fn slower_wheel_is_forced_to_minimum() {
        let mapper = mapper();
        let intensity = BrakeIntensity::from_request(150, 235);

        let front_slow = mapper.map(intensity, SlipDecision::FrontSlower);
        assert_eq!(front_slow.front.raw(), 1_000);
        assert_eq!(front_slow.rear.raw(), 3_400);

        let rear_slow = mapper.map(intensity, SlipDecision::RearSlower);
        assert_eq!(rear_slow.front.raw(), 3_400);
        assert_eq!(rear_slow.rear.raw(), 1_000);
    }

    #[test]
    fn oversized_scale_saturates_at_command_ceiling() {
        let mapper = DutyMapper::new(&BrakeCalibration {
            duty_scale: 600,
            ..BrakeCalibration::DEFAULT
        });
        let full = BrakeIntensity::from_request(128, 235);

        let commands = mapper.map(full, SlipDecision::RearSlower);
        assert_eq!(commands.front.raw(), u16::MAX);
        assert_eq!(commands.rear.raw(), 1_000);
    }

    #[test]
    fn compute_commands_writes_state() {
        let state = ControlState::default();
        let commands = mapper().compute_commands(300, &state);

        assert_eq!(commands, ActuatorCommands::new(DutyCommand::new(4_760), DutyCommand::new(4_760)));
        assert_eq!(state.commands(), commands);
    }
}
