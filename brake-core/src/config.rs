//! Build-time calibration for the brake control loop.
//!
//! Every constant the loop depends on lives in [`BrakeCalibration`]. Nothing
//! here is configurable at runtime; firmware and host tooling both start from
//! [`BrakeCalibration::DEFAULT`] and validate it once before wiring handlers.

use core::{fmt, time::Duration};

/// Interval between time-base ticks.
pub const TICK_INTERVAL: Duration = Duration::from_micros(10);
/// Minimum period difference (in ticks) that counts as a slipping wheel.
pub const DIFFERENCE_THRESHOLD: u32 = 50;
/// Largest brake intensity accepted by the duty mapper.
pub const MAX_INTENSITY: u8 = 235;
/// Duty value commanded when a channel is fully released.
pub const MIN_DUTY: u16 = 1_000;
/// Duty units added per step of brake intensity.
pub const DUTY_SCALE: u16 = 16;
/// Full-scale actuator waveform period, in duty units.
pub const PWM_PERIOD: u16 = 40_000;
/// Actuator waveform frequency.
pub const PWM_FREQUENCY_HZ: u32 = 50;
/// Lever sample that maps to zero intensity; lower samples brake harder.
pub const LEVER_MID: i16 = 128;

/// Calibration constants shared by every control-loop component.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BrakeCalibration {
    pub tick_interval: Duration,
    pub difference_threshold: u32,
    pub max_intensity: u8,
    pub min_duty: u16,
    pub duty_scale: u16,
    pub pwm_period: u16,
    pub pwm_frequency_hz: u32,
    pub lever_mid: i16,
}

impl BrakeCalibration {
    /// Design defaults for the servo-driven calipers.
    pub const DEFAULT: Self = Self {
        tick_interval: TICK_INTERVAL,
        difference_threshold: DIFFERENCE_THRESHOLD,
        max_intensity: MAX_INTENSITY,
        min_duty: MIN_DUTY,
        duty_scale: DUTY_SCALE,
        pwm_period: PWM_PERIOD,
        pwm_frequency_hz: PWM_FREQUENCY_HZ,
        lever_mid: LEVER_MID,
    };

    /// Highest duty value the mapper can command.
    #[must_use]
    pub const fn max_duty(&self) -> u32 {
        self.min_duty as u32 + self.max_intensity as u32 * self.duty_scale as u32
    }

    /// Checks that the constants describe a loop the actuators can follow.
    ///
    /// # Errors
    ///
    /// Returns the first [`CalibrationError`] found: a zero tick interval,
    /// a zero PWM period or frequency, a duty ceiling that does not fit inside
    /// the PWM period, or a lever midpoint outside the 8-bit sample range.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.tick_interval.is_zero() {
            return Err(CalibrationError::ZeroTickInterval);
        }
        if self.pwm_period == 0 || self.pwm_frequency_hz == 0 {
            return Err(CalibrationError::ZeroPwmPeriod);
        }
        if self.max_duty() >= u32::from(self.pwm_period) {
            return Err(CalibrationError::DutyExceedsPeriod {
                max_duty: self.max_duty(),
                period: self.pwm_period,
            });
        }
        if !(0..=i16::from(u8::MAX)).contains(&self.lever_mid) {
            return Err(CalibrationError::LeverMidOutOfRange(self.lever_mid));
        }
        Ok(())
    }
}

impl Default for BrakeCalibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Reasons a calibration is rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CalibrationError {
    ZeroTickInterval,
    ZeroPwmPeriod,
    DutyExceedsPeriod { max_duty: u32, period: u16 },
    LeverMidOutOfRange(i16),
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::ZeroTickInterval => f.write_str("tick interval must be non-zero"),
            CalibrationError::ZeroPwmPeriod => f.write_str("pwm period and frequency must be non-zero"),
            CalibrationError::DutyExceedsPeriod { max_duty, period } => {
                write!(f, "max duty {max_duty} does not fit in pwm period {period}")
            }
            CalibrationError::LeverMidOutOfRange(mid) => {
                write!(f, "lever midpoint {mid} outside 8-bit sample range")
            }
        }
    }
}
