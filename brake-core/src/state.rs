//! Shared state touched by the control-loop event handlers.
//!
//! One [`ControlState`] exists for the lifetime of the controller. Each field
//! has a single logical writer:
//!
//! | Field | Written by | Read by |
//! |-------|------------|---------|
//! | tick counters | time base (increment), estimator (reset) | estimator |
//! | period measurements | estimator (publish) | slip detector (consume) |
//! | slip decision | slip detector | duty mapper |
//! | actuator commands | duty mapper | actuator driver |
//!
//! Fields with a writer and a reader on different event sources use atomics,
//! and the period pair is guarded by a critical section so that consuming both
//! measurements is a single step. Mutators are `pub(crate)` so only the owning
//! component can reach them.

use core::cell::Cell;

use critical_section::Mutex;
use portable_atomic::{AtomicU8, AtomicU16, AtomicU32, Ordering};

use crate::Ticks;
use crate::config::BrakeCalibration;
use crate::duty::{ActuatorCommands, DutyCommand};
use crate::slip::SlipDecision;
use crate::wheel::Wheel;

/// Control-loop state shared by reference between all handlers.
pub struct ControlState {
    ticks: [AtomicU32; 2],
    periods: Mutex<Cell<[Option<Ticks>; 2]>>,
    decision: AtomicU8,
    commands: [AtomicU16; 2],
}

impl ControlState {
    /// Creates the startup state: counters at zero, no measurements, balanced
    /// decision and both actuators at minimum duty.
    #[must_use]
    pub const fn new(calibration: BrakeCalibration) -> Self {
        Self {
            ticks: [AtomicU32::new(0), AtomicU32::new(0)],
            periods: Mutex::new(Cell::new([None, None])),
            decision: AtomicU8::new(SlipDecision::Balanced.to_raw()),
            commands: [
                AtomicU16::new(calibration.min_duty),
                AtomicU16::new(calibration.min_duty),
            ],
        }
    }

    /// Ticks elapsed since the wheel's last completed pulse.
    #[must_use]
    pub fn ticks(&self, wheel: Wheel) -> Ticks {
        self.ticks[wheel.as_index()].load(Ordering::Relaxed)
    }

    pub(crate) fn advance_ticks(&self) {
        for counter in &self.ticks {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Reads and zeroes the counter in one step so a concurrent tick is
    /// carried into the next cycle rather than dropped.
    pub(crate) fn take_ticks(&self, wheel: Wheel) -> Ticks {
        self.ticks[wheel.as_index()].swap(0, Ordering::Relaxed)
    }

    /// Latest unconsumed period for the wheel, if one is available.
    #[must_use]
    pub fn period(&self, wheel: Wheel) -> Option<Ticks> {
        critical_section::with(|cs| self.periods.borrow(cs).get()[wheel.as_index()])
    }

    pub(crate) fn publish_period(&self, wheel: Wheel, period: Ticks) {
        critical_section::with(|cs| {
            let cell = self.periods.borrow(cs);
            let mut periods = cell.get();
            periods[wheel.as_index()] = Some(period);
            cell.set(periods);
        });
    }

    /// Consumes both measurements when, and only when, both are fresh.
    pub(crate) fn take_period_pair(&self) -> Option<(Ticks, Ticks)> {
        critical_section::with(|cs| {
            let cell = self.periods.borrow(cs);
            match cell.get() {
                [Some(front), Some(rear)] => {
                    cell.set([None, None]);
                    Some((front, rear))
                }
                _ => None,
            }
        })
    }

    /// Slip decision currently in effect.
    #[must_use]
    pub fn decision(&self) -> SlipDecision {
        SlipDecision::from_raw(self.decision.load(Ordering::Relaxed))
    }

    pub(crate) fn set_decision(&self, decision: SlipDecision) {
        self.decision.store(decision.to_raw(), Ordering::Relaxed);
    }

    /// Duty currently commanded for the wheel's actuator.
    #[must_use]
    pub fn command(&self, wheel: Wheel) -> DutyCommand {
        DutyCommand::new(self.commands[wheel.as_index()].load(Ordering::Relaxed))
    }

    /// Both commanded duties.
    #[must_use]
    pub fn commands(&self) -> ActuatorCommands {
        ActuatorCommands::new(self.command(Wheel::Front), self.command(Wheel::Rear))
    }

    pub(crate) fn store_commands(&self, commands: ActuatorCommands) {
        for wheel in Wheel::ALL {
            self.commands[wheel.as_index()].store(commands.get(wheel).raw(), Ordering::Relaxed);
        }
    }

    /// Copies every field for diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            ticks: [self.ticks(Wheel::Front), self.ticks(Wheel::Rear)],
            periods: [self.period(Wheel::Front), self.period(Wheel::Rear)],
            decision: self.decision(),
            commands: self.commands(),
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(BrakeCalibration::DEFAULT)
    }
}

/// Point-in-time copy of [`ControlState`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ControlSnapshot {
    pub ticks: [Ticks; 2],
    pub periods: [Option<Ticks>; 2],
    pub decision: SlipDecision,
    pub commands: ActuatorCommands,
}

impl ControlSnapshot {
    #[must_use]
    pub fn ticks(&self, wheel: Wheel) -> Ticks {
        self.ticks[wheel.as_index()]
    }

    #[must_use]
    pub fn period(&self, wheel: Wheel) -> Option<Ticks> {
        self.periods[wheel.as_index()]
    }
}
