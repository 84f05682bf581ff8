//! Single-owner event loop over the control-loop handlers.
//!
//! Firmware splits the handlers across independent tasks that share a static
//! [`ControlState`]. Host tooling and tests instead push a synthetic event
//! stream through [`ControlLoop::dispatch`], which routes each event to the
//! same handlers in arrival order.

use crate::actuator::{ActuatorDriver, ActuatorSink};
use crate::config::BrakeCalibration;
use crate::duty::{ActuatorCommands, DutyMapper};
use crate::lever::{LeverSample, LeverSampler};
use crate::slip::SlipDecision;
use crate::state::ControlState;
use crate::timebase::TimeBase;
use crate::wheel::{Edge, EdgeOutcome, Wheel, WheelPeriodEstimator};

/// Event delivered by one of the four event sources.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ControlEvent {
    Tick,
    Edge(Wheel, Edge),
    LeverSample(LeverSample),
}

/// Result of dispatching a single event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DispatchOutcome {
    Ticked,
    Edge(EdgeOutcome),
    Commands(CommandUpdate),
}

/// Commands produced by a lever sample.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CommandUpdate {
    pub commands: ActuatorCommands,
    pub decision: SlipDecision,
    pub previous_decision: SlipDecision,
    /// Number of actuator channels whose duty changed.
    pub channels_written: usize,
}

impl CommandUpdate {
    #[must_use]
    pub fn decision_changed(&self) -> bool {
        self.decision != self.previous_decision
    }
}

/// Owns the state and every handler for a host-driven control loop.
pub struct ControlLoop<S> {
    state: ControlState,
    estimators: [WheelPeriodEstimator; 2],
    sampler: LeverSampler,
    mapper: DutyMapper,
    driver: ActuatorDriver<S>,
}

impl<S> ControlLoop<S>
where
    S: ActuatorSink,
{
    /// Builds the loop and pushes the startup commands to the sink.
    #[must_use]
    pub fn new(calibration: BrakeCalibration, sink: S) -> Self {
        let state = ControlState::new(calibration);
        let mut driver = ActuatorDriver::new(sink);
        driver.refresh(&state);

        Self {
            state,
            estimators: [
                WheelPeriodEstimator::new(Wheel::Front),
                WheelPeriodEstimator::new(Wheel::Rear),
            ],
            sampler: LeverSampler::new(&calibration),
            mapper: DutyMapper::new(&calibration),
            driver,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ControlState {
        &self.state
    }

    #[must_use]
    pub fn estimator(&self, wheel: Wheel) -> &WheelPeriodEstimator {
        &self.estimators[wheel.as_index()]
    }

    #[must_use]
    pub fn driver(&self) -> &ActuatorDriver<S> {
        &self.driver
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        self.driver.sink()
    }

    /// Routes one event to its handler.
    pub fn dispatch(&mut self, event: ControlEvent) -> DispatchOutcome {
        match event {
            ControlEvent::Tick => {
                TimeBase::tick(&self.state);
                DispatchOutcome::Ticked
            }
            ControlEvent::Edge(wheel, edge) => {
                let outcome = self.estimators[wheel.as_index()].on_edge(edge, &self.state);
                DispatchOutcome::Edge(outcome)
            }
            ControlEvent::LeverSample(sample) => {
                let previous_decision = self.state.decision();
                let commands = self.sampler.on_sample(sample, &self.mapper, &self.state);
                let channels_written = self.driver.apply(commands);
                DispatchOutcome::Commands(CommandUpdate {
                    commands,
                    decision: self.state.decision(),
                    previous_decision,
                    channels_written,
                })
            }
        }
    }

    /// Dispatches `count` consecutive ticks.
    pub fn advance(&mut self, count: u32) {
        for _ in 0..count {
            self.dispatch(ControlEvent::Tick);
        }
    }

    /// Dispatches a full rising/falling pulse on `wheel` spanning `ticks` ticks
    /// and returns the outcome of the falling edge.
    pub fn pulse(&mut self, wheel: Wheel, ticks: u32) -> DispatchOutcome {
        self.dispatch(ControlEvent::Edge(wheel, Edge::Rising));
        self.advance(ticks);
        self.dispatch(ControlEvent::Edge(wheel, Edge::Falling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::NoopActuatorSink;
    use crate::duty::DutyCommand;
    use crate::wheel::{EdgeOutcomeKind, EstimatorPhase};

    fn control_loop() -> ControlLoop<NoopActuatorSink> {
        ControlLoop::new(BrakeCalibration::DEFAULT, NoopActuatorSink)
    }

    #[test]
    fn startup_pushes_minimum_duty() {
        let control = control_loop();
        assert_eq!(control.driver().last(Wheel::Front).map(|d| d.raw()), Some(1_000));
        assert_eq!(control.driver().last(Wheel::Rear).map(|d| d.raw()), Some(1_000));
    }

    #[test]
    fn pulse_measures_span_in_ticks() {
        let mut control = control_loop();
        let outcome = control.pulse(Wheel::Front, 320);
        assert_eq!(
            outcome,
            DispatchOutcome::Edge(EdgeOutcome {
                wheel: Wheel::Front,
                kind: EdgeOutcomeKind::Measured(320),
                in_order: true,
            })
        );
        assert_eq!(control.state().period(Wheel::Front), Some(320));
    }

    #[test]
    fn pulse_matches_dispatched_edge_sequence() {
        let mut pulsed = control_loop();
        pulsed.advance(15);
        let from_pulse = pulsed.pulse(Wheel::Rear, 90);

        let mut dispatched = control_loop();
        dispatched.advance(15);
        dispatched.dispatch(ControlEvent::Edge(Wheel::Rear, Edge::Rising));
        dispatched.advance(90);
        let from_dispatch = dispatched.dispatch(ControlEvent::Edge(Wheel::Rear, Edge::Falling));

        assert_eq!(from_pulse, from_dispatch);
        assert_eq!(pulsed.state().snapshot(), dispatched.state().snapshot());
        assert_eq!(
            pulsed.estimator(Wheel::Rear).phase(),
            EstimatorPhase::WaitForRising
        );
    }

    #[test]
    fn oversized_duty_scale_saturates_instead_of_overflowing() {
        let calibration = BrakeCalibration {
            duty_scale: 600,
            ..BrakeCalibration::DEFAULT
        };
        let mut control = ControlLoop::new(calibration, NoopActuatorSink);

        let DispatchOutcome::Commands(update) =
            control.dispatch(ControlEvent::LeverSample(LeverSample(0)))
        else {
            panic!("expected command update");
        };

        assert_eq!(update.commands.front, DutyCommand::new(u16::MAX));
        assert_eq!(update.commands.rear, DutyCommand::new(u16::MAX));
    }

    #[test]
    fn lever_update_reports_decision_change() {
        let mut control = control_loop();
        control.pulse(Wheel::Rear, 200);
        control.pulse(Wheel::Front, 400);

        let DispatchOutcome::Commands(update) =
            control.dispatch(ControlEvent::LeverSample(LeverSample(0)))
        else {
            panic!("expected command update");
        };

        assert!(update.decision_changed());
        assert_eq!(update.decision, SlipDecision::FrontSlower);
        assert_eq!(update.commands.front.raw(), 1_000);
        assert_eq!(update.commands.rear.raw(), 1_000 + 128 * 16);
        assert_eq!(update.channels_written, 1);
    }
}
