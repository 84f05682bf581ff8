//! Per-wheel pulse period measurement.
//!
//! Each wheel carries a slotted disc in front of a photo-interrupter. The
//! estimator captures the tick count on a rising transition and, on the next
//! falling transition, publishes the elapsed ticks as the wheel's period and
//! restarts the wheel's counter from zero.
//!
//! Transitions are classified purely by the level observed when the event is
//! handled. A missed edge therefore produces an inaccurate period rather than
//! a fault; [`EdgeOutcome::in_order`] reports it so callers can log it.

use crate::Ticks;
use crate::state::ControlState;

/// Wheel served by an estimator or actuator channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Wheel {
    Front,
    Rear,
}

impl Wheel {
    /// Both wheels in index order.
    pub const ALL: [Wheel; 2] = [Wheel::Front, Wheel::Rear];

    /// Deterministic index for per-wheel arrays.
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            Wheel::Front => 0,
            Wheel::Rear => 1,
        }
    }

    /// Attempts to construct a [`Wheel`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Wheel::Front),
            1 => Some(Wheel::Rear),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Wheel::Front => "front",
            Wheel::Rear => "rear",
        }
    }
}

/// Direction of a sensor transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// Classifies a transition from the input level sampled after it fired.
    #[must_use]
    pub const fn from_level(high: bool) -> Self {
        if high { Edge::Rising } else { Edge::Falling }
    }
}

/// Capability interface for a wheel's edge-detecting input.
pub trait EdgeSource {
    /// Direction of the transition that just fired.
    fn edge(&mut self) -> Edge;
}

/// Position in the rising/falling capture cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EstimatorPhase {
    WaitForRising,
    WaitForFalling,
}

/// What a single transition did to the estimator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EdgeOutcome {
    pub wheel: Wheel,
    pub kind: EdgeOutcomeKind,
    /// `false` when the edge did not match the expected phase.
    pub in_order: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EdgeOutcomeKind {
    /// Rising edge: the start tick was recorded.
    Captured(Ticks),
    /// Falling edge: a period was published.
    Measured(Ticks),
}

/// Rising-to-falling period estimator for one wheel.
#[derive(Clone, Debug)]
pub struct WheelPeriodEstimator {
    wheel: Wheel,
    phase: EstimatorPhase,
    capture: Ticks,
}

impl WheelPeriodEstimator {
    #[must_use]
    pub const fn new(wheel: Wheel) -> Self {
        Self {
            wheel,
            phase: EstimatorPhase::WaitForRising,
            capture: 0,
        }
    }

    #[must_use]
    pub const fn wheel(&self) -> Wheel {
        self.wheel
    }

    #[must_use]
    pub const fn phase(&self) -> EstimatorPhase {
        self.phase
    }

    /// Tick count recorded at the most recent rising edge.
    #[must_use]
    pub const fn capture(&self) -> Ticks {
        self.capture
    }

    /// Handles one transition of the wheel's sensor input.
    pub fn on_edge(&mut self, edge: Edge, state: &ControlState) -> EdgeOutcome {
        let expected = match self.phase {
            EstimatorPhase::WaitForRising => Edge::Rising,
            EstimatorPhase::WaitForFalling => Edge::Falling,
        };

        let kind = match edge {
            Edge::Rising => {
                self.capture = state.ticks(self.wheel);
                self.phase = EstimatorPhase::WaitForFalling;
                EdgeOutcomeKind::Captured(self.capture)
            }
            Edge::Falling => {
                let period = state.take_ticks(self.wheel).saturating_sub(self.capture);
                state.publish_period(self.wheel, period);
                self.phase = EstimatorPhase::WaitForRising;
                EdgeOutcomeKind::Measured(period)
            }
        };

        EdgeOutcome {
            wheel: self.wheel,
            kind,
            in_order: edge == expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timebase::TimeBase;

    fn advance(state: &ControlState, ticks: u32) {
        for _ in 0..ticks {
            TimeBase::tick(state);
        }
    }

    #[test]
    fn wheel_index_round_trip() {
        for wheel in Wheel::ALL {
            assert_eq!(Wheel::from_index(wheel.as_index()), Some(wheel));
        }
        assert_eq!(Wheel::from_index(2), None);
    }

    #[test]
    fn edge_follows_observed_level() {
        assert_eq!(Edge::from_level(true), Edge::Rising);
        assert_eq!(Edge::from_level(false), Edge::Falling);
    }

    #[test]
    fn rising_then_falling_publishes_period_and_resets_counter() {
        let state = ControlState::default();
        let mut estimator = WheelPeriodEstimator::new(Wheel::Front);

        advance(&state, 40);
        let rising = estimator.on_edge(Edge::Rising, &state);
        assert_eq!(rising.kind, EdgeOutcomeKind::Captured(40));
        assert!(rising.in_order);
        assert_eq!(estimator.phase(), EstimatorPhase::WaitForFalling);
        assert_eq!(state.period(Wheel::Front), None);

        advance(&state, 260);
        let falling = estimator.on_edge(Edge::Falling, &state);
        assert_eq!(falling.kind, EdgeOutcomeKind::Measured(260));
        assert!(falling.in_order);
        assert_eq!(estimator.phase(), EstimatorPhase::WaitForRising);
        assert_eq!(state.period(Wheel::Front), Some(260));
        assert_eq!(state.ticks(Wheel::Front), 0);
        assert_eq!(state.ticks(Wheel::Rear), 300);
    }

    #[test]
    fn repeated_rising_edge_recaptures_without_fault() {
        let state = ControlState::default();
        let mut estimator = WheelPeriodEstimator::new(Wheel::Rear);

        advance(&state, 10);
        estimator.on_edge(Edge::Rising, &state);
        advance(&state, 15);
        let second = estimator.on_edge(Edge::Rising, &state);

        assert!(!second.in_order);
        assert_eq!(second.kind, EdgeOutcomeKind::Captured(25));
        assert_eq!(estimator.capture(), 25);
    }

    #[test]
    fn falling_without_rising_still_measures() {
        let state = ControlState::default();
        let mut estimator = WheelPeriodEstimator::new(Wheel::Rear);

        advance(&state, 90);
        let outcome = estimator.on_edge(Edge::Falling, &state);

        assert!(!outcome.in_order);
        assert_eq!(outcome.kind, EdgeOutcomeKind::Measured(90));
        assert_eq!(state.period(Wheel::Rear), Some(90));
    }

    #[test]
    fn stale_capture_saturates_to_zero_period() {
        let state = ControlState::default();
        let mut estimator = WheelPeriodEstimator::new(Wheel::Front);

        advance(&state, 50);
        estimator.on_edge(Edge::Rising, &state);
        estimator.on_edge(Edge::Falling, &state);
        // Counter restarted from zero, but the capture still holds 50.
        advance(&state, 20);
        let outcome = estimator.on_edge(Edge::Falling, &state);

        assert_eq!(outcome.kind, EdgeOutcomeKind::Measured(0));
    }
}
