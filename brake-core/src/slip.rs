//! Slip detection from paired wheel periods.
//!
//! A longer pulse period means the wheel is turning slower. When both wheels
//! have a fresh measurement the detector compares them, stores the decision
//! and consumes the pair; otherwise the previous decision stays in effect so a
//! stationary wheel never blocks lever-only braking.

use crate::Ticks;
use crate::state::ControlState;

/// Which wheel, if any, is turning slower than the other.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SlipDecision {
    #[default]
    Balanced,
    FrontSlower,
    RearSlower,
}

impl SlipDecision {
    const BALANCED_CODE: u8 = 0;
    const FRONT_SLOWER_CODE: u8 = 1;
    const REAR_SLOWER_CODE: u8 = 2;

    /// Encodes the decision for atomic storage.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        match self {
            SlipDecision::Balanced => Self::BALANCED_CODE,
            SlipDecision::FrontSlower => Self::FRONT_SLOWER_CODE,
            SlipDecision::RearSlower => Self::REAR_SLOWER_CODE,
        }
    }

    /// Decodes a stored decision; unknown codes fall back to [`SlipDecision::Balanced`].
    #[must_use]
    pub const fn from_raw(code: u8) -> Self {
        match code {
            Self::FRONT_SLOWER_CODE => SlipDecision::FrontSlower,
            Self::REAR_SLOWER_CODE => SlipDecision::RearSlower,
            _ => SlipDecision::Balanced,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SlipDecision::Balanced => "balanced",
            SlipDecision::FrontSlower => "front-slower",
            SlipDecision::RearSlower => "rear-slower",
        }
    }
}

/// Compares wheel periods against a fixed threshold.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SlipDetector {
    threshold: u32,
}

impl SlipDetector {
    #[must_use]
    pub const fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Classifies a pair of periods without touching shared state.
    #[must_use]
    pub fn classify(&self, front: Ticks, rear: Ticks) -> SlipDecision {
        let difference = i64::from(front) - i64::from(rear);
        let threshold = i64::from(self.threshold);
        if difference > threshold {
            SlipDecision::FrontSlower
        } else if difference < -threshold {
            SlipDecision::RearSlower
        } else {
            SlipDecision::Balanced
        }
    }

    /// Refreshes the stored decision when both periods are fresh and returns
    /// the decision now in effect.
    #[must_use]
    pub fn evaluate(&self, state: &ControlState) -> SlipDecision {
        match state.take_period_pair() {
            Some((front, rear)) => {
                let decision = self.classify(front, rear);
                state.set_decision(decision);
                decision
            }
            None => state.decision(),
        }
    }
}
