//! Logging hooks for control-loop events.
//!
//! The core crate reports what each handler did through outcome values; the
//! tasks hand those to the helpers here, which format them once and emit via
//! defmt on the MCU or stdout on the host.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use brake_core::BrakeCalibration;
use brake_core::CalibrationError;
use brake_core::duty::ActuatorCommands;
use brake_core::slip::SlipDecision;
use brake_core::wheel::{EdgeOutcome, EdgeOutcomeKind};

/// Reports the calibration the loop starts with.
pub fn log_startup(calibration: &BrakeCalibration) {
    emit_startup(
        u64::try_from(calibration.tick_interval.as_micros()).unwrap_or(u64::MAX),
        calibration.difference_threshold,
        calibration.min_duty,
        calibration.max_duty(),
        calibration.pwm_frequency_hz,
    );
}

/// Reports measurements and out-of-order transitions; plain captures are quiet.
pub fn log_edge(outcome: &EdgeOutcome) {
    let wheel = outcome.wheel.label();
    match outcome.kind {
        EdgeOutcomeKind::Measured(period) => emit_period(wheel, period),
        EdgeOutcomeKind::Captured(_) => {}
    }
    if !outcome.in_order {
        emit_out_of_order(wheel, edge_label(outcome.kind));
    }
}

pub fn log_decision_change(
    previous: SlipDecision,
    current: SlipDecision,
    commands: ActuatorCommands,
) {
    emit_decision(
        previous.label(),
        current.label(),
        commands.front.raw(),
        commands.rear.raw(),
    );
}

pub fn log_calibration_error(error: CalibrationError) {
    emit_calibration_error(error);
}

const fn edge_label(kind: EdgeOutcomeKind) -> &'static str {
    match kind {
        EdgeOutcomeKind::Captured(_) => "rising",
        EdgeOutcomeKind::Measured(_) => "falling",
    }
}

#[cfg(target_os = "none")]
fn emit_startup(tick_us: u64, threshold: u32, min_duty: u16, max_duty: u32, pwm_hz: u32) {
    defmt::info!(
        "brake: loop armed tick={}us threshold={} duty={}..{} pwm={}Hz",
        tick_us,
        threshold,
        min_duty,
        max_duty,
        pwm_hz
    );
}

#[cfg(not(target_os = "none"))]
fn emit_startup(tick_us: u64, threshold: u32, min_duty: u16, max_duty: u32, pwm_hz: u32) {
    println!(
        "brake: loop armed tick={tick_us}us threshold={threshold} duty={min_duty}..{max_duty} pwm={pwm_hz}Hz"
    );
}

#[cfg(target_os = "none")]
fn emit_period(wheel: &'static str, period: u32) {
    defmt::debug!("wheel:{} period={} ticks", wheel, period);
}

#[cfg(not(target_os = "none"))]
fn emit_period(wheel: &'static str, period: u32) {
    println!("wheel:{wheel} period={period} ticks");
}

#[cfg(target_os = "none")]
fn emit_out_of_order(wheel: &'static str, edge: &'static str) {
    defmt::warn!("wheel:{} unexpected {} edge", wheel, edge);
}

#[cfg(not(target_os = "none"))]
fn emit_out_of_order(wheel: &'static str, edge: &'static str) {
    println!("wheel:{wheel} unexpected {edge} edge");
}

#[cfg(target_os = "none")]
fn emit_decision(previous: &'static str, current: &'static str, front: u16, rear: u16) {
    defmt::info!(
        "slip: {} -> {} front={} rear={}",
        previous,
        current,
        front,
        rear
    );
}

#[cfg(not(target_os = "none"))]
fn emit_decision(previous: &'static str, current: &'static str, front: u16, rear: u16) {
    println!("slip: {previous} -> {current} front={front} rear={rear}");
}

#[cfg(target_os = "none")]
fn emit_calibration_error(error: CalibrationError) {
    defmt::error!("brake: invalid calibration: {}", defmt::Display2Format(&error));
}

#[cfg(not(target_os = "none"))]
fn emit_calibration_error(error: CalibrationError) {
    println!("brake: invalid calibration: {error}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_labels_follow_outcome_kind() {
        assert_eq!(edge_label(EdgeOutcomeKind::Captured(3)), "rising");
        assert_eq!(edge_label(EdgeOutcomeKind::Measured(3)), "falling");
    }
}
