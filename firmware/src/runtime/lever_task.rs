use brake_core::duty::DutyMapper;
use brake_core::lever::{LeverSampler, LeverSource};
use brake_core::{BrakeCalibration, ControlState};
use embassy_time::{Duration, Ticker};

use super::CommandSignal;
use crate::hw::LeverAdc;
use crate::logging;

/// Conversion cadence; well above the 50 Hz servo update rate.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

#[embassy_executor::task]
pub async fn run(
    state: &'static ControlState,
    commands: &'static CommandSignal,
    mut lever: LeverAdc<'static>,
    calibration: BrakeCalibration,
) -> ! {
    let sampler = LeverSampler::new(&calibration);
    let mapper = DutyMapper::new(&calibration);
    let mut decision = state.decision();
    let mut ticker = Ticker::every(SAMPLE_INTERVAL);

    loop {
        if let Some(sample) = lever.next_sample() {
            let update = sampler.on_sample(sample, &mapper, state);
            // Signal overwrites any value the actuator task has not yet applied.
            commands.signal(update);

            let current = state.decision();
            if current != decision {
                logging::log_decision_change(decision, current, update);
                decision = current;
            }
        }

        ticker.next().await;
    }
}
