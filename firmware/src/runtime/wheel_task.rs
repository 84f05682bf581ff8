use brake_core::ControlState;
use brake_core::wheel::{EdgeSource, WheelPeriodEstimator};
use embassy_futures::join::join;

use crate::hw::WheelInput;
use crate::logging;

#[embassy_executor::task]
pub async fn run(
    state: &'static ControlState,
    front: WheelInput<'static>,
    rear: WheelInput<'static>,
) -> ! {
    join(watch(state, front), watch(state, rear)).await;
    loop {
        core::future::pending::<()>().await;
    }
}

async fn watch(state: &'static ControlState, mut input: WheelInput<'static>) {
    let mut estimator = WheelPeriodEstimator::new(input.wheel());
    loop {
        input.wait_for_transition().await;
        let outcome = estimator.on_edge(input.edge(), state);
        logging::log_edge(&outcome);
    }
}
