use brake_core::ControlState;
use brake_core::actuator::ActuatorDriver;

use super::CommandSignal;
use crate::hw::ServoPwm;

#[embassy_executor::task]
pub async fn run(
    commands: &'static CommandSignal,
    state: &'static ControlState,
    servos: ServoPwm<'static>,
) -> ! {
    let mut driver = ActuatorDriver::new(servos);
    driver.refresh(state);

    loop {
        let next = commands.wait().await;
        driver.apply(next);
    }
}
