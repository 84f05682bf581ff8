use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::{Adc, AdcChannel};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{OutputType, Pull};
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::signal::Signal;

use brake_core::duty::ActuatorCommands;
use brake_core::wheel::Wheel;
use brake_core::{BrakeCalibration, ControlState};

use crate::hw::{LeverAdc, ServoPwm, TickTimer, WheelInput};
use crate::logging;

mod actuator_task;
mod lever_task;
mod tick;
mod wheel_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Latest commands from the lever task, awaiting the actuator task.
pub(super) type CommandSignal = Signal<ThreadModeRawMutex, ActuatorCommands>;

pub(super) const CALIBRATION: BrakeCalibration = BrakeCalibration::DEFAULT;

pub(super) static CONTROL_STATE: ControlState = ControlState::new(CALIBRATION);
pub(super) static ACTUATOR_COMMANDS: CommandSignal = Signal::new();

/// HSI16 through the PLL to a 64 MHz system clock, leaving headroom for the
/// 100 kHz tick interrupt.
fn clock_config() -> hal::Config {
    use hal::rcc::{Hsi, HsiSysDiv, Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};

    let mut config = hal::Config::default();
    config.rcc.hsi = Some(Hsi {
        sys_div: HsiSysDiv::DIV1,
    });
    config.rcc.pll = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV1,
        mul: PllMul::MUL16,
        divp: None,
        divq: None,
        divr: Some(PllRDiv::DIV4),
    });
    config.rcc.sys = Sysclk::PLL1_R;
    config
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    if let Err(error) = CALIBRATION.validate() {
        logging::log_calibration_error(error);
        panic!("brake calibration rejected");
    }

    let config = clock_config();
    let hal::Peripherals {
        PA0,
        PA6,
        PA7,
        PB3,
        PB4,
        EXTI3,
        EXTI4,
        ADC1,
        TIM2,
        TIM3,
        ..
    } = hal::init(config);

    let lever = LeverAdc::new(Adc::new(ADC1), PA0.degrade_adc());

    let front_wheel = WheelInput::new(Wheel::Front, ExtiInput::new(PB3, EXTI3, Pull::None));
    let rear_wheel = WheelInput::new(Wheel::Rear, ExtiInput::new(PB4, EXTI4, Pull::None));

    let pwm = SimplePwm::new(
        TIM3,
        Some(PwmPin::new(PA6, OutputType::PushPull)),
        Some(PwmPin::new(PA7, OutputType::PushPull)),
        None,
        None,
        Hertz(CALIBRATION.pwm_frequency_hz),
        CountingMode::EdgeAlignedUp,
    );
    let channels = pwm.split();
    let servos = ServoPwm::new(channels.ch1, channels.ch2, CALIBRATION.pwm_period);

    let _tick_timer = TickTimer::start(TIM2, CALIBRATION.tick_interval, tick::TickIrqs);

    logging::log_startup(&CALIBRATION);

    spawner
        .spawn(actuator_task::run(&ACTUATOR_COMMANDS, &CONTROL_STATE, servos))
        .expect("failed to spawn actuator task");

    spawner
        .spawn(wheel_task::run(&CONTROL_STATE, front_wheel, rear_wheel))
        .expect("failed to spawn wheel task");

    spawner
        .spawn(lever_task::run(
            &CONTROL_STATE,
            &ACTUATOR_COMMANDS,
            lever,
            CALIBRATION,
        ))
        .expect("failed to spawn lever task");

    core::future::pending::<()>().await;
}
