//! Peripheral adapters implementing the `brake-core` capability traits.
//!
//! Pin assignment on the STM32G0B1:
//!
//! | Signal | Pin | Peripheral |
//! |--------|-----|------------|
//! | Lever potentiometer | PA0 | ADC1 IN0, 8-bit |
//! | Front photo-interrupter | PB3 | EXTI3, both edges |
//! | Rear photo-interrupter | PB4 | EXTI4, both edges |
//! | Front caliper servo | PA6 | TIM3 CH1, 50 Hz |
//! | Rear caliper servo | PA7 | TIM3 CH2, 50 Hz |
//! | Time base | - | TIM2 update interrupt, one per tick |

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::time::Duration;

use brake_core::duty::DutyCommand;

/// Update rate of a timer that overflows once per `interval`.
pub fn tick_frequency_hz(interval: Duration) -> u32 {
    let nanos = interval.as_nanos();
    if nanos == 0 {
        return 0;
    }
    u32::try_from(1_000_000_000 / nanos).unwrap_or(u32::MAX)
}

/// Rescales a duty expressed in `period` units onto a timer whose compare
/// register tops out at `max_duty`.
pub fn scale_duty(duty: DutyCommand, period: u16, max_duty: u16) -> u16 {
    if period == 0 {
        return 0;
    }
    let scaled = u32::from(duty.raw()) * u32::from(max_duty) / u32::from(period);
    u16::try_from(scaled).unwrap_or(max_duty).min(max_duty)
}

#[cfg(target_os = "none")]
pub use target::{LeverAdc, ServoPwm, TickTimer, WheelInput};

#[cfg(target_os = "none")]
mod target {
    use core::time::Duration;

    use brake_core::actuator::ActuatorSink;
    use brake_core::duty::DutyCommand;
    use brake_core::lever::{LeverSample, LeverSource};
    use brake_core::wheel::{Edge, EdgeSource, Wheel};
    use embassy_stm32::Peri;
    use embassy_stm32::adc::{Adc, AnyAdcChannel, Resolution, SampleTime};
    use embassy_stm32::exti::ExtiInput;
    use embassy_stm32::interrupt::typelevel::{Binding, Handler};
    use embassy_stm32::interrupt::{self, InterruptExt, Priority};
    use embassy_stm32::pac;
    use embassy_stm32::peripherals::{ADC1, TIM2, TIM3};
    use embassy_stm32::time::Hertz;
    use embassy_stm32::timer::low_level::Timer;
    use embassy_stm32::timer::simple_pwm::SimplePwmChannel;

    use super::{scale_duty, tick_frequency_hz};

    /// TIM2 overflowing once per tick with its update interrupt armed.
    ///
    /// The interrupt runs at the highest NVIC priority so ticks land on time
    /// regardless of what the thread-mode executor is doing.
    pub struct TickTimer<'d> {
        _timer: Timer<'d, TIM2>,
    }

    impl<'d> TickTimer<'d> {
        pub fn start<H>(
            tim: Peri<'d, TIM2>,
            interval: Duration,
            _irqs: impl Binding<interrupt::typelevel::TIM2, H> + 'd,
        ) -> Self
        where
            H: Handler<interrupt::typelevel::TIM2>,
        {
            let timer = Timer::new(tim);
            timer.set_frequency(Hertz(tick_frequency_hz(interval)));
            timer.enable_update_interrupt(true);
            timer.start();

            interrupt::TIM2.set_priority(Priority::P0);
            interrupt::TIM2.unpend();
            unsafe { interrupt::TIM2.enable() };

            Self { _timer: timer }
        }

        /// Clears the update flag; must run once per update interrupt.
        pub fn acknowledge() {
            pac::TIM2.sr().modify(|r| r.set_uif(false));
        }
    }

    /// Free-running 8-bit conversion of the lever potentiometer.
    pub struct LeverAdc<'d> {
        adc: Adc<'d, ADC1>,
        channel: AnyAdcChannel<ADC1>,
    }

    impl<'d> LeverAdc<'d> {
        pub fn new(mut adc: Adc<'d, ADC1>, channel: AnyAdcChannel<ADC1>) -> Self {
            adc.set_resolution(Resolution::BITS8);
            adc.set_sample_time(SampleTime::CYCLES79_5);
            Self { adc, channel }
        }
    }

    impl<'d> LeverSource for LeverAdc<'d> {
        fn next_sample(&mut self) -> Option<LeverSample> {
            let reading = self.adc.blocking_read(&mut self.channel);
            Some(LeverSample(u8::try_from(reading).unwrap_or(u8::MAX)))
        }
    }

    /// Photo-interrupter input that fires on both edges.
    pub struct WheelInput<'d> {
        wheel: Wheel,
        input: ExtiInput<'d>,
    }

    impl<'d> WheelInput<'d> {
        pub fn new(wheel: Wheel, input: ExtiInput<'d>) -> Self {
            Self { wheel, input }
        }

        pub fn wheel(&self) -> Wheel {
            self.wheel
        }

        /// Resolves once the sensor output changes level.
        pub async fn wait_for_transition(&mut self) {
            self.input.wait_for_any_edge().await;
        }
    }

    impl<'d> EdgeSource for WheelInput<'d> {
        fn edge(&mut self) -> Edge {
            Edge::from_level(self.input.is_high())
        }
    }

    /// Front and rear caliper servos on TIM3.
    pub struct ServoPwm<'d> {
        front: SimplePwmChannel<'d, TIM3>,
        rear: SimplePwmChannel<'d, TIM3>,
        period: u16,
    }

    impl<'d> ServoPwm<'d> {
        pub fn new(
            mut front: SimplePwmChannel<'d, TIM3>,
            mut rear: SimplePwmChannel<'d, TIM3>,
            period: u16,
        ) -> Self {
            front.enable();
            rear.enable();
            Self {
                front,
                rear,
                period,
            }
        }
    }

    impl<'d> ActuatorSink for ServoPwm<'d> {
        fn set_duty(&mut self, wheel: Wheel, duty: DutyCommand) {
            let channel = match wheel {
                Wheel::Front => &mut self.front,
                Wheel::Rear => &mut self.rear,
            };
            let max_duty = channel.max_duty_cycle();
            channel.set_duty_cycle(scale_duty(duty, self.period, max_duty));
        }
    }
}
