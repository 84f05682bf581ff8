//! Time base driven by the TIM2 update interrupt.
//!
//! Each interrupt is exactly one tick. Handling it in interrupt context keeps
//! the counters independent of executor load, so a wheel edge always reads a
//! count that matches wall-clock time.

use brake_core::timebase::TimeBase;
use embassy_stm32::interrupt::typelevel::{self, Handler};

use super::CONTROL_STATE;
use crate::hw::TickTimer;

pub(super) struct TickHandler;

impl Handler<typelevel::TIM2> for TickHandler {
    unsafe fn on_interrupt() {
        TickTimer::acknowledge();
        TimeBase::tick(&CONTROL_STATE);
    }
}

embassy_stm32::bind_interrupts!(pub(super) struct TickIrqs {
    TIM2 => TickHandler;
});
