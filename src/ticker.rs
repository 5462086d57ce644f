//! Tick timer.
//!
//! Timer_B0 counts SMCLK in up mode and raises its overflow interrupt (vector `TIMER0_B1`) once
//! per period. Every interrupt is one PWM step. The overflow flag is not cleared by the vector,
//! so the handler has to [`acknowledge`](Ticker::acknowledge) it before doing the step.

use msp430fr2355::TB0;
use msp430fr2x5x_hal::{
    clock::Smclk,
    timer::{Timer, TimerConfig, TimerParts3},
};

/// Running Timer_B0
pub struct Ticker {
    timer: Timer<TB0>,
    running: bool,
}

impl Ticker {
    /// Start ticking every `period` SMCLK cycles with the interrupt enabled
    pub fn start(tb0: TB0, smclk: &Smclk, period: u16) -> Self {
        let mut timer = TimerParts3::new(tb0, TimerConfig::smclk(smclk)).timer;
        timer.start(period.max(1));
        timer.enable_interrupts();
        info!("tick every {=u16} SMCLK cycles", period);
        Ticker {
            timer,
            running: true,
        }
    }

    /// Clear the overflow flag. Returns whether the timer had overflowed.
    #[inline]
    pub fn acknowledge(&mut self) -> bool {
        self.timer.wait().is_ok()
    }

    /// Stop counting so that SMCLK is no longer requested
    #[inline]
    pub fn pause(&mut self) {
        if self.running {
            self.timer.pause();
            self.running = false;
        }
    }

    /// Count again after [`pause`](Ticker::pause). Has no effect on the period.
    #[inline]
    pub fn resume(&mut self) {
        if !self.running {
            self.timer.resume();
            self.running = true;
        }
    }
}
