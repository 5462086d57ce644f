//! Software PWM.
//!
//! The timer interrupt fires once per PWM step. An 8-bit phase counter walks through the 256 steps
//! of a cycle and every channel is driven high while the step is below its duty:
//!
//! ```text
//! step   0 1 2 3 ... duty-1 duty ... 255
//! out    1 1 1 1 ...   1     0   ...  0
//! ```
//!
//! A duty of 0 therefore keeps a channel off for the whole cycle, and a duty of 255 keeps it on for
//! 255 of the 256 steps. Step 255 is always off; that last step is never filled in.

use crate::signals::Outputs;

/// Whether a channel at `duty` is driven during `step`
#[inline(always)]
pub const fn is_on(step: u8, duty: u8) -> bool {
    step < duty
}

/// 8-bit PWM phase counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepCounter(u8);

impl StepCounter {
    /// Counter at step 0
    pub const fn new() -> Self {
        StepCounter(0)
    }

    /// Current step
    #[inline(always)]
    pub fn step(&self) -> u8 {
        self.0
    }

    /// Move to the next step. Returns `true` when the counter wraps to 0, i.e. a new PWM cycle
    /// starts.
    #[inline(always)]
    pub fn advance(&mut self) -> bool {
        self.0 = self.0.wrapping_add(1);
        self.0 == 0
    }

    /// Back to step 0
    #[inline(always)]
    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// Duty setting of one PWM output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PwmChannel {
    duty: u8,
}

impl PwmChannel {
    /// Channel at zero duty
    pub const fn off() -> Self {
        PwmChannel { duty: 0 }
    }

    /// Duty out of 255
    #[inline(always)]
    pub fn duty(&self) -> u8 {
        self.duty
    }

    /// Set duty out of 255
    #[inline(always)]
    pub fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
    }

    /// Output level during `step`
    #[inline(always)]
    pub fn is_on(&self, step: u8) -> bool {
        is_on(step, self.duty)
    }
}

/// Instantaneous output bits of the three channels during `step`
#[inline]
pub fn render(step: u8, motor: &PwmChannel, white: &PwmChannel, red: &PwmChannel) -> Outputs {
    let mut out = Outputs::empty();
    out.set(Outputs::MOTOR, motor.is_on(step));
    out.set(Outputs::WHITE_LED, white.is_on(step));
    out.set(Outputs::RED_LED, red.is_on(step));
    out
}
