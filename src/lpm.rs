//! Low Power Mode (LPM) entry
//!
//! The idle loop only ever uses two modes. While the device is active it waits in LPM0, which
//! stops the CPU but keeps SMCLK running for the tick timer. While it sleeps it waits in LPM4,
//! where every clock is off and only a pin edge can wake it. LPM4 is only reached once nothing
//! requests SMCLK or ACLK any more, so the tick timer has to be stopped first.
//!
//! Unlike `msp430fr2x5x_hal::lpm::enter_lpm0`, [`enter`] enables interrupts in the same
//! instruction that stops the CPU.
//!
//! Power draw in LPM0: approx 40 uA / MHz. In LPM4: approx 820 nA.

use core::arch::asm;

use crate::power::LowPowerMode;

// Status register:
// SCG1 SCG0 OSC_OFF CPU_OFF GIE N Z C
// 7    6    5       4       3   2 1 0
const SCG1:    u8 = 1<<7;
const SCG0:    u8 = 1<<6;
const OSC_OFF: u8 = 1<<5;
const CPU_OFF: u8 = 1<<4;
const GIE:     u8 = 1<<3;

/// For each set bit in the bitmask, set the corresponding bit in the status register.
#[inline(always)]
fn set_sr_bits<const MASK: u8>() {
    unsafe { asm!("bis.b #{mask}, SR", mask = const MASK, options(nomem, nostack)) };
}

/// Enter `mode` with interrupts enabled.
///
/// GIE is set by the same instruction that stops the CPU, so the caller can disable interrupts,
/// decide on a mode from shared state, and call this without an interrupt slipping in between.
/// An interrupt pending at that point is serviced right after entry. Returns once an interrupt
/// handler declared with `wake_cpu` has run.
#[inline(always)]
pub fn enter(mode: LowPowerMode) {
    const LPM0: u8 = CPU_OFF + GIE;
    const LPM3: u8 = SCG1 + SCG0 + CPU_OFF + GIE;
    const LPM4: u8 = SCG1 + SCG0 + OSC_OFF + CPU_OFF + GIE;
    match mode {
        LowPowerMode::Lpm0 => set_sr_bits::<LPM0>(),
        LowPowerMode::Lpm3 => set_sr_bits::<LPM3>(),
        LowPowerMode::Lpm4 => set_sr_bits::<LPM4>(),
    }
}
