//! Power state and the low battery latch.
//!
//! The device is either [`PowerState::Active`], with the tick timer running, or
//! [`PowerState::Sleeping`] in the deepest low power mode that still keeps RAM, from which only a
//! pin edge brings it back. Going to sleep leaves a powerup flag behind so that the first edge
//! after waking knows to resynchronise the transient state.
//!
//! A low battery reading is latched: once seen it keeps the motor off until the next wake, even if
//! the battery voltage recovers under the reduced load.

use crate::config::VibeConfig;

/// Whether the tick is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Ticking, outputs being driven
    Active,
    /// Deep sleep until the next pin edge
    Sleeping,
}

/// MSP430 low power modes the idle loop chooses between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPowerMode {
    /// CPU off, all clocks running
    Lpm0,
    /// CPU and high frequency clocks off, ACLK running
    Lpm3,
    /// Everything off, only pin edges wake the CPU
    Lpm4,
}

impl PowerState {
    /// Low power mode the idle loop should wait in. While active SMCLK has to keep clocking the
    /// tick timer, so only the CPU is stopped.
    #[inline]
    pub fn low_power_mode(self) -> LowPowerMode {
        match self {
            PowerState::Active => LowPowerMode::Lpm0,
            PowerState::Sleeping => LowPowerMode::Lpm4,
        }
    }
}

/// Power bookkeeping shared by both handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Power {
    state: PowerState,
    powerup: bool,
    low_battery_latched: bool,
    warning_cycles: u16,
}

impl Power {
    /// Active, nothing latched
    pub const fn new() -> Self {
        Power {
            state: PowerState::Active,
            powerup: false,
            low_battery_latched: false,
            warning_cycles: 0,
        }
    }

    /// Current state
    #[inline(always)]
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// A sleep has happened that no edge has consumed yet
    #[inline(always)]
    pub fn powerup_pending(&self) -> bool {
        self.powerup
    }

    /// Low battery has been seen since the last wake
    #[inline(always)]
    pub fn low_battery_latched(&self) -> bool {
        self.low_battery_latched
    }

    /// The red low battery warning is still running
    #[inline(always)]
    pub fn warning_active(&self) -> bool {
        self.warning_cycles > 0
    }

    /// Go to sleep, leaving the powerup flag for the wake handler
    pub fn enter_sleep(&mut self) {
        self.state = PowerState::Sleeping;
        self.powerup = true;
    }

    /// Back to active
    pub fn resume(&mut self) {
        self.state = PowerState::Active;
    }

    /// Consume the powerup flag. When it was set, the low battery latch is cleared as well.
    pub fn take_powerup(&mut self) -> bool {
        if !self.powerup {
            return false;
        }
        self.powerup = false;
        self.low_battery_latched = false;
        self.warning_cycles = 0;
        true
    }

    /// Record a low battery reading. Returns `true` the first time it latches, which also starts
    /// the warning.
    pub fn latch_low_battery(&mut self, config: &VibeConfig) -> bool {
        if self.low_battery_latched {
            return false;
        }
        self.low_battery_latched = true;
        self.warning_cycles = config.low_battery_warning_cycles;
        true
    }

    /// Count the warning down, once per PWM cycle
    #[inline]
    pub fn advance_cycle(&mut self) {
        self.warning_cycles = self.warning_cycles.saturating_sub(1);
    }
}

impl Default for Power {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: VibeConfig = VibeConfig {
        low_battery_warning_cycles: 3,
        ..VibeConfig::DEFAULT
    };

    #[test]
    fn sleep_maps_to_deepest_mode() {
        assert_eq!(PowerState::Active.low_power_mode(), LowPowerMode::Lpm0);
        assert_eq!(PowerState::Sleeping.low_power_mode(), LowPowerMode::Lpm4);
    }

    #[test]
    fn powerup_flag_is_consumed_once() {
        let mut power = Power::new();
        assert!(!power.take_powerup());
        power.enter_sleep();
        assert_eq!(power.state(), PowerState::Sleeping);
        assert!(power.take_powerup());
        assert!(!power.take_powerup());
    }

    #[test]
    fn low_battery_latches_until_wake() {
        let mut power = Power::new();
        assert!(power.latch_low_battery(&CONFIG));
        assert!(!power.latch_low_battery(&CONFIG));
        assert!(power.low_battery_latched());

        power.resume();
        assert!(power.low_battery_latched());

        power.enter_sleep();
        power.take_powerup();
        assert!(!power.low_battery_latched());
        assert!(!power.warning_active());
    }

    #[test]
    fn warning_runs_for_configured_cycles() {
        let mut power = Power::new();
        power.latch_low_battery(&CONFIG);
        for _ in 0..3 {
            assert!(power.warning_active());
            power.advance_cycle();
        }
        assert!(!power.warning_active());
        assert!(power.low_battery_latched());
    }
}
