//! Button debounce and long-press detection.
//!
//! Debouncing is driven from the tick, not from a separate timer. An accepted press arms a lockout
//! window; as long as the button is still held the window keeps being re-armed, and it only drains
//! once the button is released. New presses are ignored until it reaches zero.
//!
//! While the button is held inside the lockout window a second countdown runs. When it expires
//! the press is reported as a long press and the countdown is re-armed, so holding the button
//! keeps reporting one long press per window.

use crate::config::VibeConfig;

/// Reported by [`Debounce::tick`] when the button has been held for the long-press window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LongPress;

/// Lockout and long-press countdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    lockout: u16,
    long_press: u16,
}

impl Debounce {
    /// Settled state with a full long-press window
    pub const fn new(config: &VibeConfig) -> Self {
        Debounce {
            lockout: 0,
            long_press: config.long_press_ticks,
        }
    }

    /// Remaining lockout ticks
    #[inline(always)]
    pub fn lockout(&self) -> u16 {
        self.lockout
    }

    /// Remaining long-press ticks
    #[inline(always)]
    pub fn long_press(&self) -> u16 {
        self.long_press
    }

    /// No lockout pending, so a new edge may be accepted
    #[inline(always)]
    pub fn is_settled(&self) -> bool {
        self.lockout == 0
    }

    /// Start both windows after an accepted edge
    pub fn arm(&mut self, config: &VibeConfig) {
        self.lockout = config.lockout_ticks;
        self.long_press = config.long_press_ticks;
    }

    /// Drop any pending lockout
    pub fn clear(&mut self, config: &VibeConfig) {
        self.lockout = 0;
        self.long_press = config.long_press_ticks;
    }

    /// Account for one tick with the button at `pressed`
    pub fn tick(&mut self, pressed: bool, config: &VibeConfig) -> Option<LongPress> {
        if pressed {
            if self.lockout == 0 {
                return None;
            }
            self.lockout = config.lockout_ticks;
            self.long_press = self.long_press.saturating_sub(1);
            if self.long_press == 0 {
                self.long_press = config.long_press_ticks;
                return Some(LongPress);
            }
        } else {
            self.lockout = self.lockout.saturating_sub(1);
            self.long_press = config.long_press_ticks;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: VibeConfig = VibeConfig {
        lockout_ticks: 4,
        long_press_ticks: 10,
        ..VibeConfig::DEFAULT
    };

    #[test]
    fn released_button_drains_lockout() {
        let mut debounce = Debounce::new(&CONFIG);
        debounce.arm(&CONFIG);
        for remaining in (0..4).rev() {
            assert!(!debounce.is_settled());
            debounce.tick(false, &CONFIG);
            assert_eq!(debounce.lockout(), remaining);
        }
        assert!(debounce.is_settled());
        // never below zero
        debounce.tick(false, &CONFIG);
        assert_eq!(debounce.lockout(), 0);
    }

    #[test]
    fn bounce_rearms_lockout() {
        let mut debounce = Debounce::new(&CONFIG);
        debounce.arm(&CONFIG);
        debounce.tick(false, &CONFIG);
        debounce.tick(false, &CONFIG);
        assert_eq!(debounce.lockout(), 2);
        debounce.tick(true, &CONFIG);
        assert_eq!(debounce.lockout(), 4);
    }

    #[test]
    fn hold_reports_long_press_once_per_window() {
        let mut debounce = Debounce::new(&CONFIG);
        debounce.arm(&CONFIG);
        let presses = (0..30)
            .filter_map(|_| debounce.tick(true, &CONFIG))
            .count();
        assert_eq!(presses, 3);
        assert!(!debounce.is_settled());
    }

    #[test]
    fn release_resets_long_press() {
        let mut debounce = Debounce::new(&CONFIG);
        debounce.arm(&CONFIG);
        for _ in 0..9 {
            assert_eq!(debounce.tick(true, &CONFIG), None);
        }
        debounce.tick(false, &CONFIG);
        assert_eq!(debounce.long_press(), 10);
        debounce.tick(true, &CONFIG);
        assert_eq!(debounce.long_press(), 9);
    }

    #[test]
    fn pressed_while_settled_does_nothing() {
        let mut debounce = Debounce::new(&CONFIG);
        for _ in 0..20 {
            assert_eq!(debounce.tick(true, &CONFIG), None);
        }
        assert!(debounce.is_settled());
        assert_eq!(debounce.long_press(), 10);
    }
}
