//! Indicator LEDs.
//!
//! LED duties are recomputed on every tick from the charger status lines, so a change on any of
//! them shows up within one tick. The only state kept across ticks is the [`Pulse`] ramp that
//! animates "in progress" indications; it moves one step per PWM cycle.
//!
//! | Condition                               | White        | Red      |
//! |-----------------------------------------|--------------|----------|
//! | Charger present, battery full           | solid        | off      |
//! | Charger present, charging               | pulsing      | off      |
//! | Charger present, battery near empty     | dim          | pulsing  |
//! | Charger present, charging stopped       | dim          | off      |
//! | No charger, low battery warning running | off          | pulsing  |
//! | Otherwise                               | off          | off      |

use crate::config::VibeConfig;
use crate::pwm::PwmChannel;
use crate::signals::Inputs;

/// What the charger lines say about the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChargeStatus {
    /// No charger attached
    Absent,
    /// Charging
    Charging,
    /// Charging a battery that is still below the low battery threshold
    ChargingLowBattery,
    /// Battery full
    Complete,
    /// Charger attached but the charger is not charging, e.g. on a fault or a thermal suspend
    Suspended,
}

impl ChargeStatus {
    /// Derive the status from the input lines. Status lines are ignored without a charger.
    pub fn from_inputs(inputs: &Inputs) -> Self {
        if !inputs.charger_present {
            ChargeStatus::Absent
        } else if inputs.charge_complete {
            ChargeStatus::Complete
        } else if !inputs.charging {
            ChargeStatus::Suspended
        } else if inputs.battery_low {
            ChargeStatus::ChargingLowBattery
        } else {
            ChargeStatus::Charging
        }
    }
}

/// Slow brightness ramp bouncing between the configured pulse bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    level: u8,
    rising: bool,
}

impl Pulse {
    /// Ramp starting at the low bound, rising
    pub const fn new(config: &VibeConfig) -> Self {
        Pulse {
            level: config.pulse_low,
            rising: true,
        }
    }

    /// Current brightness
    #[inline(always)]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Move one step, turning around at either bound
    pub fn advance(&mut self, config: &VibeConfig) {
        if self.rising {
            self.level = self.level.saturating_add(1);
            if self.level >= config.pulse_high {
                self.rising = false;
            }
        } else {
            self.level = self.level.saturating_sub(1);
            if self.level <= config.pulse_low {
                self.rising = true;
            }
        }
    }
}

/// White and red LED channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicators {
    white: PwmChannel,
    red: PwmChannel,
    pulse: Pulse,
}

impl Indicators {
    /// Both LEDs dark
    pub const fn new(config: &VibeConfig) -> Self {
        Indicators {
            white: PwmChannel::off(),
            red: PwmChannel::off(),
            pulse: Pulse::new(config),
        }
    }

    /// White LED channel
    #[inline(always)]
    pub fn white(&self) -> &PwmChannel {
        &self.white
    }

    /// Red LED channel
    #[inline(always)]
    pub fn red(&self) -> &PwmChannel {
        &self.red
    }

    /// Pulse ramp
    #[inline(always)]
    pub fn pulse(&self) -> &Pulse {
        &self.pulse
    }

    /// Both LEDs at zero duty
    #[inline]
    pub fn is_dark(&self) -> bool {
        self.white.duty() == 0 && self.red.duty() == 0
    }

    /// Advance the pulse ramp, once per PWM cycle
    #[inline]
    pub fn advance_cycle(&mut self, config: &VibeConfig) {
        self.pulse.advance(config);
    }

    /// Recompute both duties for the current charge status
    pub fn update(&mut self, status: ChargeStatus, low_battery_warning: bool, config: &VibeConfig) {
        let pulse = self.pulse.level();
        let (white, red) = match status {
            ChargeStatus::Complete => (config.full_charge_duty, 0),
            ChargeStatus::Charging => (pulse, 0),
            ChargeStatus::ChargingLowBattery => (config.dim_duty, pulse),
            ChargeStatus::Suspended => (config.dim_duty, 0),
            ChargeStatus::Absent if low_battery_warning => (0, pulse),
            ChargeStatus::Absent => (0, 0),
        };
        self.white.set_duty(white);
        self.red.set_duty(red);
    }

    /// Dark, with the pulse ramp back at its start
    pub fn reset(&mut self, config: &VibeConfig) {
        *self = Indicators::new(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: VibeConfig = VibeConfig::DEFAULT;

    fn charger(charge_complete: bool, battery_low: bool) -> Inputs {
        Inputs {
            charger_present: true,
            charging: !charge_complete,
            charge_complete,
            battery_low,
            ..Inputs::default()
        }
    }

    #[test]
    fn pulse_bounces_between_bounds() {
        let mut pulse = Pulse::new(&CONFIG);
        let mut levels = [0u8; 200];
        for level in levels.iter_mut() {
            pulse.advance(&CONFIG);
            *level = pulse.level();
        }
        assert!(levels.iter().all(|l| (5..=70).contains(l)));
        assert_eq!(levels[64], 70);
        assert_eq!(levels[65], 69);
        assert_eq!(levels[129], 5);
        assert_eq!(levels[130], 6);
    }

    #[test]
    fn status_ignores_lines_without_charger() {
        let inputs = Inputs {
            charge_complete: true,
            battery_low: true,
            ..Inputs::default()
        };
        assert_eq!(ChargeStatus::from_inputs(&inputs), ChargeStatus::Absent);
    }

    #[test]
    fn status_from_charger_lines() {
        assert_eq!(
            ChargeStatus::from_inputs(&charger(true, false)),
            ChargeStatus::Complete
        );
        assert_eq!(
            ChargeStatus::from_inputs(&charger(false, false)),
            ChargeStatus::Charging
        );
        assert_eq!(
            ChargeStatus::from_inputs(&charger(false, true)),
            ChargeStatus::ChargingLowBattery
        );
    }

    #[test]
    fn charger_without_charge_in_progress_is_suspended() {
        let stopped = Inputs {
            charging: false,
            ..charger(false, false)
        };
        assert_eq!(ChargeStatus::from_inputs(&stopped), ChargeStatus::Suspended);
        assert_ne!(
            ChargeStatus::from_inputs(&stopped),
            ChargeStatus::from_inputs(&charger(false, false))
        );
        // Low battery does not turn a stalled charger back into a charging one
        let stopped_low = Inputs {
            battery_low: true,
            ..stopped
        };
        assert_eq!(
            ChargeStatus::from_inputs(&stopped_low),
            ChargeStatus::Suspended
        );
    }

    #[test]
    fn suspended_charge_is_steady_dim_white() {
        let mut leds = Indicators::new(&CONFIG);
        for cycles in 0..20 {
            leds.update(ChargeStatus::Suspended, false, &CONFIG);
            assert_eq!(leds.white().duty(), CONFIG.dim_duty, "cycle {}", cycles);
            assert_eq!(leds.red().duty(), 0);
            leds.advance_cycle(&CONFIG);
        }
    }

    #[test]
    fn full_charge_is_solid_white() {
        let mut leds = Indicators::new(&CONFIG);
        leds.update(ChargeStatus::Complete, false, &CONFIG);
        assert_eq!(leds.white().duty(), 255);
        assert_eq!(leds.red().duty(), 0);
    }

    #[test]
    fn charging_pulses_white() {
        let mut leds = Indicators::new(&CONFIG);
        leds.update(ChargeStatus::Charging, false, &CONFIG);
        assert_eq!(leds.white().duty(), 5);
        for _ in 0..10 {
            leds.advance_cycle(&CONFIG);
        }
        leds.update(ChargeStatus::Charging, false, &CONFIG);
        assert_eq!(leds.white().duty(), 15);
        assert_eq!(leds.red().duty(), 0);
    }

    #[test]
    fn low_battery_charging_is_dim_white_and_red_pulse() {
        let mut leds = Indicators::new(&CONFIG);
        leds.advance_cycle(&CONFIG);
        leds.update(ChargeStatus::ChargingLowBattery, false, &CONFIG);
        assert_eq!(leds.white().duty(), 8);
        assert_eq!(leds.red().duty(), 6);
    }

    #[test]
    fn dark_without_charger() {
        let mut leds = Indicators::new(&CONFIG);
        leds.update(ChargeStatus::Charging, false, &CONFIG);
        leds.update(ChargeStatus::Absent, false, &CONFIG);
        assert!(leds.is_dark());

        leds.update(ChargeStatus::Absent, true, &CONFIG);
        assert!(!leds.is_dark());
        assert_eq!(leds.white().duty(), 0);
    }
}
