//! Compile-time device configuration.
//!
//! Everything that differs between board revisions lives in [`VibeConfig`]: the speed table, the
//! debounce and long-press windows, the wave and thump shapes, the indicator brightness levels and
//! the active level of every input line. Configurations are meant to be built as `const` items,
//! in which case [`VibeConfig::checked`] rejects an invalid one at compile time.

use core::fmt;

use crate::motor::{Program, SpeedTable};

/// Number of steps in one PWM cycle. Duty values run from 0 (off) to `PWM_STEPS - 1`.
pub const PWM_STEPS: u32 = 256;

/// Timer compare value that produces one tick per PWM step, so that a full PWM cycle repeats at
/// `pwm_cycle_hz`. The result saturates at `u16::MAX` and is never zero.
pub const fn tick_period(clock_hz: u32, pwm_cycle_hz: u32) -> u16 {
    let steps_hz = pwm_cycle_hz.saturating_mul(PWM_STEPS);
    if steps_hz == 0 {
        return u16::MAX;
    }
    let count = clock_hz / steps_hz;
    if count == 0 {
        1
    } else if count > u16::MAX as u32 {
        u16::MAX
    } else {
        count as u16
    }
}

/// Logic level at which an input line is considered asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Asserted when the line reads high
    ActiveHigh,
    /// Asserted when the line reads low
    ActiveLow,
}

impl Polarity {
    /// Whether a line currently at `level_high` is asserted
    #[inline(always)]
    pub const fn is_asserted(self, level_high: bool) -> bool {
        match self {
            Polarity::ActiveHigh => level_high,
            Polarity::ActiveLow => !level_high,
        }
    }

    /// Level the line rests at while deasserted, which is where its pull resistor has to pull
    #[inline(always)]
    pub const fn idle_high(self) -> bool {
        matches!(self, Polarity::ActiveLow)
    }
}

/// Active level of every input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPolarity {
    /// Button line
    pub button: Polarity,
    /// Charger presence (power good) line
    pub charger_present: Polarity,
    /// Charge in progress status line
    pub charging: Polarity,
    /// End of charge (battery full) status line
    pub charge_complete: Polarity,
    /// Low battery detector line
    pub battery_low: Polarity,
}

impl InputPolarity {
    /// Polarities of the reference board
    pub const DEFAULT: Self = InputPolarity {
        button: Polarity::ActiveHigh,
        charger_present: Polarity::ActiveLow,
        charging: Polarity::ActiveLow,
        charge_complete: Polarity::ActiveLow,
        battery_low: Polarity::ActiveLow,
    };
}

/// Reasons a [`VibeConfig`] can be rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The speed table has no entries
    EmptySpeedTable,
    /// Entry 0 of the speed table is not [`Program::Off`]
    FirstProgramNotOff,
    /// The speed table has more entries than a `u8` index can address
    SpeedTableTooLong,
    /// A thump program has a zero-length on or off phase
    ZeroThumpPhase,
    /// Wave low bound is not below the high bound
    WaveBoundsInverted,
    /// Pulse low bound is not below the high bound
    PulseBoundsInverted,
    /// Debounce lockout window is zero
    ZeroLockout,
    /// Long-press threshold is zero
    ZeroLongPress,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::EmptySpeedTable => "speed table is empty",
            ConfigError::FirstProgramNotOff => "speed table entry 0 must be Off",
            ConfigError::SpeedTableTooLong => "speed table has more than 255 entries",
            ConfigError::ZeroThumpPhase => "thump phases must last at least one cycle",
            ConfigError::WaveBoundsInverted => "wave low bound must be below high bound",
            ConfigError::PulseBoundsInverted => "pulse low bound must be below high bound",
            ConfigError::ZeroLockout => "lockout window must be non-zero",
            ConfigError::ZeroLongPress => "long-press threshold must be non-zero",
        };
        f.write_str(msg)
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibeConfig {
    /// Programs selected in turn by button presses. Entry 0 is always off.
    pub speeds: SpeedTable,
    /// Ticks the button must stay released before another press is accepted
    pub lockout_ticks: u16,
    /// Ticks the button must stay held to force the motor off
    pub long_press_ticks: u16,
    /// Lowest duty of the wave program, where it turns from falling to rising
    pub wave_low: u8,
    /// Highest duty of the wave program, where it turns from rising to falling
    pub wave_high: u8,
    /// Motor duty during the on phase of a thump program
    pub thump_duty: u8,
    /// Lowest brightness of the indicator pulse animation
    pub pulse_low: u8,
    /// Highest brightness of the indicator pulse animation
    pub pulse_high: u8,
    /// White LED duty when the battery is full
    pub full_charge_duty: u8,
    /// White LED duty while charging a nearly empty battery
    pub dim_duty: u8,
    /// PWM cycles the red LED pulses after a low battery shuts the motor off
    pub low_battery_warning_cycles: u16,
    /// Active level of each input line
    pub polarity: InputPolarity,
}

const DEFAULT_SPEEDS: [Program; 7] = [
    Program::Off,
    Program::Steady(16),
    Program::Steady(64),
    Program::Steady(204),
    Program::Thump {
        on_cycles: 10,
        off_cycles: 40,
    },
    Program::Thump {
        on_cycles: 5,
        off_cycles: 5,
    },
    Program::Wave,
];

impl VibeConfig {
    /// Reference configuration: three steady speeds, two thump rhythms and a wave, with a
    /// ~50 ms lockout and a ~2 s long press at a 25.6 kHz tick.
    pub const DEFAULT: Self = VibeConfig {
        speeds: SpeedTable::new(&DEFAULT_SPEEDS),
        lockout_ticks: 1280,
        long_press_ticks: 51_200,
        wave_low: 10,
        wave_high: 250,
        thump_duty: 200,
        pulse_low: 5,
        pulse_high: 70,
        full_charge_duty: 255,
        dim_duty: 8,
        low_battery_warning_cycles: 300,
        polarity: InputPolarity::DEFAULT,
    }
    .checked();

    /// Check every invariant of the configuration
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if let Err(err) = SpeedTable::validate(self.speeds.programs()) {
            return Err(err);
        }
        if self.wave_low >= self.wave_high {
            return Err(ConfigError::WaveBoundsInverted);
        }
        if self.pulse_low >= self.pulse_high {
            return Err(ConfigError::PulseBoundsInverted);
        }
        if self.lockout_ticks == 0 {
            return Err(ConfigError::ZeroLockout);
        }
        if self.long_press_ticks == 0 {
            return Err(ConfigError::ZeroLongPress);
        }
        Ok(())
    }

    /// Returns the configuration unchanged if it is valid, panics otherwise. In a `const` item the
    /// panic becomes a compile error.
    pub const fn checked(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(_) => panic!("invalid vibe configuration"),
        }
    }
}

impl Default for VibeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(VibeConfig::DEFAULT.validate(), Ok(()));
        assert_eq!(VibeConfig::DEFAULT.speeds.len(), 7);
    }

    #[test]
    fn tick_period_matches_reference_clock() {
        // FLL-locked 16 MHz SMCLK (488 x 32768 Hz), 100 Hz PWM cycle
        assert_eq!(tick_period(15_990_784, 100), 624);
        assert_eq!(tick_period(8_000_000, 100), 312);
        // 1 MHz SMCLK, 500 Hz PWM cycle, as in the first board revision
        assert_eq!(tick_period(1_000_000, 500), 7);
    }

    #[test]
    fn tick_period_saturates() {
        assert_eq!(tick_period(1_000, 100), 1);
        assert_eq!(tick_period(24_000_000, 0), u16::MAX);
        assert_eq!(tick_period(u32::MAX, 1), u16::MAX);
    }

    #[test]
    fn polarity_resolves_levels() {
        assert!(Polarity::ActiveHigh.is_asserted(true));
        assert!(!Polarity::ActiveHigh.is_asserted(false));
        assert!(Polarity::ActiveLow.is_asserted(false));
        assert!(!Polarity::ActiveLow.is_asserted(true));
        assert!(Polarity::ActiveLow.idle_high());
        assert!(!Polarity::ActiveHigh.idle_high());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let wave = VibeConfig {
            wave_low: 200,
            wave_high: 100,
            ..VibeConfig::DEFAULT
        };
        assert_eq!(wave.validate(), Err(ConfigError::WaveBoundsInverted));

        let pulse = VibeConfig {
            pulse_low: 70,
            pulse_high: 70,
            ..VibeConfig::DEFAULT
        };
        assert_eq!(pulse.validate(), Err(ConfigError::PulseBoundsInverted));
    }

    #[test]
    fn rejects_zero_windows() {
        let lockout = VibeConfig {
            lockout_ticks: 0,
            ..VibeConfig::DEFAULT
        };
        assert_eq!(lockout.validate(), Err(ConfigError::ZeroLockout));

        let long_press = VibeConfig {
            long_press_ticks: 0,
            ..VibeConfig::DEFAULT
        };
        assert_eq!(long_press.validate(), Err(ConfigError::ZeroLongPress));
    }

    #[test]
    fn rejects_bad_speed_tables() {
        static NOT_OFF: [Program; 2] = [Program::Steady(10), Program::Off];
        static BAD_THUMP: [Program; 2] = [
            Program::Off,
            Program::Thump {
                on_cycles: 0,
                off_cycles: 4,
            },
        ];

        assert_eq!(
            SpeedTable::try_new(&[]).err(),
            Some(ConfigError::EmptySpeedTable)
        );
        assert_eq!(
            SpeedTable::try_new(&NOT_OFF).err(),
            Some(ConfigError::FirstProgramNotOff)
        );
        assert_eq!(
            SpeedTable::try_new(&BAD_THUMP).err(),
            Some(ConfigError::ZeroThumpPhase)
        );
    }

    #[test]
    #[should_panic]
    fn checked_panics_on_invalid_config() {
        VibeConfig {
            lockout_ticks: 0,
            ..VibeConfig::DEFAULT
        }
        .checked();
    }
}
