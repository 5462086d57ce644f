//! Motor programs and the per-cycle motor mode state machine.
//!
//! A button press selects the next [`Program`] from the [`SpeedTable`]. Selecting a program puts
//! the [`Motor`] into one of the [`MotorMode`]s with an initial duty, and from then on the mode
//! evolves once per PWM cycle:
//!
//! ```text
//! Steady    fixed point
//! WaveUp    duty += 1, turns into WaveDown at >= wave_high
//! WaveDown  duty -= 1, turns into WaveUp at <= wave_low
//! ThumpOn   thump_duty for on_cycles, then ThumpOff
//! ThumpOff  zero duty for off_cycles, then ThumpOn
//! ```

use crate::config::{ConfigError, VibeConfig};
use crate::pwm::PwmChannel;

/// One entry of the speed table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Program {
    /// Motor off
    Off,
    /// Constant duty
    Steady(u8),
    /// Duty sweeping up and down between the configured wave bounds
    Wave,
    /// Pulses of the configured thump duty
    Thump {
        /// PWM cycles spent at thump duty
        on_cycles: u8,
        /// PWM cycles spent off
        off_cycles: u8,
    },
}

/// How the motor duty evolves at each PWM cycle boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorMode {
    /// Duty never changes
    Steady,
    /// Duty rising towards the wave high bound
    WaveUp,
    /// Duty falling towards the wave low bound
    WaveDown,
    /// On phase of a thump
    ThumpOn,
    /// Off phase of a thump
    ThumpOff,
}

/// Ordered list of programs cycled through by the button. Entry 0 is always [`Program::Off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedTable(&'static [Program]);

impl SpeedTable {
    /// Wrap a program list, panicking (at compile time in `const` context) if it is invalid
    pub const fn new(programs: &'static [Program]) -> Self {
        match Self::validate(programs) {
            Ok(()) => SpeedTable(programs),
            Err(_) => panic!("invalid speed table"),
        }
    }

    /// Wrap a program list, rejecting an invalid one
    pub const fn try_new(programs: &'static [Program]) -> Result<Self, ConfigError> {
        match Self::validate(programs) {
            Ok(()) => Ok(SpeedTable(programs)),
            Err(err) => Err(err),
        }
    }

    pub(crate) const fn validate(programs: &[Program]) -> Result<(), ConfigError> {
        if programs.is_empty() {
            return Err(ConfigError::EmptySpeedTable);
        }
        if programs.len() > u8::MAX as usize {
            return Err(ConfigError::SpeedTableTooLong);
        }
        if !matches!(programs[0], Program::Off) {
            return Err(ConfigError::FirstProgramNotOff);
        }
        let mut i = 1;
        while i < programs.len() {
            if let Program::Thump {
                on_cycles,
                off_cycles,
            } = programs[i]
            {
                if on_cycles == 0 || off_cycles == 0 {
                    return Err(ConfigError::ZeroThumpPhase);
                }
            }
            i += 1;
        }
        Ok(())
    }

    /// Underlying program list
    #[inline(always)]
    pub const fn programs(&self) -> &'static [Program] {
        self.0
    }

    /// Number of entries
    #[inline(always)]
    pub const fn len(&self) -> u8 {
        self.0.len() as u8
    }

    /// Always false, a valid table holds at least the off entry
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Program at `index`, or `None` if the index is past the end
    #[inline]
    pub fn get(&self, index: SpeedIndex) -> Option<Program> {
        self.0.get(index.0 as usize).copied()
    }
}

/// Position in the speed table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedIndex(u8);

impl SpeedIndex {
    /// The off entry
    pub const OFF: SpeedIndex = SpeedIndex(0);

    /// Index `n`
    #[inline(always)]
    pub const fn new(n: u8) -> Self {
        SpeedIndex(n)
    }

    /// Raw index value
    #[inline(always)]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether this is the off entry
    #[inline(always)]
    pub const fn is_off(self) -> bool {
        self.0 == 0
    }

    /// Next entry of a table with `len` entries, wrapping back to off after the last one
    #[inline]
    pub const fn next(self, len: u8) -> Self {
        let n = self.0 as u16 + 1;
        if n >= len as u16 {
            SpeedIndex::OFF
        } else {
            SpeedIndex(n as u8)
        }
    }
}

/// Motor PWM channel together with its mode state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Motor {
    channel: PwmChannel,
    mode: MotorMode,
    // Cycles spent in the current thump phase
    timer: u8,
    thump_on: u8,
    thump_off: u8,
}

impl Motor {
    /// Stopped motor
    pub const fn new() -> Self {
        Motor {
            channel: PwmChannel::off(),
            mode: MotorMode::Steady,
            timer: 0,
            thump_on: 0,
            thump_off: 0,
        }
    }

    /// Current duty
    #[inline(always)]
    pub fn duty(&self) -> u8 {
        self.channel.duty()
    }

    /// Current mode
    #[inline(always)]
    pub fn mode(&self) -> MotorMode {
        self.mode
    }

    /// PWM channel driving the motor
    #[inline(always)]
    pub fn channel(&self) -> &PwmChannel {
        &self.channel
    }

    /// True only when the motor is stopped for good. The off phase of a thump has zero duty but
    /// is not idle.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.mode == MotorMode::Steady && self.channel.duty() == 0
    }

    /// Stop the motor
    pub fn stop(&mut self) {
        *self = Motor::new();
    }

    /// Start `program` from its first phase
    pub fn apply(&mut self, program: Program, config: &VibeConfig) {
        self.timer = 0;
        match program {
            Program::Off => self.stop(),
            Program::Steady(duty) => {
                self.mode = MotorMode::Steady;
                self.channel.set_duty(duty);
            }
            Program::Wave => {
                self.mode = MotorMode::WaveUp;
                self.channel.set_duty(config.wave_low);
            }
            Program::Thump {
                on_cycles,
                off_cycles,
            } => {
                self.mode = MotorMode::ThumpOn;
                self.thump_on = on_cycles;
                self.thump_off = off_cycles;
                self.channel.set_duty(config.thump_duty);
            }
        }
    }

    /// Advance the mode state machine by one PWM cycle
    pub fn advance_cycle(&mut self, config: &VibeConfig) {
        let duty = self.channel.duty();
        match self.mode {
            MotorMode::Steady => {}
            MotorMode::WaveUp => {
                let duty = duty.saturating_add(1);
                self.channel.set_duty(duty);
                if duty >= config.wave_high {
                    self.mode = MotorMode::WaveDown;
                }
            }
            MotorMode::WaveDown => {
                let duty = duty.saturating_sub(1);
                self.channel.set_duty(duty);
                if duty <= config.wave_low {
                    self.mode = MotorMode::WaveUp;
                }
            }
            MotorMode::ThumpOn => {
                self.timer = self.timer.saturating_add(1);
                if self.timer >= self.thump_on {
                    self.timer = 0;
                    self.channel.set_duty(0);
                    self.mode = MotorMode::ThumpOff;
                }
            }
            MotorMode::ThumpOff => {
                self.timer = self.timer.saturating_add(1);
                if self.timer >= self.thump_off {
                    self.timer = 0;
                    self.channel.set_duty(config.thump_duty);
                    self.mode = MotorMode::ThumpOn;
                }
            }
        }
    }
}

impl Default for Motor {
    fn default() -> Self {
        Self::new()
    }
}
