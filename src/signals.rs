//! Named I/O signals and the adapter seam to the hardware.
//!
//! The control core never looks at port bits. Inputs arrive as [`RawLevels`] (what each line reads)
//! and are resolved against the configured [`InputPolarity`] into [`Inputs`] (what each line
//! means). Outputs leave as [`Outputs`] flags named after the device they drive. A [`SignalIo`]
//! implementation translates between these and the platform: [`PinSignals`] does so for any set
//! of `embedded-hal` pins, and `board::Port1Board` adds the MSP430 Port 1 edge interrupts on top.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::config::{InputPolarity, Polarity};

bitflags::bitflags! {
    /// Output lines driven during one tick
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Outputs: u8 {
        /// Motor driver
        const MOTOR = 1 << 0;
        /// White indicator LED
        const WHITE_LED = 1 << 1;
        /// Red indicator LED
        const RED_LED = 1 << 2;
    }
}

/// Electrical level of every input line, `true` meaning the line reads high
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawLevels {
    /// Button line
    pub button: bool,
    /// Charger presence (power good) line
    pub charger_present: bool,
    /// Charge in progress status line
    pub charging: bool,
    /// End of charge status line
    pub charge_complete: bool,
    /// Low battery detector line
    pub battery_low: bool,
}

impl RawLevels {
    /// Interpret the levels with the given polarities
    pub fn resolve(&self, polarity: &InputPolarity) -> Inputs {
        Inputs {
            button_pressed: polarity.button.is_asserted(self.button),
            charger_present: polarity.charger_present.is_asserted(self.charger_present),
            charging: polarity.charging.is_asserted(self.charging),
            charge_complete: polarity.charge_complete.is_asserted(self.charge_complete),
            battery_low: polarity.battery_low.is_asserted(self.battery_low),
        }
    }
}

/// Logical state of every input line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inputs {
    /// Button held down
    pub button_pressed: bool,
    /// Charger attached
    pub charger_present: bool,
    /// Charge in progress. Only meaningful while the charger is present.
    pub charging: bool,
    /// Battery full. Only meaningful while the charger is present.
    pub charge_complete: bool,
    /// Battery below the safety threshold
    pub battery_low: bool,
}

/// Line whose edge raised the pin interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeSource {
    /// Button pressed
    Button,
    /// Charger attached or removed
    Charger,
}

/// Adapter between the named signals and a platform's pins
pub trait SignalIo {
    /// Pin access error
    type Error;

    /// Read the level of every input line
    fn sample(&mut self) -> Result<RawLevels, Self::Error>;

    /// Drive every output line
    fn drive(&mut self, outputs: Outputs) -> Result<(), Self::Error>;
}

/// Edge a pin interrupt waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

impl Trigger {
    /// Edge on which a line with this polarity becomes asserted
    pub const fn on_assert(polarity: Polarity) -> Self {
        match polarity {
            Polarity::ActiveHigh => Trigger::Rising,
            Polarity::ActiveLow => Trigger::Falling,
        }
    }

    /// Edge leading away from the level the line reads now, so that the next change is seen
    /// whichever way it goes
    pub const fn leaving(level_high: bool) -> Self {
        if level_high {
            Trigger::Falling
        } else {
            Trigger::Rising
        }
    }
}

/// [`SignalIo`] over individual `embedded-hal` pins. Every pin has its own type, as HAL pins
/// carry their port and number in the type; they only have to agree on the error type.
pub struct PinSignals<BTN, CHG, CIP, EOC, LOW, MOT, WHT, RED> {
    /// Button input
    pub button: BTN,
    /// Charger presence input
    pub charger_present: CHG,
    /// Charge in progress input
    pub charging: CIP,
    /// End of charge input
    pub charge_complete: EOC,
    /// Low battery input
    pub battery_low: LOW,
    /// Motor output
    pub motor: MOT,
    /// White LED output
    pub white_led: WHT,
    /// Red LED output
    pub red_led: RED,
}

impl<BTN, CHG, CIP, EOC, LOW, MOT, WHT, RED, E> SignalIo
    for PinSignals<BTN, CHG, CIP, EOC, LOW, MOT, WHT, RED>
where
    BTN: InputPin<Error = E>,
    CHG: InputPin<Error = E>,
    CIP: InputPin<Error = E>,
    EOC: InputPin<Error = E>,
    LOW: InputPin<Error = E>,
    MOT: OutputPin<Error = E>,
    WHT: OutputPin<Error = E>,
    RED: OutputPin<Error = E>,
{
    type Error = E;

    fn sample(&mut self) -> Result<RawLevels, E> {
        Ok(RawLevels {
            button: self.button.is_high()?,
            charger_present: self.charger_present.is_high()?,
            charging: self.charging.is_high()?,
            charge_complete: self.charge_complete.is_high()?,
            battery_low: self.battery_low.is_high()?,
        })
    }

    fn drive(&mut self, outputs: Outputs) -> Result<(), E> {
        self.motor
            .set_state(PinState::from(outputs.contains(Outputs::MOTOR)))?;
        self.white_led
            .set_state(PinState::from(outputs.contains(Outputs::WHITE_LED)))?;
        self.red_led
            .set_state(PinState::from(outputs.contains(Outputs::RED_LED)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct Line(bool);

    impl ErrorType for Line {
        type Error = Infallible;
    }

    impl InputPin for Line {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    struct Led(bool);

    impl ErrorType for Led {
        type Error = Infallible;
    }

    impl OutputPin for Led {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0 = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0 = true;
            Ok(())
        }
    }

    type Bench = PinSignals<Line, Line, Line, Line, Line, Led, Led, Led>;

    fn signals(levels: [bool; 5]) -> Bench {
        PinSignals {
            button: Line(levels[0]),
            charger_present: Line(levels[1]),
            charging: Line(levels[2]),
            charge_complete: Line(levels[3]),
            battery_low: Line(levels[4]),
            motor: Led(false),
            white_led: Led(false),
            red_led: Led(false),
        }
    }

    #[test]
    fn default_polarity_idle_lines() {
        // Button released, every active-low status line pulled high
        let raw = RawLevels {
            button: false,
            charger_present: true,
            charging: true,
            charge_complete: true,
            battery_low: true,
        };
        assert_eq!(raw.resolve(&InputPolarity::DEFAULT), Inputs::default());
    }

    #[test]
    fn active_low_button() {
        let polarity = InputPolarity {
            button: Polarity::ActiveLow,
            ..InputPolarity::DEFAULT
        };
        let raw = RawLevels {
            button: false,
            ..RawLevels::default()
        };
        assert!(raw.resolve(&polarity).button_pressed);
    }

    #[test]
    fn pin_signals_sample_every_line() {
        let mut io = signals([true, false, true, false, true]);
        let raw = io.sample().unwrap();
        assert_eq!(
            raw,
            RawLevels {
                button: true,
                charger_present: false,
                charging: true,
                charge_complete: false,
                battery_low: true,
            }
        );
    }

    #[test]
    fn pin_signals_drive_outputs_by_name() {
        let mut io = signals([false; 5]);
        io.drive(Outputs::MOTOR | Outputs::RED_LED).unwrap();
        assert!(io.motor.0);
        assert!(!io.white_led.0);
        assert!(io.red_led.0);

        io.drive(Outputs::empty()).unwrap();
        assert!(!io.motor.0 && !io.white_led.0 && !io.red_led.0);
    }

    #[test]
    fn press_edge_follows_button_polarity() {
        assert_eq!(Trigger::on_assert(Polarity::ActiveHigh), Trigger::Rising);
        assert_eq!(Trigger::on_assert(Polarity::ActiveLow), Trigger::Falling);
    }

    #[test]
    fn charger_edge_leads_away_from_current_level() {
        // Default wiring: the charger line idles high and drops on attach
        let absent = true;
        assert_eq!(Trigger::leaving(absent), Trigger::Falling);
        // Once attached the line is low, so removal has to be a rising edge
        let attached = false;
        assert_eq!(Trigger::leaving(attached), Trigger::Rising);
    }
}
