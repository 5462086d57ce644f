//! Port 1 signal adapter.
//!
//! Every line of the device sits on Port 1, which is also the port with the pin interrupt vector
//! the firmware wakes on. [`Port1Board`] owns the split Port 1 pins and the `P1IV` register, reads
//! and drives them through [`PinSignals`], and arms the two edge sources on top:
//!
//! | Pin  | Signal             | Direction   |
//! |------|--------------------|-------------|
//! | P1.0 | charge in progress | input       |
//! | P1.1 | motor              | output      |
//! | P1.2 | charger present    | input, edge |
//! | P1.3 | low battery        | input       |
//! | P1.4 | red LED            | output      |
//! | P1.5 | white LED          | output      |
//! | P1.6 | button             | input, edge |
//! | P1.7 | end of charge      | input       |
//!
//! Inputs need the pull resistor towards their idle level: pull-down for an active-high line and
//! pull-up for an active-low one. The pull is part of each pin's type, so the firmware picks it
//! when it configures the port and [`Port1Board::new`] checks it against the polarity.

use core::convert::Infallible;

use embedded_hal::digital::InputPin;
use msp430fr2355::P1;
use msp430fr2x5x_hal::gpio::{
    GpioVector, Input, Output, Pin, Pin0, Pin1, Pin2, Pin3, Pin4, Pin5, Pin6, Pin7, Pulldown,
    Pullup, PxIV,
};

use crate::config::{InputPolarity, Polarity};
use crate::signals::{EdgeSource, Outputs, PinSignals, RawLevels, SignalIo, Trigger};

/// Pull resistor of an input pin
pub trait Pull {
    /// The resistor holds the line high
    const IDLE_HIGH: bool;
}

impl Pull for Pullup {
    const IDLE_HIGH: bool = true;
}

impl Pull for Pulldown {
    const IDLE_HIGH: bool = false;
}

/// Button input
pub type ButtonPin<PULL> = Pin<P1, Pin6, Input<PULL>>;
/// Charger presence input
pub type ChargerPin<PULL> = Pin<P1, Pin2, Input<PULL>>;

/// Port 1 pins by signal. The type parameters are the pulls of the button, charger presence,
/// charge in progress, end of charge and low battery inputs.
pub type Port1Pins<BP, CP, IP, EP, LP> = PinSignals<
    ButtonPin<BP>,
    ChargerPin<CP>,
    Pin<P1, Pin0, Input<IP>>,
    Pin<P1, Pin7, Input<EP>>,
    Pin<P1, Pin3, Input<LP>>,
    Pin<P1, Pin1, Output>,
    Pin<P1, Pin5, Output>,
    Pin<P1, Pin4, Output>,
>;

macro_rules! select_edge {
    ($pin: expr, $trigger: expr) => {
        match $trigger {
            Trigger::Rising => $pin.select_rising_edge_trigger(),
            Trigger::Falling => $pin.select_falling_edge_trigger(),
        }
    };
}

/// Port 1 configured for the device
pub struct Port1Board<BP, CP, IP, EP, LP> {
    pins: Port1Pins<BP, CP, IP, EP, LP>,
    pxiv: PxIV<P1>,
    button_polarity: Polarity,
}

impl<BP: Pull, CP: Pull, IP: Pull, EP: Pull, LP: Pull> Port1Board<BP, CP, IP, EP, LP> {
    /// Take over the split Port 1 pins. Edge interrupts stay off until
    /// [`enable_edges`](Port1Board::enable_edges).
    pub fn new(
        pins: Port1Pins<BP, CP, IP, EP, LP>,
        pxiv: PxIV<P1>,
        polarity: &InputPolarity,
    ) -> Self {
        debug_assert!(BP::IDLE_HIGH == polarity.button.idle_high());
        debug_assert!(CP::IDLE_HIGH == polarity.charger_present.idle_high());
        debug_assert!(IP::IDLE_HIGH == polarity.charging.idle_high());
        debug_assert!(EP::IDLE_HIGH == polarity.charge_complete.idle_high());
        debug_assert!(LP::IDLE_HIGH == polarity.battery_low.idle_high());

        Port1Board {
            pins,
            pxiv,
            button_polarity: polarity.button,
        }
    }

    /// Arm the button and charger edge interrupts. The button interrupts on the press edge, the
    /// charger on whichever edge changes the line from its current level.
    ///
    /// Call with interrupts disabled; flags raised by the edge select changes are discarded.
    pub fn enable_edges(&mut self) {
        let button = select_edge!(self.pins.button, Trigger::on_assert(self.button_polarity));
        button.enable_interrupts();
        self.follow_charger_level();
        self.pins.charger_present.enable_interrupts();

        while !matches!(self.pxiv.get_interrupt_vector(), GpioVector::NoIsr) {}
    }

    fn follow_charger_level(&mut self) {
        if let Ok(high) = self.pins.charger_present.is_high() {
            select_edge!(self.pins.charger_present, Trigger::leaving(high));
        }
    }

    /// Take the highest priority pending edge, clearing its flag. The charger edge select is
    /// re-aimed at the level the line has now, so both attach and removal are seen.
    pub fn pending_edge(&mut self) -> nb::Result<EdgeSource, Infallible> {
        loop {
            match self.pxiv.get_interrupt_vector() {
                GpioVector::NoIsr => return Err(nb::Error::WouldBlock),
                GpioVector::Pin6Isr => return Ok(EdgeSource::Button),
                GpioVector::Pin2Isr => {
                    self.follow_charger_level();
                    return Ok(EdgeSource::Charger);
                }
                _ => debug!("stray P1 edge"),
            }
        }
    }
}

impl<BP, CP, IP, EP, LP> SignalIo for Port1Board<BP, CP, IP, EP, LP>
where
    Port1Pins<BP, CP, IP, EP, LP>: SignalIo<Error = Infallible>,
{
    type Error = Infallible;

    #[inline]
    fn sample(&mut self) -> Result<RawLevels, Infallible> {
        self.pins.sample()
    }

    #[inline]
    fn drive(&mut self, outputs: Outputs) -> Result<(), Infallible> {
        self.pins.drive(outputs)
    }
}
