//! Control core for a battery-powered vibration device ("vibe") built around an MSP430.
//!
//! The device drives a motor and two indicator LEDs with software PWM from a single periodic
//! timer interrupt, cycles through motor programs on button presses, and powers itself down into
//! deep sleep whenever there is nothing to show. A button press or a charger being plugged in or
//! removed wakes it back up.
//!
//! The crate is split in two halves:
//!
//! * A platform-independent core ([`pwm`], [`motor`], [`debounce`], [`indicator`], [`power`],
//!   [`signals`] and the two handlers in [`tick`] and [`edge`]), gathered behind the shared state
//!   in [`state`]. It builds for any target and is what the host test suite exercises.
//! * MSP430FR2355 support behind the `msp430fr2355` feature: the Port 1 signal adapter, the tick
//!   timer and low power mode entry, built on `msp430fr2x5x-hal`, which the `firmware/` binary
//!   wires to the interrupt vectors.
//!
//! # Usage
//!
//! ```ignore
//! static VIBE: Vibe = Vibe::new(VibeConfig::DEFAULT);
//!
//! // Timer interrupt, once per PWM step
//! VIBE.tick(&mut board).ok();
//!
//! // Pin interrupt, once per pending edge
//! VIBE.edge(source, &mut board).ok();
//! ```
//!
//! Requires `msp430-elf-gcc` installed and in $PATH to build the device half.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "msp430fr2355", feature(asm_experimental_arch))]
#![deny(missing_docs)]

#[macro_use]
mod fmt;

pub mod config;
pub mod debounce;
pub mod edge;
pub mod indicator;
pub mod motor;
pub mod power;
pub mod pwm;
pub mod signals;
pub mod state;
pub mod tick;

#[cfg(feature = "msp430fr2355")]
pub mod board;
#[cfg(feature = "msp430fr2355")]
pub mod lpm;
#[cfg(feature = "msp430fr2355")]
pub mod ticker;

#[cfg(feature = "msp430fr2355")]
pub use msp430fr2355 as pac;

pub use config::VibeConfig;
pub use state::{DeviceState, Event, Vibe};
