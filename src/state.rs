//! Shared device state.
//!
//! On the MSP430 the tick and edge handlers are two interrupt vectors at the same priority, so they
//! never preempt each other and each one sees the state exactly as the previous one left it.
//! [`Vibe`] makes that guarantee explicit instead of relying on it: the whole [`DeviceState`] sits
//! in a [`critical_section::Mutex`], and each handler runs start to finish inside one critical
//! section. On a single-core MSP430 that costs no more than the interrupt entry already does.
//!
//! [`DeviceState::handle`] is the same two handlers seen as an event loop. The idle loop blocks
//! until the next [`Event`], dispatches it, and goes back to waiting; "suspending" is just the
//! loop choosing a deeper low power mode while [`PowerState::Sleeping`].

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::VibeConfig;
use crate::debounce::Debounce;
use crate::indicator::Indicators;
use crate::motor::{Motor, Program, SpeedIndex};
use crate::power::{Power, PowerState};
use crate::pwm::StepCounter;
use crate::signals::{EdgeSource, Inputs, Outputs, SignalIo};

/// Something the device reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Periodic timer tick, one PWM step
    Tick,
    /// Pin edge
    Edge(EdgeSource),
}

/// Every field both handlers read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub(crate) config: VibeConfig,
    pub(crate) step: StepCounter,
    pub(crate) speed: SpeedIndex,
    pub(crate) motor: Motor,
    pub(crate) indicators: Indicators,
    pub(crate) debounce: Debounce,
    pub(crate) power: Power,
}

impl DeviceState {
    /// Power-on state: active, motor off, LEDs dark
    pub const fn new(config: VibeConfig) -> Self {
        DeviceState {
            step: StepCounter::new(),
            speed: SpeedIndex::OFF,
            motor: Motor::new(),
            indicators: Indicators::new(&config),
            debounce: Debounce::new(&config),
            power: Power::new(),
            config,
        }
    }

    /// Configuration the state was built with
    #[inline(always)]
    pub fn config(&self) -> &VibeConfig {
        &self.config
    }

    /// Current PWM step
    #[inline(always)]
    pub fn step(&self) -> u8 {
        self.step.step()
    }

    /// Selected speed table entry
    #[inline(always)]
    pub fn speed(&self) -> SpeedIndex {
        self.speed
    }

    /// Motor channel and mode
    #[inline(always)]
    pub fn motor(&self) -> &Motor {
        &self.motor
    }

    /// LED channels
    #[inline(always)]
    pub fn indicators(&self) -> &Indicators {
        &self.indicators
    }

    /// Debounce countdowns
    #[inline(always)]
    pub fn debounce(&self) -> &Debounce {
        &self.debounce
    }

    /// Power bookkeeping
    #[inline(always)]
    pub fn power(&self) -> &Power {
        &self.power
    }

    /// Active or sleeping
    #[inline(always)]
    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    /// Dispatch one event. Returns the outputs to drive for a tick, `None` for an edge.
    pub fn handle(&mut self, event: Event, inputs: &Inputs) -> Option<Outputs> {
        match event {
            Event::Tick => Some(self.on_tick(inputs)),
            Event::Edge(source) => {
                self.on_edge(source, inputs);
                None
            }
        }
    }

    /// Select a speed table entry and start its program
    pub(crate) fn select(&mut self, index: SpeedIndex) {
        let (index, program) = match self.config.speeds.get(index) {
            Some(program) => (index, program),
            None => {
                debug_assert!(false, "speed index past end of table");
                (SpeedIndex::OFF, Program::Off)
            }
        };
        if index != self.speed {
            debug!("speed {=u8} -> {=u8}", self.speed.get(), index.get());
        }
        self.speed = index;
        self.motor.apply(program, &self.config);
    }

    /// Forget everything transient after a deep sleep
    pub(crate) fn wake(&mut self) {
        self.speed = SpeedIndex::OFF;
        self.motor.stop();
        self.step.reset();
        self.indicators.reset(&self.config);
        self.debounce.clear(&self.config);
    }
}

/// [`DeviceState`] behind a critical section mutex, for use from interrupt handlers
pub struct Vibe {
    state: Mutex<RefCell<DeviceState>>,
}

impl Vibe {
    /// Wrap a fresh device state. `const`, so it can initialise a `static`.
    pub const fn new(config: VibeConfig) -> Self {
        Vibe {
            state: Mutex::new(RefCell::new(DeviceState::new(config))),
        }
    }

    /// Run the tick handler: sample the inputs, advance the state and drive the outputs. Returns
    /// the power state the tick left the device in.
    pub fn tick<IO: SignalIo>(&self, io: &mut IO) -> Result<PowerState, IO::Error> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let inputs = io.sample()?.resolve(&state.config.polarity);
            let outputs = state.on_tick(&inputs);
            io.drive(outputs)?;
            Ok(state.power_state())
        })
    }

    /// Run the edge handler for `source`. The caller has already cleared the edge flag.
    pub fn edge<IO: SignalIo>(&self, source: EdgeSource, io: &mut IO) -> Result<(), IO::Error> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let inputs = io.sample()?.resolve(&state.config.polarity);
            state.on_edge(source, &inputs);
            Ok(())
        })
    }

    /// Current power state
    pub fn power_state(&self) -> PowerState {
        critical_section::with(|cs| self.state.borrow_ref(cs).power_state())
    }

    /// Look at the state without changing it
    pub fn inspect<R>(&self, f: impl FnOnce(&DeviceState) -> R) -> R {
        critical_section::with(|cs| f(&self.state.borrow_ref(cs)))
    }
}
