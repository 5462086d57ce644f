#![no_main]
#![no_std]
#![feature(abi_msp430_interrupt)]
#![feature(asm_experimental_arch)]

// Needs the wake_cpu feature of msp430-rt (Rust 1.88+) so that the idle loop runs again after
// every interrupt and can pick the next low power mode.

use core::cell::RefCell;

use critical_section::{with, Mutex};
use msp430_rt::entry;
use msp430fr2355::{interrupt, P2, P3, P4, P5, P6};
use msp430fr2x5x_hal::{
    clock::{Clock, ClockConfig, DcoclkFreqSel, MclkDiv, SmclkDiv},
    fram::Fram,
    gpio::{Batch, Pulldown, Pullup},
    pmm::Pmm,
    watchdog::Wdt,
};
use msp430_vibe::{
    board::Port1Board, config::tick_period, lpm, power::LowPowerMode, signals::PinSignals,
    ticker::Ticker, Vibe, VibeConfig,
};
use panic_msp430 as _;

const CONFIG: VibeConfig = VibeConfig::DEFAULT;
const PWM_CYCLE_HZ: u32 = 100;

// Tick budget at 16 MHz and a 100 Hz PWM cycle: 625 MCLK cycles per tick. Out of these the timer
// handler (two nested critical sections, five pin reads, three pin writes and the state update)
// and the idle loop pass that wake_cpu forces after it have to fit, with room left for a PORT1
// interrupt landing in the same period.

// Button pulled down, every status line pulled up, as the default polarity needs
type Board = Port1Board<Pulldown, Pullup, Pullup, Pullup, Pullup>;

static VIBE: Vibe = Vibe::new(CONFIG);
static BOARD: Mutex<RefCell<Option<Board>>> = Mutex::new(RefCell::new(None));
static TICKER: Mutex<RefCell<Option<Ticker>>> = Mutex::new(RefCell::new(None));

macro_rules! init_port_as_pulldowns {
    ($port: expr) => {
        Batch::new($port)
            .config_pin0(|p| p.pulldown())
            .config_pin1(|p| p.pulldown())
            .config_pin2(|p| p.pulldown())
            .config_pin3(|p| p.pulldown())
            .config_pin4(|p| p.pulldown())
            .config_pin5(|p| p.pulldown())
            .config_pin6(|p| p.pulldown())
            .config_pin7(|p| p.pulldown())
    };
}

#[entry]
fn main() -> ! {
    let periph = msp430fr2355::Peripherals::take().unwrap();

    let mut fram = Fram::new(periph.FRCTL);
    let _wdt = Wdt::constrain(periph.WDT_A);
    let pmm = Pmm::new(periph.PMM);

    // freeze() sets the FRAM wait state 16 MHz needs
    let (smclk, _aclk, _delay) = ClockConfig::new(periph.CS)
        .mclk_dcoclk(DcoclkFreqSel::_16MHz, MclkDiv::_1)
        .smclk_on(SmclkDiv::_1)
        .aclk_vloclk()
        .freeze(&mut fram);

    let p1 = Batch::new(periph.P1)
        .config_pin0(|p| p.pullup())
        .config_pin1(|p| p.to_output())
        .config_pin2(|p| p.pullup())
        .config_pin3(|p| p.pullup())
        .config_pin4(|p| p.to_output())
        .config_pin5(|p| p.to_output())
        .config_pin6(|p| p.pulldown())
        .config_pin7(|p| p.pullup())
        .split(&pmm);
    let pins = PinSignals {
        button: p1.pin6,
        charger_present: p1.pin2,
        charging: p1.pin0,
        charge_complete: p1.pin7,
        battery_low: p1.pin3,
        motor: p1.pin1,
        white_led: p1.pin5,
        red_led: p1.pin4,
    };
    let mut board: Board = Port1Board::new(pins, p1.pxiv, &CONFIG.polarity);

    init_unused_gpio(periph.P2, periph.P3, periph.P5, periph.P6, &pmm);
    #[cfg(feature = "defmt")]
    log::init(periph.E_USCI_A1, periph.P4, &smclk, &pmm);
    #[cfg(not(feature = "defmt"))]
    park_port4(periph.P4, &pmm);

    board.enable_edges();
    with(|cs| BOARD.borrow_ref_mut(cs).replace(board));

    let ticker = Ticker::start(periph.TB0, &smclk, tick_period(smclk.freq(), PWM_CYCLE_HZ));
    with(|cs| TICKER.borrow_ref_mut(cs).replace(ticker));

    loop {
        // Interrupts stay off from reading the power state until lpm::enter sets GIE, so an edge
        // arriving in between still wakes the CPU.
        msp430::interrupt::disable();
        let mode = VIBE.power_state().low_power_mode();
        with(|cs| {
            let Some(ref mut ticker) = *TICKER.borrow_ref_mut(cs) else { return };
            if mode == LowPowerMode::Lpm4 {
                ticker.pause();
            } else {
                ticker.resume();
            }
        });
        lpm::enter(mode);
    }
}

/// Enable pulldowns on unused ports to massively reduce power usage.
fn init_unused_gpio(p2: P2, p3: P3, p5: P5, p6: P6, pmm: &Pmm) {
    init_port_as_pulldowns!(p2).split(pmm);
    init_port_as_pulldowns!(p3).split(pmm);
    init_port_as_pulldowns!(p5).split(pmm);
    init_port_as_pulldowns!(p6).split(pmm);
}

#[cfg(not(feature = "defmt"))]
fn park_port4(p4: P4, pmm: &Pmm) {
    init_port_as_pulldowns!(p4).split(pmm);
}

#[cfg(feature = "defmt")]
mod log {
    use msp430fr2355::{E_USCI_A1, P4};
    use msp430fr2x5x_hal::{clock::Smclk, gpio::Batch, pmm::Pmm, serial::*};
    use static_cell::StaticCell;

    static TX: StaticCell<Tx<E_USCI_A1>> = StaticCell::new();

    /// Send defmt frames out of P4.3
    pub fn init(usci: E_USCI_A1, p4: P4, smclk: &Smclk, pmm: &Pmm) {
        let p4 = Batch::new(p4).split(pmm);
        let (tx, _rx) = SerialConfig::new(
            usci,
            BitOrder::LsbFirst,
            BitCount::EightBits,
            StopBits::OneStopBit,
            Parity::NoParity,
            Loopback::NoLoop,
            115200,
        )
        .use_smclk(smclk)
        .split(p4.pin3.to_alternate1(), p4.pin2.to_alternate1());
        defmt_serial::defmt_serial(TX.init(tx));
    }
}

#[interrupt(wake_cpu)]
fn TIMER0_B1() {
    with(|cs| {
        let Some(ref mut ticker) = *TICKER.borrow_ref_mut(cs) else { return };
        if !ticker.acknowledge() {
            return;
        }
        let Some(ref mut board) = *BOARD.borrow_ref_mut(cs) else { return };
        VIBE.tick(board).ok();
    });
}

#[interrupt(wake_cpu)]
fn PORT1() {
    with(|cs| {
        let Some(ref mut board) = *BOARD.borrow_ref_mut(cs) else { return };
        while let Ok(source) = board.pending_edge() {
            VIBE.edge(source, board).ok();
        }
    });
}

// The compiler will emit calls to the abort() compiler intrinsic if debug assertions are
// enabled (default for dev profile). MSP430 does not actually have meaningful abort() support
// so for now, we create our own in each application where debug assertions are present.
#[no_mangle]
extern "C" fn abort() -> ! {
    panic!();
}
