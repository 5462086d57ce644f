//! Periodic tick handler.
//!
//! Runs once per PWM step. At every cycle boundary the motor program, the LED pulse and the low
//! battery warning move one step. Every tick the charger lines are re-read and enforced before the
//! output bits for the step are rendered. The button debounce counters run last, so a long press
//! shows on the outputs from the next step on. A tick that finds nothing left to do turns
//! everything off and puts the device to sleep.

use crate::debounce::LongPress;
use crate::indicator::ChargeStatus;
use crate::motor::SpeedIndex;
use crate::power::PowerState;
use crate::pwm;
use crate::signals::{Inputs, Outputs};
use crate::state::DeviceState;

impl DeviceState {
    /// Handle one timer tick. Returns the output levels for this step. A tick that arrives while
    /// sleeping changes nothing and drives everything low.
    pub fn on_tick(&mut self, inputs: &Inputs) -> Outputs {
        if self.power.state() == PowerState::Sleeping {
            return Outputs::empty();
        }

        if self.step.advance() {
            self.motor.advance_cycle(&self.config);
            self.indicators.advance_cycle(&self.config);
            self.power.advance_cycle();
        }

        self.enforce_power_limits(inputs);
        self.indicators.update(
            ChargeStatus::from_inputs(inputs),
            self.power.warning_active(),
            &self.config,
        );
        let outputs = pwm::render(
            self.step.step(),
            self.motor.channel(),
            self.indicators.white(),
            self.indicators.red(),
        );

        if let Some(LongPress) = self.debounce.tick(inputs.button_pressed, &self.config) {
            info!("long press, motor off");
            self.select(SpeedIndex::OFF);
        }

        if self.can_sleep(inputs) {
            info!("nothing to do, sleeping");
            self.power.enter_sleep();
            return Outputs::empty();
        }
        outputs
    }

    // The motor never runs on a charger or on a latched low battery
    fn enforce_power_limits(&mut self, inputs: &Inputs) {
        let locked = if inputs.charger_present {
            true
        } else if inputs.battery_low && self.power.latch_low_battery(&self.config) {
            warn!("low battery, motor off");
            true
        } else {
            self.power.low_battery_latched()
        };
        if locked && !(self.speed.is_off() && self.motor.is_idle()) {
            self.select(SpeedIndex::OFF);
        }
    }

    fn can_sleep(&self, inputs: &Inputs) -> bool {
        !inputs.charger_present
            && self.debounce.is_settled()
            && self.motor.is_idle()
            && self.indicators.is_dark()
    }
}
