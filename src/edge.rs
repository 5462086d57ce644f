//! Pin edge handler.
//!
//! The first edge after a deep sleep resynchronises the transient state before anything else
//! happens. A button edge outside the lockout window moves to the next program, unless the motor
//! is locked out by the charger or a latched low battery. A charger edge, attach or removal,
//! always stops the motor.

use crate::motor::SpeedIndex;
use crate::signals::{EdgeSource, Inputs};
use crate::state::DeviceState;

impl DeviceState {
    /// Handle one pin edge
    pub fn on_edge(&mut self, source: EdgeSource, inputs: &Inputs) {
        if self.power.take_powerup() {
            info!("woken by {}", source);
            self.wake();
        }
        self.power.resume();

        match source {
            EdgeSource::Button => {
                if !self.debounce.is_settled() {
                    return;
                }
                if self.motor_locked(inputs) {
                    debug!("press ignored, motor locked");
                } else {
                    let next = self.speed.next(self.config.speeds.len());
                    self.select(next);
                }
                self.debounce.arm(&self.config);
            }
            EdgeSource::Charger => {
                info!("charger edge, present: {}", inputs.charger_present);
                self.select(SpeedIndex::OFF);
            }
        }
    }

    fn motor_locked(&self, inputs: &Inputs) -> bool {
        inputs.charger_present || self.power.low_battery_latched()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::VibeConfig;
    use crate::motor::{MotorMode, SpeedIndex};
    use crate::power::PowerState;
    use crate::signals::{EdgeSource, Inputs};
    use crate::state::DeviceState;

    const CONFIG: VibeConfig = VibeConfig {
        lockout_ticks: 4,
        ..VibeConfig::DEFAULT
    };

    fn asleep() -> DeviceState {
        let mut state = DeviceState::new(CONFIG);
        state.on_tick(&Inputs::default());
        assert_eq!(state.power_state(), PowerState::Sleeping);
        state
    }

    #[test]
    fn press_wakes_and_selects_first_program() {
        let mut state = asleep();
        state.on_edge(EdgeSource::Button, &Inputs::default());
        assert_eq!(state.power_state(), PowerState::Active);
        assert!(!state.power().powerup_pending());
        assert_eq!(state.speed(), SpeedIndex::new(1));
        assert_eq!(state.motor().duty(), 16);
        assert_eq!(state.debounce().lockout(), 4);
    }

    #[test]
    fn press_inside_lockout_is_ignored() {
        let mut state = DeviceState::new(CONFIG);
        state.on_edge(EdgeSource::Button, &Inputs::default());
        state.on_edge(EdgeSource::Button, &Inputs::default());
        assert_eq!(state.speed(), SpeedIndex::new(1));
    }

    #[test]
    fn presses_cycle_through_table() {
        let mut state = DeviceState::new(CONFIG);
        let mut seen = [(0u8, 0u8); 8];
        for entry in seen.iter_mut() {
            state.on_edge(EdgeSource::Button, &Inputs::default());
            *entry = (state.speed().get(), state.motor().duty());
            state.debounce.clear(&CONFIG);
        }
        let indices = seen.map(|(index, _)| index);
        assert_eq!(indices, [1, 2, 3, 4, 5, 6, 0, 1]);
        // Back at the first program with its preset duty, and off means zero duty
        assert_eq!(seen[7], seen[0]);
        assert_eq!(seen[0].1, 16);
        assert_eq!(seen[6].1, 0);
        assert_eq!(state.motor().mode(), MotorMode::Steady);
    }

    #[test]
    fn wave_program_starts_rising() {
        let mut state = DeviceState::new(CONFIG);
        state.speed = SpeedIndex::new(5);
        state.on_edge(EdgeSource::Button, &Inputs::default());
        assert_eq!(state.motor().mode(), MotorMode::WaveUp);
        assert_eq!(state.motor().duty(), CONFIG.wave_low);
    }

    #[test]
    fn charger_edge_stops_motor() {
        let mut state = DeviceState::new(CONFIG);
        state.select(SpeedIndex::new(3));
        state.on_edge(
            EdgeSource::Charger,
            &Inputs {
                charger_present: true,
                ..Inputs::default()
            },
        );
        assert!(state.speed().is_off());
        assert!(state.motor().is_idle());
    }

    #[test]
    fn press_on_charger_only_arms_lockout() {
        let mut state = DeviceState::new(CONFIG);
        let charging = Inputs {
            charger_present: true,
            ..Inputs::default()
        };
        state.on_edge(EdgeSource::Button, &charging);
        assert!(state.speed().is_off());
        assert!(!state.debounce().is_settled());
    }

    #[test]
    fn wake_clears_low_battery_latch() {
        let mut state = DeviceState::new(CONFIG);
        let low = Inputs {
            battery_low: true,
            ..Inputs::default()
        };
        state.on_tick(&low);
        assert!(state.power().low_battery_latched());
        state.on_edge(EdgeSource::Button, &Inputs::default());
        assert!(state.speed().is_off());

        let mut state = asleep();
        state.power.latch_low_battery(&CONFIG);
        state.on_edge(EdgeSource::Button, &Inputs::default());
        assert!(!state.power().low_battery_latched());
        assert_eq!(state.speed(), SpeedIndex::new(1));
    }

    #[test]
    fn wake_drops_stale_lockout() {
        let mut state = asleep();
        state.debounce.arm(&CONFIG);
        state.on_edge(EdgeSource::Button, &Inputs::default());
        assert_eq!(state.speed(), SpeedIndex::new(1));
    }
}
