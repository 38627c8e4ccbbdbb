use serde::Deserialize;
use std::time::Duration;

use crate::TICK_PERIOD;

/// Gains and settling policy for a [`Pid`]. Unset fields deserialize to 0,
/// which disables the corresponding term.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    /// Error magnitude under which the loop is considered at its target and
    /// the output is dropped to zero.
    pub deadband: f64,
    /// Seconds the error must stay inside the deadband before
    /// [`Pid::is_on_target`] reports true.
    pub on_target_time: f64,
}

/// Closed-loop controller ticked at a fixed period. Feed it one measurement
/// per control-loop tick with [`Pid::update`].
#[derive(Debug)]
pub struct Pid {
    config: PidConfig,
    target: f64,
    lower_limit: f64,
    upper_limit: f64,
    accumulated_error: f64,
    last_error: Option<f64>,
    output: f64,
    settled_for: f64,
    period: f64,
}

impl Pid {
    pub fn new(config: PidConfig) -> Self {
        Self::with_period(config, TICK_PERIOD)
    }

    pub fn with_period(config: PidConfig, period: Duration) -> Self {
        Self {
            config,
            target: 0.0,
            lower_limit: f64::NEG_INFINITY,
            upper_limit: f64::INFINITY,
            accumulated_error: 0.0,
            last_error: None,
            output: 0.0,
            settled_for: 0.0,
            period: period.as_secs_f64(),
        }
    }

    /// Clears the integral accumulator, derivative history and settle timer.
    /// Target, gains and limits are kept.
    pub fn reset(&mut self) {
        self.accumulated_error = 0.0;
        self.last_error = None;
        self.output = 0.0;
        self.settled_for = 0.0;
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn set_limits(&mut self, lower: f64, upper: f64) {
        self.lower_limit = lower.min(upper);
        self.upper_limit = lower.max(upper);
    }

    /// Advances the loop by one tick and returns the new output.
    pub fn update(&mut self, measurement: f64) -> f64 {
        let error = self.target - measurement;

        self.accumulated_error += error * self.period;
        if self.config.i != 0.0 {
            // keep the integral term alone within the output limits
            let windup_limit =
                self.lower_limit.abs().max(self.upper_limit.abs()) / self.config.i.abs();
            self.accumulated_error = self.accumulated_error.clamp(-windup_limit, windup_limit);
        }

        let derivative = match self.last_error {
            Some(previous) => (error - previous) / self.period,
            None => 0.0,
        };
        self.last_error = Some(error);

        let raw = self.config.p * error
            + self.config.i * self.accumulated_error
            + self.config.d * derivative;
        self.output = raw.clamp(self.lower_limit, self.upper_limit);

        if error.abs() <= self.config.deadband {
            self.settled_for += self.period;
            self.output = 0.0;
        } else {
            self.settled_for = 0.0;
        }

        self.output
    }

    /// The output computed by the most recent [`Pid::update`].
    pub fn get(&self) -> f64 {
        self.output
    }

    /// True once the error has stayed inside the deadband for the configured
    /// settle time.
    pub fn is_on_target(&self) -> bool {
        match self.last_error {
            Some(error) => {
                error.abs() <= self.config.deadband && self.settled_for >= self.config.on_target_time
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn drive_config() -> PidConfig {
        PidConfig {
            p: 0.035,
            i: 0.001,
            d: 0.003,
            deadband: 0.5,
            on_target_time: 0.3,
        }
    }

    #[test]
    fn proportional_output_from_standstill() {
        let mut pid = Pid::new(drive_config());
        pid.set_target(24.0);
        let output = pid.update(0.0);
        // p * 24 plus one tick of integral, no clamping installed
        assert_relative_eq!(output, 0.035 * 24.0 + 0.001 * 24.0 * 0.02, max_relative = 1e-9);
    }

    #[test]
    fn output_clamps_to_limits() {
        let mut pid = Pid::new(drive_config());
        pid.set_target(24.0);
        pid.set_limits(-0.5, 0.5);
        assert_relative_eq!(pid.update(0.0), 0.5);
        assert_relative_eq!(pid.update(48.0), -0.5);
    }

    #[test]
    fn reversed_limits_are_normalized() {
        let mut pid = Pid::new(drive_config());
        pid.set_target(24.0);
        pid.set_limits(0.5, -0.5);
        assert_relative_eq!(pid.update(0.0), 0.5);
    }

    #[test]
    fn on_target_requires_continuous_settling() {
        let mut pid = Pid::new(drive_config());
        pid.set_target(24.0);
        pid.set_limits(-0.5, 0.5);
        assert!(!pid.is_on_target());

        // 0.3s at a 20ms tick is 15 updates inside the deadband
        for _ in 0..14 {
            pid.update(23.8);
            assert!(!pid.is_on_target());
        }
        pid.update(23.8);
        assert!(pid.is_on_target());
    }

    #[test]
    fn leaving_the_deadband_resets_the_settle_timer() {
        let mut pid = Pid::new(drive_config());
        pid.set_target(24.0);
        for _ in 0..10 {
            pid.update(23.8);
        }
        pid.update(10.0);
        for _ in 0..14 {
            pid.update(23.8);
            assert!(!pid.is_on_target());
        }
        pid.update(23.8);
        assert!(pid.is_on_target());
    }

    #[test]
    fn output_is_zeroed_inside_the_deadband() {
        let mut pid = Pid::new(drive_config());
        pid.set_target(24.0);
        pid.update(23.9);
        assert_relative_eq!(pid.get(), 0.0);
    }

    #[test]
    fn integral_does_not_wind_up_while_saturated() {
        let config = PidConfig {
            i: 1.0,
            ..PidConfig::default()
        };
        let mut pid = Pid::new(config);
        pid.set_target(10.0);
        pid.set_limits(-1.0, 1.0);
        for _ in 0..1000 {
            pid.update(0.0);
        }
        assert_relative_eq!(pid.get(), 1.0);
        // a single reversal must pull the output off the rail immediately
        let output = pid.update(20.0);
        assert!(output < 1.0);
    }

    #[test]
    fn reset_keeps_target_and_limits() {
        let mut pid = Pid::new(drive_config());
        pid.set_target(24.0);
        pid.set_limits(-0.5, 0.5);
        for _ in 0..20 {
            pid.update(23.8);
        }
        assert!(pid.is_on_target());

        pid.reset();
        assert!(!pid.is_on_target());
        assert_relative_eq!(pid.get(), 0.0);
        // target survives the reset
        assert_relative_eq!(pid.update(0.0), 0.5);
    }
}
