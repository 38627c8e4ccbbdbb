use std::f64::consts::PI;

use serde::Deserialize;

use crate::driver::{Gearset, Motor};
use crate::vector::{normalize_degrees, shortest_angular_error};

/// Gear teeth, input to output: 16, 35.
pub const STEERING_GEAR_RATIO: f64 = 16.0 / 35.0;

/// Gear teeth, input to output: 21, 10, 12, 30.
pub const DRIVE_GEAR_RATIO: f64 = (21.0 / 10.0) * (12.0 / 30.0);

/// Module-frame degrees the steering may be off target while still counting
/// as arrived.
const DIRECTION_TOLERANCE_DEG: f64 = 1.0;

/// Gearing and wheel geometry of one module. The defaults match the chassis
/// this was built for.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    pub steering_gearset: Gearset,
    pub drive_gearset: Gearset,
    /// Steering-motor to module rotation ratio.
    pub steering_ratio: f64,
    /// Drive-motor to wheel rotation ratio.
    pub drive_ratio: f64,
    /// Drive-motor rpm induced per steering-motor rpm through the shared
    /// chassis gearing.
    pub coupling_ratio: f64,
    /// Wheel diameter in inches.
    pub wheel_diameter: f64,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            steering_gearset: Gearset::Green,
            drive_gearset: Gearset::Blue,
            steering_ratio: STEERING_GEAR_RATIO,
            drive_ratio: DRIVE_GEAR_RATIO,
            coupling_ratio: DRIVE_GEAR_RATIO,
            wheel_diameter: 2.75,
        }
    }
}

/// One swerve unit: a steering motor and a drive motor geared together
/// through the chassis.
pub struct SwerveModule {
    steering: Box<dyn Motor>,
    drive: Box<dyn Motor>,
    config: ModuleConfig,
    /// Last commanded module angle, [0, 360).
    angle: f64,
    /// Steering target in motor degrees. Accumulates shortest-path deltas so
    /// the motor never unwinds the long way around.
    steering_target: f64,
}

impl SwerveModule {
    pub fn new(steering: Box<dyn Motor>, drive: Box<dyn Motor>, config: ModuleConfig) -> Self {
        Self {
            steering,
            drive,
            config,
            angle: 0.0,
            steering_target: 0.0,
        }
    }

    /// Command the module's direction and wheel speed together. When the
    /// shortest steering path exceeds 90 degrees the module steers to the
    /// opposite angle and drives backwards instead, which is mechanically
    /// equivalent and a smaller move.
    pub fn set(&mut self, direction_deg: f64, speed_pct: f64) {
        let mut target = normalize_degrees(direction_deg);
        let mut speed = speed_pct;
        if shortest_angular_error(self.angle, target).abs() > 90.0 {
            target = normalize_degrees(target + 180.0);
            speed = -speed;
        }
        self.set_direction(target);
        self.set_speed(speed);
    }

    /// Command the steering motor toward `direction_deg` along the shortest
    /// path and report whether it has arrived. Non-blocking; poll once per
    /// tick until it returns true.
    pub fn set_direction(&mut self, direction_deg: f64) -> bool {
        let target = normalize_degrees(direction_deg);
        let delta = shortest_angular_error(self.angle, target);
        self.steering_target += delta / self.config.steering_ratio;
        self.angle = target;
        self.steering.set_position(self.steering_target);

        let remaining = (self.steering_target - self.steering.position()) * self.config.steering_ratio;
        remaining.abs() <= DIRECTION_TOLERANCE_DEG
    }

    /// Command the wheel speed as a fraction of the drive motor's rated rpm.
    /// The steering motor back-drives the wheel through the shared gearing,
    /// so the induced rate is compensated on every call, including at zero
    /// requested speed.
    pub fn set_speed(&mut self, percent: f64) {
        let requested = percent * self.config.drive_gearset.max_rpm();
        let compensation = self.steering.velocity() * self.config.coupling_ratio;
        self.drive.set_velocity(requested + compensation);
    }

    /// Cumulative distance driven in inches, from the drive motor's encoder.
    pub fn distance_driven(&self) -> f64 {
        self.drive.position() / 360.0 * self.config.drive_ratio * self.config.wheel_diameter * PI
    }
}
