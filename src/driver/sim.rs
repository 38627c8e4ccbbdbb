//! Simulated actuators and sensors. Used by the unit tests and by the demo
//! binary, which has no real drivetrain to talk to.

use std::f64::consts::PI;
use std::sync::{Arc, Mutex};

use super::{HeadingSensor, Motor};
use crate::swerve_module::ModuleConfig;
use crate::vector::normalize_degrees;

const DEG_PER_REV: f64 = 360.0;
const IMU_CALIBRATION_TIME: f64 = 0.5;

/// Distance from the chassis center to each module, in inches.
const CHASSIS_RADIUS_IN: f64 = 7.8;

/// Module order used by [`SimRig`]: left-front, right-front, left-rear,
/// right-rear. These are the wheel directions that produce pure positive
/// rotation.
const TANGENTIAL_DEG: [f64; 4] = [45.0, 135.0, 315.0, 225.0];

#[derive(Debug, Clone, Copy, PartialEq)]
enum MotorCommand {
    Idle,
    Position(f64),
    Velocity(f64),
}

#[derive(Debug)]
struct MotorState {
    position: f64,
    velocity: f64,
    command: MotorCommand,
}

/// Motor that integrates its commands when stepped. Clones share state, so
/// a test can hand one clone to a module and observe commands on another.
#[derive(Debug, Clone)]
pub struct SimMotor {
    max_rpm: f64,
    state: Arc<Mutex<MotorState>>,
}

impl SimMotor {
    pub fn new(max_rpm: f64) -> Self {
        Self {
            max_rpm,
            state: Arc::new(Mutex::new(MotorState {
                position: 0.0,
                velocity: 0.0,
                command: MotorCommand::Idle,
            })),
        }
    }

    /// Advance the motor by `dt` seconds. Position commands slew toward the
    /// target at the rated speed, velocity commands integrate directly.
    pub fn step(&self, dt: f64) {
        let mut state = self.state.lock().unwrap();
        match state.command {
            MotorCommand::Idle => {
                state.velocity = 0.0;
            }
            MotorCommand::Position(target) => {
                let max_travel = self.max_rpm / 60.0 * DEG_PER_REV * dt;
                let travel = (target - state.position).clamp(-max_travel, max_travel);
                state.position += travel;
                state.velocity = travel / dt / DEG_PER_REV * 60.0;
            }
            MotorCommand::Velocity(rpm) => {
                let rpm = rpm.clamp(-self.max_rpm, self.max_rpm);
                state.velocity = rpm;
                state.position += rpm / 60.0 * DEG_PER_REV * dt;
            }
        }
    }

    pub fn commanded_position(&self) -> Option<f64> {
        match self.state.lock().unwrap().command {
            MotorCommand::Position(target) => Some(target),
            _ => None,
        }
    }

    pub fn commanded_velocity(&self) -> Option<f64> {
        match self.state.lock().unwrap().command {
            MotorCommand::Velocity(rpm) => Some(rpm),
            _ => None,
        }
    }
}

impl Motor for SimMotor {
    fn set_position(&mut self, degrees: f64) {
        self.state.lock().unwrap().command = MotorCommand::Position(degrees);
    }

    fn set_velocity(&mut self, rpm: f64) {
        self.state.lock().unwrap().command = MotorCommand::Velocity(rpm);
    }

    fn position(&self) -> f64 {
        self.state.lock().unwrap().position
    }

    fn velocity(&self) -> f64 {
        self.state.lock().unwrap().velocity
    }
}

#[derive(Debug)]
struct HeadingState {
    heading: f64,
    calibration_remaining: f64,
}

/// Orientation sensor with an externally settable heading. Reports
/// calibration-in-progress for a short time after construction, like the
/// real sensor does after power-on.
#[derive(Debug, Clone)]
pub struct SimHeadingSensor {
    state: Arc<Mutex<HeadingState>>,
}

impl SimHeadingSensor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadingState {
                heading: 0.0,
                calibration_remaining: IMU_CALIBRATION_TIME,
            })),
        }
    }

    pub fn step(&self, dt: f64) {
        let mut state = self.state.lock().unwrap();
        state.calibration_remaining = (state.calibration_remaining - dt).max(0.0);
    }

    pub fn set_heading(&self, degrees: f64) {
        self.state.lock().unwrap().heading = normalize_degrees(degrees);
    }

    /// Finish calibration immediately.
    pub fn finish_calibration(&self) {
        self.state.lock().unwrap().calibration_remaining = 0.0;
    }
}

impl Default for SimHeadingSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingSensor for SimHeadingSensor {
    fn heading(&self) -> f64 {
        self.state.lock().unwrap().heading
    }

    fn is_calibrating(&self) -> bool {
        self.state.lock().unwrap().calibration_remaining > 0.0
    }
}

/// Four simulated modules plus an orientation sensor, with just enough
/// chassis kinematics to close the loop for the autonomous primitives: the
/// heading integrates the tangential component of each wheel's surface
/// speed.
pub struct SimRig {
    pub steering: [SimMotor; 4],
    pub drive: [SimMotor; 4],
    pub imu: SimHeadingSensor,
    config: ModuleConfig,
    heading: f64,
}

impl SimRig {
    pub fn new(config: ModuleConfig) -> Self {
        let steering_rpm = config.steering_gearset.max_rpm();
        let drive_rpm = config.drive_gearset.max_rpm();
        Self {
            steering: std::array::from_fn(|_| SimMotor::new(steering_rpm)),
            drive: std::array::from_fn(|_| SimMotor::new(drive_rpm)),
            imu: SimHeadingSensor::new(),
            config,
            heading: 0.0,
        }
    }

    /// Place the chassis at a known heading.
    pub fn set_heading(&mut self, degrees: f64) {
        self.heading = degrees;
        self.imu.set_heading(degrees);
    }

    pub fn step(&mut self, dt: f64) {
        for motor in self.steering.iter().chain(self.drive.iter()) {
            motor.step(dt);
        }
        self.imu.step(dt);

        let circumference = self.config.wheel_diameter * PI;
        let mut tangential = 0.0;
        for (index, (steering, drive)) in self.steering.iter().zip(&self.drive).enumerate() {
            let module_angle = (steering.position() * self.config.steering_ratio).to_radians();
            // the steering motor back-drives the wheel through the shared gearing
            let wheel_rpm = (drive.velocity() - steering.velocity() * self.config.coupling_ratio)
                * self.config.drive_ratio;
            let surface_speed = wheel_rpm / 60.0 * circumference;
            tangential += surface_speed * (module_angle - TANGENTIAL_DEG[index].to_radians()).cos();
        }
        tangential /= self.drive.len() as f64;

        self.heading += (tangential / CHASSIS_RADIUS_IN).to_degrees() * dt;
        self.imu.set_heading(self.heading);
    }
}
