use tracing::error;

use crate::driver::HeadingSensor;
use crate::pid::{Pid, PidConfig};
use crate::swerve_module::SwerveModule;
use crate::vector::{shortest_angular_error, Vector};

const AXIS_DEADBAND: f64 = 0.07;

/// Coordinates the four modules of a square chassis. Pure rotation pushes
/// each wheel along its diagonal tangent; these are the wheel directions,
/// in the order left-front, right-front, left-rear, right-rear.
const ROTATION_DIRECTIONS_DEG: [f64; 4] = [45.0, 135.0, 315.0, 225.0];

pub struct SwerveDrive {
    left_front: SwerveModule,
    right_front: SwerveModule,
    left_rear: SwerveModule,
    right_rear: SwerveModule,
    imu: Box<dyn HeadingSensor>,
    drive_pid: Option<Pid>,
    turn_pid: Option<Pid>,
    auto_drive_init: bool,
    auto_turn_init: bool,
    drive_baseline: f64,
}

impl SwerveDrive {
    pub fn new(
        left_front: SwerveModule,
        right_front: SwerveModule,
        left_rear: SwerveModule,
        right_rear: SwerveModule,
        imu: Box<dyn HeadingSensor>,
    ) -> Self {
        Self {
            left_front,
            right_front,
            left_rear,
            right_rear,
            imu,
            drive_pid: None,
            turn_pid: None,
            auto_drive_init: true,
            auto_turn_init: true,
            drive_baseline: 0.0,
        }
    }

    /// Install the controller configuration for [`SwerveDrive::auto_drive`].
    /// Replaces any previous controller wholesale.
    pub fn set_drive_pid(&mut self, config: PidConfig) {
        self.drive_pid = Some(Pid::new(config));
    }

    /// Install the controller configuration for [`SwerveDrive::auto_turn`].
    pub fn set_turn_pid(&mut self, config: PidConfig) {
        self.turn_pid = Some(Pid::new(config));
    }

    /// Drive from raw joystick axes in [-1, 1]. Inputs under the deadband
    /// are zeroed, independently for the lateral vector and for rotation.
    pub fn drive_inputs(&mut self, left_y: f64, left_x: f64, right_x: f64) {
        let mut lateral = Vector::from_cartesian(left_x, left_y);
        if lateral.magnitude() < AXIS_DEADBAND {
            lateral = Vector::zero();
        }
        let rotation = if right_x.abs() < AXIS_DEADBAND {
            0.0
        } else {
            right_x
        };
        self.drive(lateral, rotation);
    }

    /// Decompose a lateral intent plus a rotation fraction into the four
    /// wheel commands. Each wheel's requirement is the sum of the chassis
    /// translation and the tangential velocity of rotating about the center.
    pub fn drive(&mut self, lateral: Vector, rotation: f64) {
        let modules = [
            &mut self.left_front,
            &mut self.right_front,
            &mut self.left_rear,
            &mut self.right_rear,
        ];
        for (module, direction_deg) in modules.into_iter().zip(ROTATION_DIRECTIONS_DEG) {
            let tangential = Vector::from_polar(direction_deg.to_radians(), rotation);
            let command = tangential + lateral;
            module.set(command.direction().to_degrees(), command.magnitude());
        }
    }

    /// Stop all four wheels.
    pub fn stop(&mut self) {
        self.drive(Vector::zero(), 0.0);
    }

    /// Drive straight along `direction_deg` until `distance` inches have
    /// been covered, closed-loop on the left-front module's encoder. Call
    /// once per tick; returns true when the maneuver is complete and the
    /// drivetrain has been stopped.
    pub fn auto_drive(&mut self, direction_deg: f64, speed: f64, distance: f64) -> bool {
        if self.drive_pid.is_none() {
            error!("cannot run auto_drive: no drive pid configured");
            return true;
        }

        if self.auto_drive_init {
            // line the wheels up before any of them start rolling
            let mut all_arrived = true;
            all_arrived &= self.left_front.set_direction(direction_deg);
            all_arrived &= self.right_front.set_direction(direction_deg);
            all_arrived &= self.left_rear.set_direction(direction_deg);
            all_arrived &= self.right_rear.set_direction(direction_deg);

            // zero speed still counteracts the steering-induced wheel motion
            self.left_front.set_speed(0.0);
            self.right_front.set_speed(0.0);
            self.left_rear.set_speed(0.0);
            self.right_rear.set_speed(0.0);

            if !all_arrived {
                return false;
            }

            self.drive_baseline = self.left_front.distance_driven();
            if let Some(pid) = self.drive_pid.as_mut() {
                pid.reset();
                pid.set_target(distance);
                pid.set_limits(-speed.abs(), speed.abs());
            }
            self.auto_drive_init = false;
        }

        let traveled = self.left_front.distance_driven() - self.drive_baseline;
        let (output, on_target) = match self.drive_pid.as_mut() {
            Some(pid) => {
                pid.update(traveled);
                (pid.get(), pid.is_on_target())
            }
            None => (0.0, true),
        };

        self.drive(Vector::from_polar(direction_deg.to_radians(), output), 0.0);

        if on_target {
            self.stop();
            self.auto_drive_init = true;
            return true;
        }
        false
    }

    /// Rotate in place until the chassis faces `heading_deg`, closed-loop on
    /// the orientation sensor. Holds while the sensor is still calibrating.
    /// Call once per tick; returns true when complete.
    pub fn auto_turn(&mut self, heading_deg: f64, speed: f64) -> bool {
        if self.turn_pid.is_none() {
            error!("cannot run auto_turn: no turn pid configured");
            return true;
        }

        if self.imu.is_calibrating() {
            return false;
        }

        if self.auto_turn_init {
            if let Some(pid) = self.turn_pid.as_mut() {
                pid.reset();
                pid.set_target(0.0);
                pid.set_limits(-speed.abs(), speed.abs());
            }
            self.auto_turn_init = false;
        }

        // the controller regulates the shortest-path heading error to zero
        let heading_error = shortest_angular_error(heading_deg, self.imu.heading());
        let (rotation, on_target) = match self.turn_pid.as_mut() {
            Some(pid) => {
                pid.update(heading_error);
                (pid.get(), pid.is_on_target())
            }
            None => (0.0, true),
        };

        self.drive(Vector::zero(), rotation);

        if on_target {
            self.stop();
            self.auto_turn_init = true;
            return true;
        }
        false
    }
}
