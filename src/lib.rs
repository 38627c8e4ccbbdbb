#![doc = include_str!("../README.md")]
pub mod configuration;
pub mod driver;
pub mod gamepad;
pub mod logging;
pub mod pid;
pub mod sequencer;
pub mod swerve_drive;
pub mod swerve_module;
pub mod vector;

use std::time::Duration;

/// Period of the control loop. Actuation and feedback both advance once per
/// tick; the feedback controllers assume this interval.
pub const TICK_PERIOD: Duration = Duration::from_millis(20);
