pub mod messages;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::swerve_drive::SwerveDrive;
use crate::TICK_PERIOD;
use messages::{Axis, InputMessage};

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum InputError {
    #[error("input source closed")]
    SourceClosed,
    #[error("malformed input message")]
    MalformedMessage(#[from] serde_json::Error),
}

/// Where teleop samples come from. A real robot hooks this up to its radio;
/// tests and the demo binary replay recordings.
#[async_trait]
pub trait InputSource: Send {
    async fn next_message(&mut self) -> Result<InputMessage, InputError>;
}

/// Replays a recorded stream of input messages, one per tick period.
pub struct ReplayInputSource {
    frames: VecDeque<InputMessage>,
}

impl ReplayInputSource {
    pub fn new(frames: Vec<InputMessage>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn from_json(recording: &str) -> Result<Self, InputError> {
        let frames: Vec<InputMessage> = serde_json::from_str(recording)?;
        Ok(Self::new(frames))
    }
}

#[async_trait]
impl InputSource for ReplayInputSource {
    async fn next_message(&mut self) -> Result<InputMessage, InputError> {
        match self.frames.pop_front() {
            Some(frame) => {
                tokio::time::sleep(TICK_PERIOD).await;
                Ok(frame)
            }
            None => Err(InputError::SourceClosed),
        }
    }
}

/// Feed teleop samples into the drivetrain until the source closes. The
/// drivetrain is always stopped on the way out so an ended stream cannot
/// leave the last command standing.
pub async fn run_teleop_loop(
    drive: Arc<Mutex<SwerveDrive>>,
    mut source: Box<dyn InputSource>,
) -> Result<()> {
    loop {
        let message = match source.next_message().await {
            Ok(message) => message,
            Err(InputError::SourceClosed) => break,
            Err(error) => return Err(error.into()),
        };
        let Some(gamepad) = message.get_first() else {
            continue;
        };
        drive.lock().unwrap().drive_inputs(
            gamepad.axis(Axis::LeftStickY),
            gamepad.axis(Axis::LeftStickX),
            gamepad.axis(Axis::RightStickX),
        );
    }
    drive.lock().unwrap().stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::sim::SimRig;
    use crate::swerve_module::{ModuleConfig, SwerveModule};
    use approx::assert_relative_eq;

    const RECORDING: &str = r#"[
        {
            "gamepads": {
                "0": {
                    "name": "sim",
                    "connected": true,
                    "axis_state": { "LeftStickY": 1.0 }
                }
            },
            "time": "2024-05-01T12:00:00Z"
        },
        {
            "gamepads": {
                "0": {
                    "name": "sim",
                    "connected": true,
                    "axis_state": { "LeftStickY": 0.5 }
                }
            },
            "time": "2024-05-01T12:00:01Z"
        }
    ]"#;

    fn test_drive() -> (SwerveDrive, SimRig) {
        let config = ModuleConfig::default();
        let rig = SimRig::new(config.clone());
        let module = |index: usize| {
            SwerveModule::new(
                Box::new(rig.steering[index].clone()),
                Box::new(rig.drive[index].clone()),
                config.clone(),
            )
        };
        let drive = SwerveDrive::new(
            module(0),
            module(1),
            module(2),
            module(3),
            Box::new(rig.imu.clone()),
        );
        (drive, rig)
    }

    #[test]
    fn replay_source_rejects_malformed_recordings() {
        assert!(matches!(
            ReplayInputSource::from_json("not json"),
            Err(InputError::MalformedMessage(_))
        ));
    }

    #[tokio::test]
    async fn teleop_loop_drives_and_stops() {
        let (drive, rig) = test_drive();
        let drive = Arc::new(Mutex::new(drive));
        let source = ReplayInputSource::from_json(RECORDING).unwrap();

        run_teleop_loop(drive, Box::new(source)).await.unwrap();

        // every wheel was commanded, and the ended replay re-zeroed them all
        for motor in &rig.drive {
            assert_relative_eq!(motor.commanded_velocity().unwrap(), 0.0);
        }
        for steering in &rig.steering {
            assert!(steering.commanded_position().is_some());
        }
    }
}
