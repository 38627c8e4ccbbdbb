pub mod sim;

use serde::Deserialize;

/// One actuator on the module. Commands are register writes at this
/// boundary; faults stay inside the concrete driver.
pub trait Motor: Send {
    /// Command an absolute position in motor degrees.
    fn set_position(&mut self, degrees: f64);
    /// Command a velocity in motor rpm.
    fn set_velocity(&mut self, rpm: f64);
    /// Cumulative signed position in motor degrees.
    fn position(&self) -> f64;
    /// Measured velocity in motor rpm.
    fn velocity(&self) -> f64;
}

/// Chassis orientation sensor.
pub trait HeadingSensor: Send {
    /// Heading in degrees, wrapping into [0, 360).
    fn heading(&self) -> f64;
    fn is_calibrating(&self) -> bool;
}

/// Gear cartridge installed in a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Gearset {
    Red,
    Green,
    Blue,
}

impl Gearset {
    /// Rated output rpm of a motor with this cartridge.
    pub fn max_rpm(self) -> f64 {
        match self {
            Gearset::Red => 100.0,
            Gearset::Green => 200.0,
            Gearset::Blue => 600.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gearset_rated_rpm() {
        assert_relative_eq!(Gearset::Red.max_rpm(), 100.0);
        assert_relative_eq!(Gearset::Green.max_rpm(), 200.0);
        assert_relative_eq!(Gearset::Blue.max_rpm(), 600.0);
    }
}
