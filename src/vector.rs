use nalgebra as na;
use std::ops::Add;

/// 2D motion intent, stored cartesian but usually built and read back in
/// polar form. Building from a negative magnitude yields the vector pointing
/// the opposite way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    inner: na::Vector2<f64>,
}

impl Vector {
    pub fn from_polar(direction: f64, magnitude: f64) -> Self {
        Self {
            inner: na::Vector2::new(magnitude * direction.cos(), magnitude * direction.sin()),
        }
    }

    pub fn from_cartesian(x: f64, y: f64) -> Self {
        Self {
            inner: na::Vector2::new(x, y),
        }
    }

    pub fn zero() -> Self {
        Self {
            inner: na::Vector2::zeros(),
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.inner.norm()
    }

    /// Direction in radians. A zero-magnitude vector has no direction and
    /// reports 0.
    pub fn direction(&self) -> f64 {
        if self.inner == na::Vector2::zeros() {
            0.0
        } else {
            self.inner.y.atan2(self.inner.x)
        }
    }

    pub fn x(&self) -> f64 {
        self.inner.x
    }

    pub fn y(&self) -> f64 {
        self.inner.y
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector {
            inner: self.inner + other.inner,
        }
    }
}

/// Wraps any angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Signed angular offset of `current` from `target`, shortest way around,
/// in (-180, 180]. A target of 350 with a current heading of 10 yields +20.
pub fn shortest_angular_error(target: f64, current: f64) -> f64 {
    let difference = (current - target).rem_euclid(360.0);
    if difference > 180.0 {
        difference - 360.0
    } else {
        difference
    }
}
