//! Camera pose snapshot
//!
//! The engine does not own camera controls; it snapshots whatever pose the
//! application reports at each sequence restart and forwards it to the
//! capability inside the per-iteration request.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Camera pose handed to the renderer with each request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Eye position in world space
    pub position: Point3<f32>,

    /// Point the camera is looking at in world space
    pub target: Point3<f32>,

    /// Up vector for camera orientation
    pub up: Vector3<f32>,

    /// Vertical field of view in degrees
    pub fov_degrees: f32,
}

impl Camera {
    /// Create a camera looking from `position` toward `target`
    pub fn look_at(position: Point3<f32>, target: Point3<f32>, fov_degrees: f32) -> Self {
        Self {
            position,
            target,
            up: Vector3::y(),
            fov_degrees,
        }
    }

    /// View direction, not normalized
    pub fn direction(&self) -> Vector3<f32> {
        self.target - self.position
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::look_at(Point3::new(0.0, 1.0, 5.0), Point3::origin(), 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_points_at_target() {
        let camera = Camera::look_at(Point3::new(0.0, 0.0, 5.0), Point3::origin(), 45.0);
        let direction = camera.direction();
        assert!(direction.z < 0.0);
        assert_eq!(direction.x, 0.0);
    }
}
