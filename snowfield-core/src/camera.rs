/// Camera frame of reference and its movement
use nalgebra::{Matrix4, Point3, Vector3};
use tracing::trace;

use crate::transform::{cross_product, rotate_vector, rotation_matrix, view_matrix};

/// A frame of reference: a location plus up and forward unit vectors.
///
/// `up` and `forward` are kept roughly orthogonal by construction; no
/// operation renormalizes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub location: Point3<f32>,
    pub up: Vector3<f32>,
    pub forward: Vector3<f32>,
}

impl Default for CameraFrame {
    /// The default viewing position: at the origin, looking down -Z with +Y up
    fn default() -> Self {
        Self {
            location: Point3::origin(),
            up: Vector3::new(0.0, 1.0, 0.0),
            forward: Vector3::new(0.0, 0.0, -1.0),
        }
    }
}

impl CameraFrame {
    pub fn new(location: Point3<f32>, up: Vector3<f32>, forward: Vector3<f32>) -> Self {
        Self {
            location,
            up,
            forward,
        }
    }

    /// March the frame along its forward vector. Negative distances move backwards.
    pub fn move_forward(&mut self, distance: f32) {
        self.location += self.forward * distance;
        trace!(distance, location = ?self.location, "camera moved");
    }

    /// Rotate the forward vector around the local up axis (in degrees)
    pub fn rotate_local_y(&mut self, angle_degrees: f32) {
        let rotation = rotation_matrix(angle_degrees.to_radians(), self.up);
        self.forward = rotate_vector(&self.forward, &rotation);
        trace!(angle_degrees, forward = ?self.forward, "camera turned");
    }

    /// Local X axis of the frame
    pub fn right(&self) -> Vector3<f32> {
        cross_product(&self.up, &-self.forward)
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        view_matrix(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_default_frame() {
        let frame = CameraFrame::default();
        assert_eq!(frame.location, Point3::origin());
        assert_eq!(frame.up, Vector3::y());
        assert_eq!(frame.forward, -Vector3::z());
        assert_eq!(frame.right(), Vector3::x());
    }

    #[test]
    fn test_move_forward_and_back() {
        let mut frame = CameraFrame::default();
        frame.rotate_local_y(37.0);
        frame.location = Point3::new(1.5, -0.25, 4.0);
        let start = frame.location;

        for distance in [0.1, 2.0, -3.7, 1e3] {
            frame.move_forward(distance);
            frame.move_forward(-distance);
            assert!((frame.location - start).norm() < 1e-3);
        }
    }

    #[test]
    fn test_move_forward_exact_along_axis() {
        let mut frame = CameraFrame::default();
        frame.move_forward(0.5);
        assert_eq!(frame.location, Point3::new(0.0, 0.0, -0.5));
        frame.move_forward(-0.5);
        assert_eq!(frame.location, Point3::origin());
    }

    #[test]
    fn test_full_revolution() {
        let mut frame = CameraFrame::default();
        for _ in 0..36 {
            frame.rotate_local_y(10.0);
        }
        assert!((frame.forward - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-4);
        assert_eq!(frame.up, Vector3::y());
        assert_eq!(frame.location, Point3::origin());
    }

    #[test]
    fn test_rotate_left_turns_towards_minus_x() {
        let mut frame = CameraFrame::default();
        frame.rotate_local_y(90.0);
        assert!((frame.forward - Vector3::new(-1.0, 0.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_rotation_keeps_unit_length() {
        let mut frame = CameraFrame::default();
        for _ in 0..1000 {
            frame.rotate_local_y(0.1);
        }
        assert!((frame.forward.norm() - 1.0).abs() < 1e-4);
    }
}
