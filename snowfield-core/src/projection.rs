/// Perspective projection utilities
use nalgebra::{Matrix4, Vector4};

/// A vertex after the perspective divide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ndc {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Reciprocal of the clip-space w, kept for perspective-correct interpolation
    pub inv_w: f32,
}

impl Ndc {
    /// Map to viewport pixel coordinates, with y growing downwards
    pub fn to_screen(&self, width: u32, height: u32) -> (f32, f32) {
        let screen_x = (self.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - self.y) * 0.5 * height as f32;
        (screen_x, screen_y)
    }
}

/// Perspective frustum configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            fov_y_degrees: 35.0,
            aspect: Self::aspect_of(width, height),
            near: 1.0,
            far: 50.0,
        }
    }

    /// Empty viewports are treated as one unit wide or tall
    fn aspect_of(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = Self::aspect_of(width, height);
    }

    /// Create the projection matrix
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(
            self.aspect,
            self.fov_y_degrees.to_radians(),
            self.near,
            self.far,
        )
    }

    /// Perspective divide of a clip-space position.
    ///
    /// Returns `None` for points on or behind the eye plane.
    pub fn project(clip: &Vector4<f32>) -> Option<Ndc> {
        // Prevent division by near-zero w values
        if clip.w <= 1e-6 {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        Some(Ndc {
            x: clip.x * inv_w,
            y: clip.y * inv_w,
            z: clip.z * inv_w,
            inv_w,
        })
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_creation() {
        let projection = Projection::new(800, 600);
        assert!((projection.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(projection.fov_y_degrees, 35.0);
        assert_eq!((projection.near, projection.far), (1.0, 50.0));
    }

    #[test]
    fn test_zero_height_viewport() {
        let mut projection = Projection::new(640, 0);
        assert_eq!(projection.aspect, 640.0);
        projection.resize(100, 50);
        assert_eq!(projection.aspect, 2.0);
    }

    #[test]
    fn test_zero_width_viewport() {
        let mut projection = Projection::new(0, 24);
        assert!(projection.aspect > 0.0);
        assert!(projection.matrix().iter().all(|v| v.is_finite()));

        projection.resize(0, 0);
        assert_eq!(projection.aspect, 1.0);
        assert!(projection.matrix().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_near_and_far_planes_map_to_ndc_bounds() {
        let matrix = Projection::new(100, 100).matrix();
        let near = Projection::project(&(matrix * Vector4::new(0.0, 0.0, -1.0, 1.0))).unwrap();
        let far = Projection::project(&(matrix * Vector4::new(0.0, 0.0, -50.0, 1.0))).unwrap();
        assert!((near.z + 1.0).abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-4);
        assert!((near.inv_w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_points_behind_eye_are_rejected() {
        let matrix = Projection::default().matrix();
        let behind = matrix * Vector4::new(0.0, 0.0, 2.0, 1.0);
        assert!(Projection::project(&behind).is_none());
    }

    #[test]
    fn test_to_screen() {
        let ndc = Ndc { x: 0.0, y: 0.0, z: 0.0, inv_w: 1.0 };
        assert_eq!(ndc.to_screen(80, 40), (40.0, 20.0));
        let corner = Ndc { x: -1.0, y: 1.0, z: 0.0, inv_w: 1.0 };
        assert_eq!(corner.to_screen(80, 40), (0.0, 0.0));
    }
}
