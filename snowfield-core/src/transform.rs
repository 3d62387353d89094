/// 3D transformation matrices and the cube's spin state
///
/// Matrices use nalgebra's column-major storage, so `as_slice()` yields
/// the same 16 floats a fixed-function graphics API expects.
use nalgebra::{Matrix4, Point3, Vector3};

use crate::camera::CameraFrame;

/// Spin angle of the cube around its Y axis (in degrees)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spin {
    pub degrees: f32,
}

impl Spin {
    pub fn new(degrees: f32) -> Self {
        Self { degrees }
    }

    /// Advance by `step` degrees. Wraps through the periodicity of sin/cos.
    pub fn advance(&mut self, step: f32) {
        self.degrees += step;
    }

    pub fn radians(&self) -> f32 {
        self.degrees.to_radians()
    }
}

/// Create a rotation matrix of `angle` radians about `axis`.
///
/// The axis is normalized first. A zero axis yields the identity matrix.
pub fn rotation_matrix(angle: f32, axis: Vector3<f32>) -> Matrix4<f32> {
    if axis.x == 0.0 && axis.y == 0.0 && axis.z == 0.0 {
        return Matrix4::identity();
    }

    let axis = axis / axis.norm();
    let (x, y, z) = (axis.x, axis.y, axis.z);
    let (sin, cos) = angle.sin_cos();
    let one_minus_cos = 1.0 - cos;

    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, yz, zx) = (x * y, y * z, z * x);
    let (xs, ys, zs) = (x * sin, y * sin, z * sin);

    #[rustfmt::skip]
    let matrix = Matrix4::new(
        one_minus_cos * xx + cos, one_minus_cos * xy - zs,  one_minus_cos * zx + ys,  0.0,
        one_minus_cos * xy + zs,  one_minus_cos * yy + cos, one_minus_cos * yz - xs,  0.0,
        one_minus_cos * zx - ys,  one_minus_cos * yz + xs,  one_minus_cos * zz + cos, 0.0,
        0.0,                      0.0,                      0.0,                      1.0,
    );
    matrix
}

/// Rotate a vector with the upper-left 3×3 of `matrix`; translation is ignored
pub fn rotate_vector(vector: &Vector3<f32>, matrix: &Matrix4<f32>) -> Vector3<f32> {
    matrix.fixed_view::<3, 3>(0, 0) * vector
}

pub fn cross_product(u: &Vector3<f32>, v: &Vector3<f32>) -> Vector3<f32> {
    Vector3::new(
        u.y * v.z - v.y * u.z,
        -u.x * v.z + v.x * u.z,
        u.x * v.y - v.x * u.y,
    )
}

/// Build the view matrix for a camera frame.
///
/// Equivalent to a look-at transform, parameterized by the forward
/// direction instead of a target point: rows of the rotation are
/// (right, up, -forward), and the translation by `-location` happens
/// before reorienting.
pub fn view_matrix(frame: &CameraFrame) -> Matrix4<f32> {
    let z_flipped = -frame.forward;
    let x = cross_product(&frame.up, &z_flipped);
    let up = frame.up;

    #[rustfmt::skip]
    let rotation = Matrix4::new(
        x.x,         x.y,         x.z,         0.0,
        up.x,        up.y,        up.z,        0.0,
        z_flipped.x, z_flipped.y, z_flipped.z, 0.0,
        0.0,         0.0,         0.0,         1.0,
    );

    rotation * Matrix4::new_translation(&-frame.location.coords)
}

/// Create a translation matrix
pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Model transform of an object placed at `position` and spun around Y
pub fn model_matrix(position: &Point3<f32>, spin: &Spin) -> Matrix4<f32> {
    Matrix4::new_translation(&position.coords) * rotation_matrix(spin.radians(), Vector3::y())
}

/// Create a model-view-projection matrix
pub fn mvp_matrix(
    model: &Matrix4<f32>,
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
) -> Matrix4<f32> {
    projection * view * model
}
