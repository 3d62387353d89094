/// Snowfield Core Library - Scene geometry and camera math
///
/// This library provides the device-independent part of the viewer:
/// procedural meshes for the ground and the cube, the camera frame of
/// reference, rotation and view transforms, and the scene state the
/// render driver reads every frame.

pub mod action;
pub mod camera;
pub mod geometry;
pub mod projection;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use action::{Action, Steps};
pub use camera::CameraFrame;
pub use geometry::{GroundGrid, Mesh, MeshError};
pub use projection::{Ndc, Projection};
pub use scene::Scene;
pub use transform::Spin;
