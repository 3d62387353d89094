/// Scene state shared with the render driver
///
/// Two independent triggers request a redraw: the periodic tick and
/// camera input. Both only raise a flag; the render loop consumes it
/// once per frame with `Scene::take_redraw`.
use nalgebra::{Matrix4, Point3};
use tracing::debug;

use crate::action::{Action, Steps};
use crate::camera::CameraFrame;
use crate::geometry::{GroundGrid, Mesh};
use crate::transform::{model_matrix, Spin};

/// Where the spinning cube sits in the world
pub const CUBE_POSITION: [f32; 3] = [0.0, 0.8, -7.0];

#[derive(Debug, Clone)]
pub struct Scene {
    ground: Mesh,
    cube: Mesh,
    pub camera: CameraFrame,
    pub spin: Spin,
    pub cube_position: Point3<f32>,
    pub steps: Steps,
    redraw_requested: bool,
}

impl Scene {
    pub fn new(grid: &GroundGrid, steps: Steps) -> Self {
        let ground = Mesh::ground(grid);
        let cube = Mesh::cube();
        debug!(
            ground_triangles = ground.triangle_count(),
            cube_triangles = cube.triangle_count(),
            "scene meshes built"
        );

        Self {
            ground,
            cube,
            camera: CameraFrame::default(),
            spin: Spin::default(),
            cube_position: Point3::from(CUBE_POSITION),
            steps,
            // The first frame always needs drawing
            redraw_requested: true,
        }
    }

    pub fn ground(&self) -> &Mesh {
        &self.ground
    }

    pub fn cube(&self) -> &Mesh {
        &self.cube
    }

    /// Advance the cube's spin by one step and request a redraw
    pub fn tick(&mut self) {
        self.spin.advance(self.steps.spin_degrees);
        self.redraw_requested = true;
    }

    /// Apply a camera action and request a redraw
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::MoveForward => self.camera.move_forward(self.steps.move_distance),
            Action::MoveBackward => self.camera.move_forward(-self.steps.move_distance),
            Action::RotateLeft => self.camera.rotate_local_y(self.steps.turn_degrees),
            Action::RotateRight => self.camera.rotate_local_y(-self.steps.turn_degrees),
        }
        self.redraw_requested = true;
    }

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Consume the pending redraw request
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera.view_matrix()
    }

    pub fn ground_model_matrix(&self) -> Matrix4<f32> {
        Matrix4::identity()
    }

    pub fn cube_model_matrix(&self) -> Matrix4<f32> {
        model_matrix(&self.cube_position, &self.spin)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(&GroundGrid::default(), Steps::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_new_scene_wants_first_frame() {
        let mut scene = Scene::default();
        assert!(scene.take_redraw());
        assert!(!scene.take_redraw());
    }

    #[test]
    fn test_meshes_are_built() {
        let scene = Scene::default();
        assert_eq!(scene.cube().vertices.len(), 36);
        assert_eq!(scene.ground().vertices.len(), 9600);
    }

    #[test]
    fn test_tick_spins_and_requests_redraw() {
        let mut scene = Scene::default();
        scene.take_redraw();
        scene.tick();
        scene.tick();
        assert!((scene.spin.degrees - 0.2).abs() < 1e-6);
        assert!(scene.take_redraw());
        assert!(!scene.take_redraw());
    }

    #[test]
    fn test_redraw_requests_coalesce() {
        let mut scene = Scene::default();
        scene.tick();
        scene.apply(Action::MoveForward);
        scene.request_redraw();
        assert!(scene.take_redraw());
        assert!(!scene.take_redraw());
    }

    #[test]
    fn test_actions_move_camera() {
        let steps = Steps {
            move_distance: 1.0,
            turn_degrees: 90.0,
            spin_degrees: 0.1,
        };
        let mut scene = Scene::new(&GroundGrid { size: 2, height: -0.4 }, steps);

        scene.apply(Action::MoveForward);
        assert_eq!(scene.camera.location, Point3::new(0.0, 0.0, -1.0));
        scene.apply(Action::MoveBackward);
        assert_eq!(scene.camera.location, Point3::origin());

        scene.apply(Action::RotateLeft);
        assert!((scene.camera.forward - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-5);
        scene.apply(Action::RotateRight);
        scene.apply(Action::RotateRight);
        assert!((scene.camera.forward - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_default_steps() {
        let mut scene = Scene::default();
        scene.apply(Action::MoveForward);
        assert!((scene.camera.location.z + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_cube_model_matrix_translation() {
        let scene = Scene::default();
        let model = scene.cube_model_matrix();
        assert!((model[(0, 3)] - 0.0).abs() < 1e-6);
        assert!((model[(1, 3)] - 0.8).abs() < 1e-6);
        assert!((model[(2, 3)] + 7.0).abs() < 1e-6);
        assert_eq!(scene.ground_model_matrix(), Matrix4::identity());
    }
}
