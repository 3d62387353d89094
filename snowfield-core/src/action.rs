/// A discrete camera input, independent of the device that produced it.
///
/// The scene consumes actions, never raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Step along the camera's forward vector.
    MoveForward,
    /// Step against the camera's forward vector.
    MoveBackward,
    /// Turn counter-clockwise around the camera's up vector.
    RotateLeft,
    /// Turn clockwise around the camera's up vector.
    RotateRight,
}

/// Magnitudes applied per action and per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steps {
    /// Distance travelled per move action
    pub move_distance: f32,
    /// Degrees turned per rotate action
    pub turn_degrees: f32,
    /// Degrees the cube spins per tick
    pub spin_degrees: f32,
}

impl Default for Steps {
    fn default() -> Self {
        Self {
            move_distance: 0.1,
            turn_degrees: 0.1,
            spin_degrees: 0.1,
        }
    }
}
