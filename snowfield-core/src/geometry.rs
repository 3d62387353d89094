/// Procedural meshes for the scene: the textured cube and the ground grid
use nalgebra::{Point2, Point3};

/// Errors reported by [`Mesh::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("{texcoords} texture coordinates for {vertices} vertices")]
    TexcoordCount { vertices: usize, texcoords: usize },
    #[error("index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
    #[error("{0} indices do not form a triangle list")]
    PartialTriangle(usize),
}

/// Texture coordinates of a quad's corners: bottom-left, bottom-right, top-left, top-right
const QUAD_UV: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

/// Cube faces as (bottom-left, bottom-right, top-left, top-right) seen from outside.
/// Front, right, back, left, bottom, top.
const CUBE_FACES: [[[f32; 3]; 4]; 6] = [
    [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
    [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
    [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
    [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]],
    [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0]],
    [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
];

/// Corner order of the two triangles of a cube face
const CUBE_FACE_ORDER: [usize; 6] = [0, 1, 2, 1, 3, 2];

/// Corner order of the two triangles of a ground quad
const GROUND_QUAD_ORDER: [usize; 6] = [0, 1, 3, 0, 3, 2];

/// Parameters of the ground grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundGrid {
    /// Number of unit quads along each axis
    pub size: u32,
    /// Height of the plane
    pub height: f32,
}

impl GroundGrid {
    /// Largest grid whose vertex count stays well inside `u32` indices
    pub const MAX_SIZE: u32 = 1024;
}

impl Default for GroundGrid {
    fn default() -> Self {
        Self {
            size: 40,
            height: -0.4,
        }
    }
}

/// A triangle-list mesh with one texture coordinate per vertex.
///
/// Vertices are never shared between triangles, so `indices` is simply
/// the running vertex count for the procedural meshes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3<f32>>,
    pub texcoords: Vec<Point2<f32>>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            texcoords: Vec::with_capacity(capacity),
            indices: Vec::with_capacity(capacity),
        }
    }

    /// Append a vertex and index it
    fn push(&mut self, position: [f32; 3], uv: [f32; 2]) {
        let index = self.vertices.len() as u32;
        self.vertices.push(Point3::from(position));
        self.texcoords.push(Point2::from(uv));
        self.indices.push(index);
    }

    /// Build the cube centred at the origin with corners at ±1.
    ///
    /// Every face carries the full texture, and every face keeps
    /// counter-clockwise winding when seen from outside so back-face
    /// culling keeps the visible side.
    pub fn cube() -> Self {
        let mut mesh = Self::with_capacity(CUBE_FACES.len() * CUBE_FACE_ORDER.len());

        for face in &CUBE_FACES {
            for &corner in &CUBE_FACE_ORDER {
                mesh.push(face[corner], QUAD_UV[corner]);
            }
        }

        mesh
    }

    /// Build the ground: `size × size` unit quads at `grid.height`.
    ///
    /// Rows run from far (+Z) to near (-Z), columns from -X to +X.
    /// `grid.size` must not exceed [`GroundGrid::MAX_SIZE`].
    pub fn ground(grid: &GroundGrid) -> Self {
        debug_assert!(grid.size <= GroundGrid::MAX_SIZE);
        let size = grid.size as i32;
        let half = size / 2;
        let y = grid.height;
        let mut mesh = Self::with_capacity((size * size) as usize * GROUND_QUAD_ORDER.len());

        for z in ((-half + 1)..=(size - half)).rev() {
            for x in -half..(size - half) {
                let (x0, x1) = (x as f32, (x + 1) as f32);
                let (z0, z1) = (z as f32, (z - 1) as f32);
                let corners = [[x0, y, z0], [x1, y, z0], [x0, y, z1], [x1, y, z1]];

                for &corner in &GROUND_QUAD_ORDER {
                    mesh.push(corners[corner], QUAD_UV[corner]);
                }
            }
        }

        mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate the triangle list as vertex index triples
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0] as usize, tri[1] as usize, tri[2] as usize])
    }

    /// Check the structural invariants of the mesh
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.texcoords.len() != self.vertices.len() {
            return Err(MeshError::TexcoordCount {
                vertices: self.vertices.len(),
                texcoords: self.texcoords.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&index| index as usize >= self.vertices.len())
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertices: self.vertices.len(),
            });
        }
        Ok(())
    }
}
