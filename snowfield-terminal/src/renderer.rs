/// Software rasterizer drawing textured meshes into a truecolor terminal
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use image::RgbImage;
use nalgebra::{Matrix4, Point2, Vector4};
use snowfield_core::{Mesh, Projection};
use std::io::Write;

use crate::texture::Texture;

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '\u{2580}';

/// Bluish background
pub const CLEAR_COLOR: [u8; 3] = [0, 0, 128];

/// Opaque identifier of an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHandle(usize);

/// Drawing state passed explicitly to every draw call
#[derive(Debug)]
pub struct RenderContext {
    textures: Vec<Texture>,
    bound: Option<TextureHandle>,
    pub clear_color: [u8; 3],
    pub cull_back_faces: bool,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            bound: None,
            clear_color: CLEAR_COLOR,
            cull_back_faces: true,
        }
    }

    /// Take ownership of a texture and hand out its handle
    pub fn upload(&mut self, texture: Texture) -> TextureHandle {
        self.textures.push(texture);
        TextureHandle(self.textures.len() - 1)
    }

    pub fn bind(&mut self, handle: TextureHandle) {
        self.bound = Some(handle);
    }

    pub fn bound_texture(&self) -> Option<&Texture> {
        self.bound.and_then(|TextureHandle(index)| self.textures.get(index))
    }
}

/// Color and depth targets
pub struct Framebuffer {
    width: usize,
    height: usize,
    color: Vec<[u8; 3]>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            color: vec![CLEAR_COLOR; size],
            depth: vec![f32::INFINITY; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: [u8; 3]) {
        self.color.fill(color);
        self.depth.fill(f32::INFINITY);
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self.color[y * self.width + x]
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgb(self.pixel(x as usize, y as usize))
        })
    }

    /// Write the framebuffer to the terminal, two pixel rows per cell row
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<([u8; 3], [u8; 3])> = None;

        for row in 0..self.height / 2 {
            if row > 0 {
                writer.queue(Print("\r\n"))?;
            }
            for x in 0..self.width {
                let top = self.pixel(x, row * 2);
                let bottom = self.pixel(x, row * 2 + 1);

                // Only emit color changes
                if current != Some((top, bottom)) {
                    writer.queue(SetForegroundColor(rgb(top)))?;
                    writer.queue(SetBackgroundColor(rgb(bottom)))?;
                    current = Some((top, bottom));
                }
                writer.queue(Print(HALF_BLOCK))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Framebuffer size for a terminal of `columns × rows` cells
pub fn terminal_pixels(columns: u16, rows: u16) -> (usize, usize) {
    (columns as usize, rows as usize * 2)
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

/// A vertex in clip space with its texture coordinate
#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    position: Vector4<f32>,
    uv: Point2<f32>,
}

impl ClipVertex {
    /// Signed distance to the near plane (z = -w in OpenGL clip space)
    fn near_distance(&self) -> f32 {
        self.position.z + self.position.w
    }

    fn lerp(&self, other: &ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            position: self.position.lerp(&other.position, t),
            uv: Point2::from(self.uv.coords.lerp(&other.uv.coords, t)),
        }
    }
}

/// A vertex ready for rasterization
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    inv_w: f32,
    uv_over_w: Point2<f32>,
}

/// Rasterizer for textured triangle meshes
pub struct Rasterizer;

impl Rasterizer {
    /// Draw every triangle of `mesh` with the texture bound in `context`
    pub fn draw_mesh(
        target: &mut Framebuffer,
        context: &RenderContext,
        mesh: &Mesh,
        mvp: &Matrix4<f32>,
    ) -> usize {
        let clip: Vec<Vector4<f32>> = mesh
            .vertices
            .iter()
            .map(|v| mvp * v.to_homogeneous())
            .collect();

        let mut drawn = 0;
        for [a, b, c] in mesh.triangles() {
            let triangle = [a, b, c].map(|i| ClipVertex {
                position: clip[i],
                uv: mesh.texcoords[i],
            });
            if Self::draw_triangle(target, context, &triangle) {
                drawn += 1;
            }
        }
        drawn
    }

    /// Returns whether any part of the triangle survived clipping and culling
    fn draw_triangle(
        target: &mut Framebuffer,
        context: &RenderContext,
        triangle: &[ClipVertex; 3],
    ) -> bool {
        let polygon = clip_near(triangle);
        if polygon.len() < 3 {
            return false;
        }

        let screen: Vec<ScreenVertex> = polygon
            .iter()
            .filter_map(|v| to_screen(v, target.width, target.height))
            .collect();
        if screen.len() != polygon.len() {
            return false;
        }

        let mut visible = false;
        for i in 1..screen.len() - 1 {
            let fan = [screen[0], screen[i], screen[i + 1]];
            // Screen y grows downwards, so counter-clockwise front faces have negative area
            if context.cull_back_faces && signed_area(&fan) >= 0.0 {
                continue;
            }
            Self::rasterize(target, context, &fan);
            visible = true;
        }
        visible
    }

    fn rasterize(target: &mut Framebuffer, context: &RenderContext, v: &[ScreenVertex; 3]) {
        let texture = context.bound_texture();

        // Bounding box
        let min_x = v[0].x.min(v[1].x).min(v[2].x).floor() as i32;
        let max_x = v[0].x.max(v[1].x).max(v[2].x).ceil() as i32;
        let min_y = v[0].y.min(v[1].y).min(v[2].y).floor() as i32;
        let max_y = v[0].y.max(v[1].y).max(v[2].y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(target.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(target.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v[0].x, v[0].y), (v[1].x, v[1].y), (v[2].x, v[2].y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v[0].depth + w1 * v[1].depth + w2 * v[2].depth;
                let idx = y as usize * target.width + x as usize;
                if depth >= target.depth[idx] {
                    continue;
                }

                let color = match texture {
                    Some(texture) => {
                        // Perspective-correct texture coordinates
                        let inv_w = w0 * v[0].inv_w + w1 * v[1].inv_w + w2 * v[2].inv_w;
                        let uv = (v[0].uv_over_w.coords * w0
                            + v[1].uv_over_w.coords * w1
                            + v[2].uv_over_w.coords * w2)
                            / inv_w;
                        texture.sample(Point2::from(uv))
                    }
                    None => [255, 255, 255],
                };

                target.depth[idx] = depth;
                target.color[idx] = color;
            }
        }
    }
}

/// Clip a triangle against the near plane, returning a convex polygon
fn clip_near(triangle: &[ClipVertex; 3]) -> Vec<ClipVertex> {
    let mut polygon = Vec::with_capacity(4);
    for i in 0..3 {
        let current = triangle[i];
        let next = triangle[(i + 1) % 3];
        let (d0, d1) = (current.near_distance(), next.near_distance());

        if d0 >= 0.0 {
            polygon.push(current);
        }
        if (d0 >= 0.0) != (d1 >= 0.0) {
            polygon.push(current.lerp(&next, d0 / (d0 - d1)));
        }
    }
    polygon
}

fn to_screen(vertex: &ClipVertex, width: usize, height: usize) -> Option<ScreenVertex> {
    let ndc = Projection::project(&vertex.position)?;
    let (x, y) = ndc.to_screen(width as u32, height as u32);
    Some(ScreenVertex {
        x,
        y,
        depth: ndc.z,
        inv_w: ndc.inv_w,
        uv_over_w: Point2::from(vertex.uv.coords * ndc.inv_w),
    })
}

fn signed_area(v: &[ScreenVertex; 3]) -> f32 {
    (v[1].x - v[0].x) * (v[2].y - v[0].y) - (v[2].x - v[0].x) * (v[1].y - v[0].y)
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use nalgebra::Point3;

    const RED: [u8; 3] = [255, 0, 0];

    fn red_context() -> RenderContext {
        let mut context = RenderContext::new();
        let handle = context.upload(Texture::from_image(RgbImage::from_pixel(4, 4, Rgb(RED))));
        context.bind(handle);
        context
    }

    /// A quad at height `z` covering [-0.5, 0.5]², counter-clockwise towards +Z
    fn quad(z: f32) -> Mesh {
        let corners = [[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]];
        let mut mesh = Mesh::new();
        for [x, y] in corners {
            mesh.vertices.push(Point3::new(x, y, z));
            mesh.texcoords.push(Point2::new(x + 0.5, y + 0.5));
        }
        mesh.indices = vec![0, 1, 2, 0, 2, 3];
        mesh
    }

    fn mvp() -> Matrix4<f32> {
        let projection = Projection::new(40, 40).matrix();
        let view = Matrix4::new_translation(&nalgebra::Vector3::new(0.0, 0.0, -3.0));
        projection * view
    }

    #[test]
    fn test_texture_handles() {
        let mut context = RenderContext::new();
        assert!(context.bound_texture().is_none());
        let first = context.upload(Texture::snow());
        let second = context.upload(Texture::tree());
        assert_ne!(first, second);
        context.bind(second);
        assert!(context.bound_texture().is_some());
    }

    #[test]
    fn test_draws_front_face() {
        let mut target = Framebuffer::new(40, 40);
        let drawn = Rasterizer::draw_mesh(&mut target, &red_context(), &quad(0.0), &mvp());
        assert_eq!(drawn, 2);
        assert_eq!(target.pixel(20, 20), RED);
        assert_eq!(target.pixel(0, 0), CLEAR_COLOR);
    }

    #[test]
    fn test_culls_back_face() {
        let mut mesh = quad(0.0);
        mesh.indices = vec![0, 2, 1, 0, 3, 2];
        let mut target = Framebuffer::new(40, 40);
        let mut context = red_context();
        assert_eq!(Rasterizer::draw_mesh(&mut target, &context, &mesh, &mvp()), 0);
        assert_eq!(target.pixel(20, 20), CLEAR_COLOR);

        context.cull_back_faces = false;
        assert_eq!(Rasterizer::draw_mesh(&mut target, &context, &mesh, &mvp()), 2);
        assert_eq!(target.pixel(20, 20), RED);
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut target = Framebuffer::new(40, 40);
        let near = red_context();
        let mut far = RenderContext::new();
        let blue = far.upload(Texture::from_image(RgbImage::from_pixel(2, 2, Rgb([0, 0, 255]))));
        far.bind(blue);

        Rasterizer::draw_mesh(&mut target, &near, &quad(0.5), &mvp());
        Rasterizer::draw_mesh(&mut target, &far, &quad(-0.5), &mvp());
        assert_eq!(target.pixel(20, 20), RED);
    }

    #[test]
    fn test_triangle_behind_camera_is_clipped() {
        let mut target = Framebuffer::new(40, 40);
        let drawn = Rasterizer::draw_mesh(&mut target, &red_context(), &quad(5.0), &mvp());
        assert_eq!(drawn, 0);
    }

    #[test]
    fn test_clip_near_splits_crossing_triangle() {
        let vertex = |z: f32| ClipVertex {
            position: Vector4::new(0.0, 0.0, z, 1.0),
            uv: Point2::origin(),
        };
        assert_eq!(clip_near(&[vertex(0.0), vertex(0.0), vertex(0.0)]).len(), 3);
        assert_eq!(clip_near(&[vertex(-2.0), vertex(0.0), vertex(0.0)]).len(), 4);
        assert_eq!(clip_near(&[vertex(-2.0), vertex(-2.0), vertex(0.0)]).len(), 3);
        assert!(clip_near(&[vertex(-2.0), vertex(-2.0), vertex(-2.0)]).is_empty());
    }

    #[test]
    fn test_clear_and_image() {
        assert_eq!(terminal_pixels(8, 3), (8, 6));
        let mut target = Framebuffer::new(8, 6);
        target.clear([1, 2, 3]);
        let image = target.to_image();
        assert_eq!(image.dimensions(), (8, 6));
        assert_eq!(image.get_pixel(7, 5).0, [1, 2, 3]);
    }

    #[test]
    fn test_draw_emits_half_blocks() {
        let target = Framebuffer::new(3, 4);
        let mut out = Vec::new();
        target.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(HALF_BLOCK).count(), 6);
        // A uniform frame sets its colors once
        assert_eq!(text.matches("\x1b[38;2;").count(), 1);
    }
}
