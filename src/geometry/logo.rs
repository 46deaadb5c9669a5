//! Extruded "V" logo mesh
//!
//! The outline is two asymmetric arms that meet near the bottom without
//! touching. Each arm is a triangular prism, so the mesh is two closed solids
//! made of flat-shaded triangles.

use glam::{Vec2, Vec3};

use crate::renderer::vertex::LogoVertex;

/// Extrusion depth along Z
pub const LOGO_DEPTH: f32 = 0.3;
/// Uniform scale applied to the outline
pub const LOGO_SCALE: f32 = 0.6;

/// Number of triangles in the generated mesh
pub const LOGO_TRIANGLES: usize = 16;

/// Outline key points, before scaling
const OUTLINE: [Vec2; 6] = [
    Vec2::new(-1.5, 1.0), // 0: top left outer
    Vec2::new(-0.5, 1.0), // 1: top left inner
    Vec2::new(-0.2, -1.0), // 2: bottom center left
    Vec2::new(1.5, 1.0),  // 3: top right outer
    Vec2::new(0.5, 1.0),  // 4: top right inner
    Vec2::new(0.2, -1.0), // 5: bottom center right
];

/// Flat-shaded triangle list builder
struct MeshBuilder {
    vertices: Vec<LogoVertex>,
}

impl MeshBuilder {
    fn with_triangles(count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(count * 3),
        }
    }

    /// Push a triangle whose normal follows the right-hand rule on (p1, p2, p3)
    fn triangle(&mut self, p1: Vec3, p2: Vec3, p3: Vec3) {
        // Outline points never coincide, so the cross product is non-zero
        let normal = (p2 - p1).cross(p3 - p1).normalize();
        self.vertices.extend([
            LogoVertex::new(p1, normal),
            LogoVertex::new(p2, normal),
            LogoVertex::new(p3, normal),
        ]);
    }

    /// Two triangles covering the side wall between outline points `a` and `b`.
    ///
    /// Walking from `a` to `b` with the solid on the left gives an outward wall.
    fn wall(&mut self, a: usize, b: usize) {
        let (af, ab) = (front(a), back(a));
        let (bf, bb) = (front(b), back(b));
        self.triangle(af, ab, bf);
        self.triangle(ab, bb, bf);
    }

    fn finish(self) -> Vec<LogoVertex> {
        self.vertices
    }
}

fn front(i: usize) -> Vec3 {
    (OUTLINE[i] * LOGO_SCALE).extend(LOGO_DEPTH / 2.0)
}

fn back(i: usize) -> Vec3 {
    (OUTLINE[i] * LOGO_SCALE).extend(-LOGO_DEPTH / 2.0)
}

/// Build the logo as a triangle list with per-triangle normals.
///
/// Triangles wind counter-clockwise when seen from outside the solid.
pub fn generate_logo_mesh() -> Vec<LogoVertex> {
    let mut mesh = MeshBuilder::with_triangles(LOGO_TRIANGLES);

    // Front caps
    mesh.triangle(front(0), front(2), front(1));
    mesh.triangle(front(3), front(4), front(5));

    // Back caps, reversed
    mesh.triangle(back(0), back(1), back(2));
    mesh.triangle(back(3), back(5), back(4));

    // Left arm: outer, inner, top
    mesh.wall(0, 2);
    mesh.wall(2, 1);
    mesh.wall(1, 0);

    // Right arm: outer, inner, top
    mesh.wall(5, 3);
    mesh.wall(4, 5);
    mesh.wall(3, 4);

    mesh.finish()
}
