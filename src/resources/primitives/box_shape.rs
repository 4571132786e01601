use glam::Vec3;

use crate::render::vertex::{Triangle, Vertex};

struct Face {
    /// Corners in units of the box size, counter-clockwise seen from outside.
    corners: [[f32; 3]; 4],
    normal: [f32; 3],
    tangent: [f32; 4],
    /// Size components scaling the (u, v) texcoords.
    uv_axes: (usize, usize),
}

const FACES: [Face; 6] = [
    // +X
    Face {
        corners: [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
        normal: [1.0, 0.0, 0.0],
        tangent: [0.0, 1.0, 0.0, 1.0],
        uv_axes: (1, 2),
    },
    // +Y
    Face {
        corners: [[1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
        normal: [0.0, 1.0, 0.0],
        tangent: [-1.0, 0.0, 0.0, 1.0],
        uv_axes: (0, 2),
    },
    // -X
    Face {
        corners: [[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0]],
        normal: [-1.0, 0.0, 0.0],
        tangent: [0.0, -1.0, 0.0, 1.0],
        uv_axes: (1, 2),
    },
    // -Y
    Face {
        corners: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
        normal: [0.0, -1.0, 0.0],
        tangent: [1.0, 0.0, 0.0, 1.0],
        uv_axes: (0, 2),
    },
    // +Z
    Face {
        corners: [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
        normal: [0.0, 0.0, 1.0],
        tangent: [1.0, 0.0, 0.0, 1.0],
        uv_axes: (0, 1),
    },
    // -Z
    Face {
        corners: [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        normal: [0.0, 0.0, -1.0],
        tangent: [-1.0, 0.0, 0.0, 1.0],
        uv_axes: (0, 1),
    },
];

const CORNER_UV: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Box spanning `0..size` with the origin at its minimum corner.
///
/// 24 vertices (4 per face, flat normals) and 12 triangles. Texcoords are
/// measured in world units, so textures tile at a constant density.
#[must_use]
pub fn create_box(size: Vec3) -> (Vec<Vertex>, Vec<Triangle>) {
    let mut vertices = Vec::with_capacity(24);
    let mut triangles = Vec::with_capacity(12);

    for face in &FACES {
        let base = vertices.len() as u16;
        let (u_axis, v_axis) = face.uv_axes;
        for (corner, uv) in face.corners.iter().zip(CORNER_UV) {
            let position = Vec3::from(*corner) * size;
            vertices.push(Vertex::new(
                position.to_array(),
                face.normal,
                face.tangent,
                [uv[0] * size[u_axis], uv[1] * size[v_axis]],
            ));
        }
        triangles.push(Triangle::new(base, base + 1, base + 2));
        triangles.push(Triangle::new(base, base + 2, base + 3));
    }

    (vertices, triangles)
}
