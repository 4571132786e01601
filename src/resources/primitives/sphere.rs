use std::f32::consts::{PI, TAU};

use crate::render::vertex::{Triangle, Vertex};

/// Longitudinal segments.
pub const SPHERE_X_DIVISIONS: u16 = 32;
/// Latitudinal segments, pole to pole.
pub const SPHERE_Z_DIVISIONS: u16 = 16;

const TEXCOORD_S_SCALE: f32 = 4.0;
const TEXCOORD_T_SCALE: f32 = 2.0;

/// Sphere of `radius` centered on the origin, poles on the z axis.
///
/// Each longitude column stores its ring vertices from south to north
/// followed by its own south and north pole vertices, so texcoords can vary
/// per column at the poles. A final seam column duplicates the first ring
/// column with `s = 1`.
#[must_use]
pub fn create_sphere(radius: f32) -> (Vec<Vertex>, Vec<Triangle>) {
    let xdiv = SPHERE_X_DIVISIONS;
    let zdiv = SPHERE_Z_DIVISIONS;
    let dx = 1.0 / f32::from(xdiv);
    let dz = 1.0 / f32::from(zdiv);

    let vertex_count = usize::from(xdiv + 1) * usize::from(zdiv + 1) - 2;
    let mut vertices = Vec::with_capacity(vertex_count);

    for i in 0..xdiv {
        let s = f32::from(i) * dx;
        let (sin_phi, cos_phi) = (s * TAU).sin_cos();

        for j in 1..zdiv {
            let t = f32::from(j) * dz;
            let (sin_theta, cos_theta) = ((1.0 - t) * PI).sin_cos();
            let x = cos_phi * sin_theta;
            let y = sin_phi * sin_theta;
            let z = cos_theta;
            vertices.push(Vertex::new(
                [x * radius, y * radius, z * radius],
                [x, y, z],
                [-sin_phi, cos_phi, 0.0, 1.0],
                [s * TEXCOORD_S_SCALE, t * TEXCOORD_T_SCALE],
            ));
        }

        let tangent = [-sin_phi, cos_phi, 0.0, 1.0];
        vertices.push(Vertex::new(
            [0.0, 0.0, -radius],
            [0.0, 0.0, -1.0],
            tangent,
            [s * TEXCOORD_S_SCALE, 0.0],
        ));
        vertices.push(Vertex::new(
            [0.0, 0.0, radius],
            [0.0, 0.0, 1.0],
            tangent,
            [s * TEXCOORD_S_SCALE, TEXCOORD_T_SCALE],
        ));
    }

    // Seam column
    for j in 0..usize::from(zdiv - 1) {
        let mut vertex = vertices[j];
        vertex.texcoord[0] = TEXCOORD_S_SCALE;
        vertices.push(vertex);
    }

    let triangle_count = usize::from(xdiv) * usize::from(zdiv - 1) * 2;
    let mut triangles = Vec::with_capacity(triangle_count);
    let column = zdiv + 1;

    for i in 0..xdiv {
        let k = i * column;

        // South cap
        triangles.push(Triangle::new(k + zdiv - 1, k + column, k));

        for j in 0..zdiv - 2 {
            let a = k + j;
            let b = a + column;
            if (i + j) & 1 == 0 {
                triangles.push(Triangle::new(a, b, a + 1));
                triangles.push(Triangle::new(a + 1, b, b + 1));
            } else {
                triangles.push(Triangle::new(a, b, b + 1));
                triangles.push(Triangle::new(a, b + 1, a + 1));
            }
        }

        // North cap
        triangles.push(Triangle::new(k + zdiv - 2, k + zdiv * 2 - 1, k + zdiv));
    }

    (vertices, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn counts_match_divisions() {
        let (vertices, triangles) = create_sphere(1.0);
        assert_eq!(vertices.len(), 33 * 17 - 2);
        assert_eq!(triangles.len(), 32 * 15 * 2);
        assert!(
            triangles
                .iter()
                .all(|t| t.index.iter().all(|&i| usize::from(i) < vertices.len()))
        );
    }

    #[test]
    fn vertices_lie_on_radius() {
        let (vertices, _) = create_sphere(2.5);
        for v in &vertices {
            assert!((Vec3::from(v.position).length() - 2.5).abs() < 1e-4);
            assert!((Vec3::from(v.normal).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn triangles_face_outward() {
        let (vertices, triangles) = create_sphere(1.0);
        for tri in &triangles {
            let [a, b, c] = tri.index.map(|i| Vec3::from(vertices[usize::from(i)].position));
            let n = (b - a).cross(c - a);
            assert!(n.dot(a + b + c) > 0.0);
        }
    }
}
