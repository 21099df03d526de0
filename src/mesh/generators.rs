//! Mesh generators for canonical solids.
//!
//! Every generator returns a [`MeshData`] whose channels agree on the vertex
//! count and whose triangles wind counter-clockwise when viewed from outside.
//! Degenerate parameters are rejected rather than clamped.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use super::data::{AttributeChannel, AttributeSemantic, IndexSequence, MeshData, VertexAttributeSet};
use crate::error::{ViewerError, ViewerResult};

/// Deepest octahedron subdivision accepted by [`subdivided_sphere`].
pub const MAX_SUBDIVISION_DEPTH: u32 = 8;

/// Per-face UVs shared by every cube face.
const FACE_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

fn positive(parameter: &'static str, value: f32) -> ViewerResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ViewerError::shape(
            parameter,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

fn at_least(parameter: &'static str, value: u32, min: u32) -> ViewerResult<()> {
    if value >= min {
        Ok(())
    } else {
        Err(ViewerError::shape(
            parameter,
            format!("must be at least {min}, got {value}"),
        ))
    }
}

/// Reject grids whose vertex count would not fit u32 indices.
fn grid_fits(rows: u32, columns: u32) -> ViewerResult<()> {
    let count = (rows as u64 + 1) * (columns as u64 + 1);
    if count > u32::MAX as u64 {
        return Err(ViewerError::shape(
            "grid",
            format!("{count} vertices exceed the u32 index range"),
        ));
    }
    Ok(())
}

fn pnu_attributes(positions: &[Vec3], normals: &[Vec3], uvs: &[Vec2]) -> VertexAttributeSet {
    VertexAttributeSet::new()
        .with_channel(AttributeChannel::from_vec3(AttributeSemantic::Position, positions))
        .with_channel(AttributeChannel::from_vec3(AttributeSemantic::Normal, normals))
        .with_channel(AttributeChannel::from_vec2(AttributeSemantic::TexCoord, uvs))
}

/// Generate a cube with the given edge length, centered at the origin.
///
/// Produces 24 vertices (4 per face, no sharing across faces so each face
/// keeps a flat normal) and 36 indices.
pub fn cube(size: f32) -> ViewerResult<MeshData> {
    positive("size", size)?;
    Ok(cuboid(Vec3::splat(size * 0.5))?.with_label("cube"))
}

/// Generate an axis-aligned box with the given half extents.
pub fn cuboid(half_extents: Vec3) -> ViewerResult<MeshData> {
    positive("half_extents.x", half_extents.x)?;
    positive("half_extents.y", half_extents.y)?;
    positive("half_extents.z", half_extents.z)?;

    let Vec3 {
        x: hx,
        y: hy,
        z: hz,
    } = half_extents;

    // 6 faces * 4 verts each, CCW when viewed from outside
    let faces: [(Vec3, [Vec3; 4]); 6] = [
        (
            Vec3::Z,
            [
                Vec3::new(-hx, -hy, hz),
                Vec3::new(hx, -hy, hz),
                Vec3::new(hx, hy, hz),
                Vec3::new(-hx, hy, hz),
            ],
        ),
        (
            Vec3::NEG_Z,
            [
                Vec3::new(hx, -hy, -hz),
                Vec3::new(-hx, -hy, -hz),
                Vec3::new(-hx, hy, -hz),
                Vec3::new(hx, hy, -hz),
            ],
        ),
        (
            Vec3::X,
            [
                Vec3::new(hx, -hy, hz),
                Vec3::new(hx, -hy, -hz),
                Vec3::new(hx, hy, -hz),
                Vec3::new(hx, hy, hz),
            ],
        ),
        (
            Vec3::NEG_X,
            [
                Vec3::new(-hx, -hy, -hz),
                Vec3::new(-hx, -hy, hz),
                Vec3::new(-hx, hy, hz),
                Vec3::new(-hx, hy, -hz),
            ],
        ),
        (
            Vec3::Y,
            [
                Vec3::new(-hx, hy, hz),
                Vec3::new(hx, hy, hz),
                Vec3::new(hx, hy, -hz),
                Vec3::new(-hx, hy, -hz),
            ],
        ),
        (
            Vec3::NEG_Y,
            [
                Vec3::new(-hx, -hy, -hz),
                Vec3::new(hx, -hy, -hz),
                Vec3::new(hx, -hy, hz),
                Vec3::new(-hx, -hy, hz),
            ],
        ),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (face, (normal, corners)) in faces.iter().enumerate() {
        positions.extend_from_slice(corners);
        normals.extend_from_slice(&[*normal; 4]);
        uvs.extend_from_slice(&FACE_UVS);

        let base = face as u32 * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Ok(MeshData::new(
        pnu_attributes(&positions, &normals, &uvs),
        IndexSequence::new(indices),
    )
    .with_label("cuboid"))
}

/// Generate a UV sphere.
///
/// Vertices lie on a `(stacks + 1) x (slices + 1)` grid. Row `i` has polar
/// angle `phi = (i / stacks - 0.5) * PI`, so rows 0 and `stacks` are the
/// poles; column `j` has azimuth `theta = j / slices * 2PI`. The seam column
/// is duplicated so UVs stay continuous.
///
/// # Arguments
///
/// * `stacks` - Number of latitude bands (at least 1)
/// * `slices` - Number of longitude bands (at least 1)
/// * `radius` - Sphere radius
pub fn uv_sphere(stacks: u32, slices: u32, radius: f32) -> ViewerResult<MeshData> {
    at_least("stacks", stacks, 1)?;
    at_least("slices", slices, 1)?;
    positive("radius", radius)?;
    grid_fits(stacks, slices)?;

    let columns = slices + 1;
    let vertex_count = (stacks as usize + 1) * columns as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let (sin_phi, cos_phi) = ((v - 0.5) * PI).sin_cos();

        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            let (sin_theta, cos_theta) = (u * TAU).sin_cos();

            let normal = Vec3::new(cos_phi * cos_theta, sin_phi, cos_phi * sin_theta);
            positions.push(normal * radius);
            normals.push(normal);
            uvs.push(Vec2::new(u, v));
        }
    }

    let mut indices = Vec::with_capacity(6 * stacks as usize * slices as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let i0 = i * columns + j;
            let i1 = i0 + 1;
            let i2 = i0 + columns;
            let i3 = i2 + 1;

            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    Ok(MeshData::new(
        pnu_attributes(&positions, &normals, &uvs),
        IndexSequence::new(indices),
    )
    .with_label("uv_sphere"))
}

/// Generate a torus around the Y axis.
///
/// Ring `i` sweeps the major circle (`u = i / rings * 2PI`), slice `j` sweeps
/// the tube (`v = j / slices * 2PI`).
///
/// # Arguments
///
/// * `radius` - Distance from the center to the middle of the tube
/// * `minor_radius` - Tube radius, strictly smaller than `radius`
/// * `rings` - Segments around the major circle (at least 3)
/// * `slices` - Segments around the tube (at least 3)
pub fn torus(radius: f32, minor_radius: f32, rings: u32, slices: u32) -> ViewerResult<MeshData> {
    positive("radius", radius)?;
    positive("minor_radius", minor_radius)?;
    if minor_radius >= radius {
        return Err(ViewerError::shape(
            "minor_radius",
            format!("must be smaller than radius {radius}, got {minor_radius}"),
        ));
    }
    at_least("rings", rings, 3)?;
    at_least("slices", slices, 3)?;
    grid_fits(rings, slices)?;

    let columns = slices + 1;
    let vertex_count = (rings as usize + 1) * columns as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for i in 0..=rings {
        let s = i as f32 / rings as f32;
        let (sin_u, cos_u) = (s * TAU).sin_cos();

        for j in 0..=slices {
            let t = j as f32 / slices as f32;
            let (sin_v, cos_v) = (t * TAU).sin_cos();

            let normal = Vec3::new(cos_v * cos_u, sin_v, cos_v * sin_u);
            let center = Vec3::new(radius * cos_u, 0.0, radius * sin_u);
            positions.push(center + normal * minor_radius);
            normals.push(normal);
            uvs.push(Vec2::new(s, t));
        }
    }

    let mut indices = Vec::with_capacity(6 * rings as usize * slices as usize);
    for i in 0..rings {
        for j in 0..slices {
            let i0 = i * columns + j;
            let i1 = i0 + 1;
            let i2 = i0 + columns;
            let i3 = i2 + 1;

            indices.extend_from_slice(&[i0, i1, i2, i1, i3, i2]);
        }
    }

    Ok(MeshData::new(
        pnu_attributes(&positions, &normals, &uvs),
        IndexSequence::new(indices),
    )
    .with_label("torus"))
}

const OCTAHEDRON_VERTICES: [Vec3; 6] = [
    Vec3::NEG_X,
    Vec3::NEG_Y,
    Vec3::X,
    Vec3::Y,
    Vec3::Z,
    Vec3::NEG_Z,
];

const OCTAHEDRON_FACES: [[u32; 3]; 8] = [
    [0, 1, 4],
    [1, 2, 4],
    [2, 3, 4],
    [3, 0, 4],
    [1, 0, 5],
    [2, 1, 5],
    [3, 2, 5],
    [0, 3, 5],
];

fn midpoint(
    directions: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    *cache.entry(key).or_insert_with(|| {
        let mid = (directions[a as usize] + directions[b as usize]).normalize();
        directions.push(mid);
        directions.len() as u32 - 1
    })
}

/// Generate a sphere by recursively subdividing an octahedron.
///
/// Each subdivision splits every triangle into four, sharing edge midpoints
/// between neighbours. Every vertex direction `d` is then scaled by
/// `radius_fn(d)`; normals are area-weighted face normals.
///
/// Produces `4 * 4^depth + 2` vertices and `24 * 4^depth` indices.
pub fn subdivided_sphere<F>(depth: u32, radius_fn: F) -> ViewerResult<MeshData>
where
    F: Fn(Vec3) -> f32,
{
    if depth > MAX_SUBDIVISION_DEPTH {
        return Err(ViewerError::shape(
            "depth",
            format!("must be at most {MAX_SUBDIVISION_DEPTH}, got {depth}"),
        ));
    }

    let mut directions = OCTAHEDRON_VERTICES.to_vec();
    let mut triangles = OCTAHEDRON_FACES.to_vec();

    for _ in 0..depth {
        let mut cache = HashMap::with_capacity(triangles.len() * 3 / 2);
        let mut next = Vec::with_capacity(triangles.len() * 4);

        for [a, b, c] in triangles {
            let ab = midpoint(&mut directions, &mut cache, a, b);
            let bc = midpoint(&mut directions, &mut cache, b, c);
            let ca = midpoint(&mut directions, &mut cache, c, a);

            next.push([a, ab, ca]);
            next.push([ab, b, bc]);
            next.push([bc, c, ca]);
            next.push([ab, bc, ca]);
        }
        triangles = next;
    }

    let mut positions = Vec::with_capacity(directions.len());
    for &d in &directions {
        let r = radius_fn(d);
        if !r.is_finite() || r < 0.0 {
            return Err(ViewerError::shape(
                "radius",
                format!("radius function returned {r} at {d}"),
            ));
        }
        positions.push(d * r);
    }

    let mut accumulated = vec![Vec3::ZERO; positions.len()];
    for &[a, b, c] in &triangles {
        let (pa, pb, pc) = (
            positions[a as usize],
            positions[b as usize],
            positions[c as usize],
        );
        let face_normal = (pb - pa).cross(pc - pa);
        for i in [a, b, c] {
            accumulated[i as usize] += face_normal;
        }
    }
    let normals: Vec<Vec3> = accumulated
        .iter()
        .zip(&directions)
        .map(|(n, d)| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                *d
            } else {
                n
            }
        })
        .collect();

    let attributes = VertexAttributeSet::new()
        .with_channel(AttributeChannel::from_vec3(AttributeSemantic::Position, &positions))
        .with_channel(AttributeChannel::from_vec3(AttributeSemantic::Normal, &normals));
    let indices = triangles.into_iter().flatten().collect();

    Ok(MeshData::new(attributes, IndexSequence::new(indices)).with_label("subdivided_sphere"))
}

/// Shape descriptor accepted by [`Shape::generate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Cube with the given edge length.
    Cube { size: f32 },
    /// Axis-aligned box with the given half extents.
    Cuboid { half_extents: Vec3 },
    /// Latitude/longitude sphere.
    UvSphere { stacks: u32, slices: u32, radius: f32 },
    /// Torus around the Y axis.
    Torus {
        radius: f32,
        minor_radius: f32,
        rings: u32,
        slices: u32,
    },
    /// Subdivided octahedron with constant radius.
    Geosphere { depth: u32, radius: f32 },
    /// Subdivided octahedron deformed by real spherical harmonics.
    Harmonic { depth: u32, coefficients: Vec<f32> },
}

impl Shape {
    /// Torus used when no other mesh is available.
    pub fn torus_fallback() -> Self {
        Shape::Torus {
            radius: 5.0,
            minor_radius: 1.0,
            rings: 100,
            slices: 20,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Cube { .. } => "cube",
            Shape::Cuboid { .. } => "cuboid",
            Shape::UvSphere { .. } => "uv_sphere",
            Shape::Torus { .. } => "torus",
            Shape::Geosphere { .. } => "geosphere",
            Shape::Harmonic { .. } => "harmonic",
        }
    }

    /// Generate the mesh for this shape.
    pub fn generate(&self) -> ViewerResult<MeshData> {
        let mesh = match self {
            Shape::Cube { size } => cube(*size)?,
            Shape::Cuboid { half_extents } => cuboid(*half_extents)?,
            Shape::UvSphere {
                stacks,
                slices,
                radius,
            } => uv_sphere(*stacks, *slices, *radius)?,
            Shape::Torus {
                radius,
                minor_radius,
                rings,
                slices,
            } => torus(*radius, *minor_radius, *rings, *slices)?,
            Shape::Geosphere { depth, radius } => {
                positive("radius", *radius)?;
                let radius = *radius;
                subdivided_sphere(*depth, |_| radius)?
            }
            Shape::Harmonic {
                depth,
                coefficients,
            } => super::harmonics::harmonic_sphere(*depth, coefficients)?,
        };

        log::debug!(
            "Generated {}: {} vertices, {} indices",
            self.name(),
            mesh.vertex_count()?,
            mesh.index_count()
        );
        Ok(mesh.with_label(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Twice the signed area of each triangle projected on the outward direction.
    fn outward_areas(mesh: &MeshData, outward: impl Fn([Vec3; 3]) -> Vec3) -> Vec<f32> {
        mesh.triangle_positions()
            .into_iter()
            .map(|tri| {
                let [a, b, c] = tri;
                (b - a).cross(c - a).dot(outward(tri))
            })
            .collect()
    }

    #[test]
    fn test_cube_counts() {
        let mesh = cube(2.0).unwrap();
        assert_eq!(mesh.vertex_count().unwrap(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert!(mesh.indices.max().unwrap() < 24);
        assert_eq!(mesh.label(), Some("cube"));
    }

    #[test]
    fn test_cube_winding_matches_face_normals() {
        let mesh = cube(1.0).unwrap();
        let normals = mesh.attributes.normals().unwrap();
        for [a, b, c] in mesh.indices.triangles() {
            let positions = mesh.attributes.positions().unwrap();
            let (pa, pb, pc) = (
                positions[a as usize],
                positions[b as usize],
                positions[c as usize],
            );
            let n = normals[a as usize];
            assert_eq!(n, normals[b as usize]);
            assert_eq!(n, normals[c as usize]);
            assert!((pb - pa).cross(pc - pa).dot(n) > 0.0);
        }
    }

    #[test]
    fn test_cube_uvs_unit_square() {
        let mesh = cube(3.0).unwrap();
        let uvs = mesh.attributes.uvs().unwrap();
        assert_eq!(uvs.len(), 24);
        assert!(uvs
            .iter()
            .all(|uv| (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)));
        assert_eq!(&uvs[4..8], &FACE_UVS);
    }

    #[test]
    fn test_cube_rejects_bad_size() {
        assert!(cube(0.0).is_err());
        assert!(cube(-1.0).is_err());
        assert!(cube(f32::NAN).is_err());
        assert!(cuboid(Vec3::new(1.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_uv_sphere_counts_and_radius() {
        let mesh = uv_sphere(4, 8, 2.5).unwrap();
        assert_eq!(mesh.vertex_count().unwrap(), 5 * 9);
        assert_eq!(mesh.index_count(), 6 * 4 * 8);

        let positions = mesh.attributes.positions().unwrap();
        let normals = mesh.attributes.normals().unwrap();
        for (p, n) in positions.iter().zip(normals) {
            assert!((p.length() - 2.5).abs() < 1e-5);
            assert!(n.abs_diff_eq(*p / 2.5, 1e-5));
        }
    }

    #[test]
    fn test_uv_sphere_first_quad_indices() {
        let mesh = uv_sphere(2, 3, 1.0).unwrap();
        // columns = 4: i0 = 0, i1 = 1, i2 = 4, i3 = 5
        assert_eq!(&mesh.indices.as_slice()[..6], &[0, 4, 1, 1, 4, 5]);
    }

    #[test]
    fn test_uv_sphere_winding_outward() {
        let mesh = uv_sphere(8, 16, 1.0).unwrap();
        for area in outward_areas(&mesh, |[a, b, c]| a + b + c) {
            // pole triangles are degenerate
            assert!(area > -1e-6);
        }
        assert!(outward_areas(&mesh, |[a, b, c]| a + b + c)
            .iter()
            .any(|&a| a > 1e-3));
    }

    #[test]
    fn test_uv_sphere_rejects_degenerate() {
        assert!(uv_sphere(0, 8, 1.0).is_err());
        assert!(uv_sphere(8, 0, 1.0).is_err());
        assert!(uv_sphere(8, 8, 0.0).is_err());
        assert!(uv_sphere(u32::MAX, u32::MAX, 1.0).is_err());
    }

    #[test]
    fn test_torus_counts_and_winding() {
        let mesh = torus(5.0, 1.0, 12, 6).unwrap();
        assert_eq!(mesh.vertex_count().unwrap(), 13 * 7);
        assert_eq!(mesh.index_count(), 6 * 12 * 6);

        let normals = mesh.attributes.normals().unwrap();
        for [a, b, c] in mesh.indices.triangles() {
            let positions = mesh.attributes.positions().unwrap();
            let (pa, pb, pc) = (
                positions[a as usize],
                positions[b as usize],
                positions[c as usize],
            );
            let n = normals[a as usize] + normals[b as usize] + normals[c as usize];
            assert!((pb - pa).cross(pc - pa).dot(n) > 0.0);
        }
    }

    #[test]
    fn test_torus_rejects_bad_parameters() {
        assert!(torus(1.0, 1.0, 12, 6).is_err());
        assert!(torus(5.0, 0.0, 12, 6).is_err());
        assert!(torus(5.0, 1.0, 2, 6).is_err());
        assert!(torus(5.0, 1.0, 12, 2).is_err());
    }

    #[test]
    fn test_subdivided_sphere_counts() {
        for depth in 0..4 {
            let mesh = subdivided_sphere(depth, |_| 1.0).unwrap();
            let scale = 4u32.pow(depth);
            assert_eq!(mesh.vertex_count().unwrap(), 4 * scale + 2);
            assert_eq!(mesh.index_count() as u32, 24 * scale);
        }
    }

    #[test]
    fn test_subdivided_sphere_outward() {
        let mesh = subdivided_sphere(2, |_| 3.0).unwrap();
        for p in mesh.attributes.positions().unwrap() {
            assert!((p.length() - 3.0).abs() < 1e-5);
        }
        for area in outward_areas(&mesh, |[a, b, c]| a + b + c) {
            assert!(area > 0.0);
        }
        let normals = mesh.attributes.normals().unwrap();
        let positions = mesh.attributes.positions().unwrap();
        for (n, p) in normals.iter().zip(positions) {
            assert!(n.dot(p.normalize()) > 0.9);
        }
    }

    #[test]
    fn test_subdivided_sphere_rejects_bad_input() {
        assert!(subdivided_sphere(MAX_SUBDIVISION_DEPTH + 1, |_| 1.0).is_err());
        assert!(subdivided_sphere(1, |_| -1.0).is_err());
        assert!(subdivided_sphere(1, |_| f32::INFINITY).is_err());
    }

    #[test]
    fn test_shape_generate() {
        let mesh = Shape::Cube { size: 1.0 }.generate().unwrap();
        assert_eq!(mesh.label(), Some("cube"));

        let mesh = Shape::torus_fallback().generate().unwrap();
        assert_eq!(mesh.vertex_count().unwrap(), 101 * 21);

        let mesh = Shape::Geosphere {
            depth: 1,
            radius: 2.0,
        }
        .generate()
        .unwrap();
        assert_eq!(mesh.vertex_count().unwrap(), 18);

        assert!(Shape::Geosphere {
            depth: 1,
            radius: 0.0
        }
        .generate()
        .is_err());
    }
}
