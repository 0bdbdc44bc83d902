use super::mesh::Mesh;
use glam::Vec3;

/// Box of `size` centered on the origin.
pub fn box_mesh(size: Vec3) -> Mesh {
    let s = size * 0.5;
    let positions = vec![
        Vec3::new(-s.x, -s.y, -s.z),
        Vec3::new(s.x, -s.y, -s.z),
        Vec3::new(s.x, s.y, -s.z),
        Vec3::new(-s.x, s.y, -s.z),
        Vec3::new(-s.x, -s.y, s.z),
        Vec3::new(s.x, -s.y, s.z),
        Vec3::new(s.x, s.y, s.z),
        Vec3::new(-s.x, s.y, s.z),
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 0, 3, 2,
        4, 5, 6, 4, 6, 7,
        0, 1, 5, 0, 5, 4,
        1, 2, 6, 1, 6, 5,
        2, 3, 7, 2, 7, 6,
        3, 0, 4, 3, 4, 7,
    ];
    Mesh::with_bounds(positions, indices)
}

/// Rectangle in the XY plane facing +Z, centered on the origin.
pub fn plane_mesh(width: f32, height: f32) -> Mesh {
    let (hx, hy) = (width * 0.5, height * 0.5);
    Mesh::with_bounds(
        vec![
            Vec3::new(-hx, -hy, 0.0),
            Vec3::new(hx, -hy, 0.0),
            Vec3::new(hx, hy, 0.0),
            Vec3::new(-hx, hy, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

/// UV sphere centered on the origin.
pub fn sphere_mesh(radius: f32, segments: u32, rings: u32) -> Mesh {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut positions = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    for ring in 0..=rings {
        let phi = std::f32::consts::PI * ring as f32 / rings as f32;
        for segment in 0..=segments {
            let theta = std::f32::consts::TAU * segment as f32 / segments as f32;
            positions.push(Vec3::new(
                -radius * theta.cos() * phi.sin(),
                radius * phi.cos(),
                radius * theta.sin() * phi.sin(),
            ));
        }
    }
    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;
            if ring != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if ring != rings - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }
    Mesh::with_bounds(positions, indices)
}
