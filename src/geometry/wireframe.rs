use super::bounds::Aabb;
use super::mesh::Mesh;
use glam::{Mat4, Vec3};
use std::collections::HashMap;

pub const STRIP_POINTS: usize = 16;

/// Faces meeting at more than this angle keep their shared edge.
pub const CREASE_ANGLE_DEG: f32 = 1.0;

/// Vertices closer than 1 / WELD_SCALE on every axis share an edge key.
const WELD_SCALE: f32 = 1e4;

type VertexKey = [i64; 3];

/// Connected polyline over all twelve edges of `aabb`.
///
/// Walks the front face (z = min), crosses to the back face (z = max), closes
/// it, then zig-zags across the three remaining connecting edges. A cube has
/// eight odd-degree vertices, so three back/front edges are traversed twice.
pub fn wireframe_strip(aabb: &Aabb) -> [Vec3; STRIP_POINTS] {
    let (lo, hi) = (aabb.min, aabb.max);
    let a0 = Vec3::new(lo.x, lo.y, lo.z);
    let a1 = Vec3::new(hi.x, lo.y, lo.z);
    let a2 = Vec3::new(hi.x, hi.y, lo.z);
    let a3 = Vec3::new(lo.x, hi.y, lo.z);
    let b0 = Vec3::new(lo.x, lo.y, hi.z);
    let b1 = Vec3::new(hi.x, lo.y, hi.z);
    let b2 = Vec3::new(hi.x, hi.y, hi.z);
    let b3 = Vec3::new(lo.x, hi.y, hi.z);
    [
        a0, a1, a2, a3, a0, // front
        b0, b1, b2, b3, b0, // back
        b1, a1, a2, b2, b3, a3,
    ]
}

/// Consecutive point pairs of a strip, for backends that draw segment lists.
pub fn strip_segments(strip: &[Vec3]) -> Vec<(Vec3, Vec3)> {
    strip.windows(2).map(|w| (w[0], w[1])).collect()
}

struct EdgeEntry {
    ends: [Vec3; 2],
    normal: Vec3,
    faces: u32,
    crease: bool,
}

/// Feature edges of `mesh` placed by `matrix`: edges bordering a single face
/// and edges whose two faces meet at more than `crease_angle_deg`. Edges are
/// matched by welded position, so split vertices still pair up.
pub fn mesh_edges(mesh: &Mesh, matrix: Mat4, crease_angle_deg: f32) -> Vec<[Vec3; 2]> {
    let threshold = crease_angle_deg.to_radians().cos();
    let mut lookup: HashMap<(VertexKey, VertexKey), usize> = HashMap::new();
    let mut entries: Vec<EdgeEntry> = Vec::new();

    for triangle in mesh.triangles() {
        let [a, b, c] = triangle.map(|p| matrix.transform_point3(p));
        let Some(normal) = (b - a).cross(c - a).try_normalize() else {
            continue;
        };
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let (kp, kq) = (weld_key(p), weld_key(q));
            if kp == kq {
                continue;
            }
            let key = if kp <= kq { (kp, kq) } else { (kq, kp) };
            match lookup.get(&key) {
                Some(&index) => {
                    let entry = &mut entries[index];
                    entry.faces += 1;
                    if entry.normal.dot(normal) <= threshold {
                        entry.crease = true;
                    }
                }
                None => {
                    lookup.insert(key, entries.len());
                    entries.push(EdgeEntry {
                        ends: [p, q],
                        normal,
                        faces: 1,
                        crease: false,
                    });
                }
            }
        }
    }

    entries
        .into_iter()
        .filter(|entry| entry.faces == 1 || entry.crease)
        .map(|entry| entry.ends)
        .collect()
}

fn weld_key(p: Vec3) -> VertexKey {
    p.to_array().map(|v| (v * WELD_SCALE).round() as i64)
}
