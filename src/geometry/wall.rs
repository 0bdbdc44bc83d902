use super::mesh::Mesh;
use glam::{Mat2, Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

const COLLINEAR_EPSILON: f32 = 1e-6;

/// Extruded wall ready to be placed with [`WallGeometry::rotation`] at
/// [`WallGeometry::world_center`].
#[derive(Debug, Clone, PartialEq)]
pub struct WallGeometry {
    pub mesh: Mesh,
    pub world_center: Vec3,
    /// Angle of the 4 -> 5 edge in the footprint plane, radians.
    pub alignment_angle: f32,
}

impl WallGeometry {
    /// `Euler(pi/2, 0, angle)` in XYZ order: stands the extrusion up and
    /// undoes the footprint alignment.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_z(self.alignment_angle)
    }
}

/// Builds a straight wall from a six-point footprint. The footprint is
/// rotated so edge 4 -> 5 runs along +X, extruded along local +Z by `depth`
/// and centered on its bounding box.
pub fn straight_wall(points: &[Vec2; 6], depth: f32) -> WallGeometry {
    let edge = points[5] - points[4];
    let alignment_angle = edge.y.atan2(edge.x);
    let unrotate = Mat2::from_angle(-alignment_angle);
    let footprint: Vec<Vec2> = points.iter().map(|p| unrotate * *p).collect();

    let mut mesh = extrude(&footprint, depth);
    mesh.center();

    let mid = (points[0] + points[3]) * 0.5;
    WallGeometry {
        mesh,
        world_center: Vec3::new(mid.x, depth * 0.5, mid.y),
        alignment_angle,
    }
}

/// Footprints of the four walls of a square room whose inner faces sit at
/// `start` from the origin.
pub fn room_walls(start: f32, thickness: f32) -> [[Vec2; 6]; 4] {
    let mid = start + thickness / 2.0;
    let end = start + thickness;
    let v = Vec2::new;
    [
        [v(-mid, mid), v(-start, start), v(start, start), v(mid, mid), v(end, end), v(-end, end)],
        [v(-mid, -mid), v(-start, -start), v(-start, start), v(-mid, mid), v(-end, end), v(-end, -end)],
        [v(mid, -mid), v(start, -start), v(-start, -start), v(-mid, -mid), v(-end, -end), v(end, -end)],
        [v(mid, mid), v(start, start), v(start, -start), v(mid, -mid), v(end, -end), v(end, end)],
    ]
}

/// Extrudes a simple polygon from z = 0 to z = `depth`. Side faces wind
/// outward and the caps face -Z and +Z.
pub fn extrude(polygon: &[Vec2], depth: f32) -> Mesh {
    let n = polygon.len();
    if n < 3 {
        return Mesh::with_bounds(Vec::new(), Vec::new());
    }
    let mut ring: Vec<u32> = (0..n as u32).collect();
    if signed_area(polygon) < 0.0 {
        ring.reverse();
    }

    let mut positions = Vec::with_capacity(n * 2);
    positions.extend(polygon.iter().map(|p| p.extend(0.0)));
    positions.extend(polygon.iter().map(|p| p.extend(depth)));

    let top = n as u32;
    let mut indices = Vec::new();
    for tri in triangulate(polygon) {
        indices.extend_from_slice(&[tri[0], tri[2], tri[1]]);
        indices.extend_from_slice(&[tri[0] + top, tri[1] + top, tri[2] + top]);
    }
    for (k, &i) in ring.iter().enumerate() {
        let j = ring[(k + 1) % n];
        indices.extend_from_slice(&[i, j, j + top, i, j + top, i + top]);
    }
    Mesh::with_bounds(positions, indices)
}

/// Ear-clipping triangulation of a simple polygon. Triangles are returned
/// counter-clockwise regardless of the input winding.
pub fn triangulate(polygon: &[Vec2]) -> Vec<[u32; 3]> {
    let mut ring: Vec<usize> = (0..polygon.len()).collect();
    if signed_area(polygon) < 0.0 {
        ring.reverse();
    }
    strip_collinear(polygon, &mut ring);

    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    while ring.len() > 3 {
        let count = ring.len();
        let ear = (0..count).find(|&k| {
            let a = polygon[ring[(k + count - 1) % count]];
            let b = polygon[ring[k]];
            let c = polygon[ring[(k + 1) % count]];
            if cross(a, b, c) <= COLLINEAR_EPSILON {
                return false;
            }
            ring.iter()
                .filter(|&&idx| ![a, b, c].contains(&polygon[idx]))
                .all(|&idx| !point_in_triangle(polygon[idx], a, b, c))
        });
        let Some(k) = ear else {
            break;
        };
        let prev = ring[(k + count - 1) % count];
        let next = ring[(k + 1) % count];
        triangles.push([prev as u32, ring[k] as u32, next as u32]);
        ring.remove(k);
    }
    // Fan whatever is left if clipping stalled on bad input.
    for k in 1..ring.len().saturating_sub(1) {
        triangles.push([ring[0] as u32, ring[k] as u32, ring[k + 1] as u32]);
    }
    triangles
}

fn strip_collinear(polygon: &[Vec2], ring: &mut Vec<usize>) {
    loop {
        let count = ring.len();
        if count <= 3 {
            return;
        }
        let found = (0..count).find(|&k| {
            let a = polygon[ring[(k + count - 1) % count]];
            let b = polygon[ring[k]];
            let c = polygon[ring[(k + 1) % count]];
            cross(a, b, c).abs() <= COLLINEAR_EPSILON
        });
        match found {
            Some(k) => {
                ring.remove(k);
            }
            None => return,
        }
    }
}

fn signed_area(polygon: &[Vec2]) -> f32 {
    let n = polygon.len();
    (0..n)
        .map(|i| polygon[i].perp_dot(polygon[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

fn cross(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - b)
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

#[cfg(test)]
mod tests {
    use super::{extrude, room_walls, signed_area, straight_wall, triangulate};
    use glam::{Vec2, Vec3};

    /// 4 x 1 wall along +X. Points 0 and 3 sit mid-thickness at either end
    /// and edge 4 -> 5 is the outer face.
    fn footprint() -> [Vec2; 6] {
        [
            Vec2::new(4.0, 0.5),
            Vec2::new(4.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 0.5),
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
        ]
    }

    /// World (x, z) of every bottom-ring vertex once the wall is placed.
    fn placed_footprint(wall: &super::WallGeometry, count: usize) -> Vec<Vec2> {
        let rotation = wall.rotation();
        wall.mesh.positions()[..count]
            .iter()
            .map(|p| {
                let world = rotation * *p + wall.world_center;
                Vec2::new(world.x, world.z)
            })
            .collect()
    }

    fn triangulated_area(polygon: &[Vec2]) -> f32 {
        triangulate(polygon)
            .iter()
            .map(|t| {
                let (a, b, c) = (polygon[t[0] as usize], polygon[t[1] as usize], polygon[t[2] as usize]);
                (b - a).perp_dot(c - a) * 0.5
            })
            .sum()
    }

    #[test]
    fn triangulation_covers_polygon_area() {
        let poly = footprint();
        assert!((triangulated_area(&poly) - 4.0).abs() < 1e-4);

        let concave = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 2.0),
        ];
        assert!((triangulated_area(&concave) - signed_area(&concave)).abs() < 1e-4);

        let mut clockwise = concave;
        clockwise.reverse();
        assert!((triangulated_area(&clockwise) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn axis_aligned_wall_keeps_its_footprint() {
        let points = footprint();
        let wall = straight_wall(&points, 3.0);
        assert_eq!(wall.alignment_angle, 0.0);
        assert_eq!(wall.world_center, Vec3::new(2.0, 1.5, 0.5));

        let bounds = wall.mesh.bounds().unwrap();
        assert!((bounds.size() - Vec3::new(4.0, 1.0, 3.0)).abs().max_element() < 1e-5);
        assert!(bounds.center().abs().max_element() < 1e-5);

        // Bottom ring is the input shifted by the centering offset.
        let offset = Vec2::new(2.0, 0.5);
        let bottom: Vec<Vec2> = wall.mesh.positions()[..6]
            .iter()
            .map(|p| p.truncate())
            .collect();
        for (got, want) in bottom.iter().zip(points.iter()) {
            assert!((*got - (*want - offset)).length() < 1e-5);
        }
    }

    #[test]
    fn placed_wall_lands_on_its_footprint() {
        let points = footprint();
        let wall = straight_wall(&points, 3.0);
        for (got, want) in placed_footprint(&wall, 6).iter().zip(points.iter()) {
            assert!((*got - *want).length() < 1e-4, "{got:?} != {want:?}");
        }

        for points in room_walls(10.0, 0.5) {
            let wall = straight_wall(&points, 4.0);
            for (got, want) in placed_footprint(&wall, 6).iter().zip(points.iter()) {
                assert!((*got - *want).length() < 1e-3, "{got:?} != {want:?}");
            }
        }
    }

    #[test]
    fn diagonal_wall_reports_edge_angle_and_is_aligned() {
        let points = [
            Vec2::new(-3.5, 1.0),
            Vec2::new(-3.0, 1.0),
            Vec2::new(-1.0, 3.0),
            Vec2::new(-1.0, 3.5),
            Vec2::new(-1.0, 4.0),
            Vec2::new(-4.0, 1.0),
        ];
        let wall = straight_wall(&points, 4.0);
        let expected = (-3.0_f32).atan2(-3.0);
        assert!((wall.alignment_angle - expected).abs() < 1e-6);
        assert!((wall.world_center - Vec3::new(-2.25, 2.0, 2.25)).length() < 1e-5);

        // Edge 4 -> 5 now runs along the X axis.
        let (p4, p5) = (wall.mesh.positions()[4], wall.mesh.positions()[5]);
        assert!((p5.y - p4.y).abs() < 1e-5);
        assert!((p5 - p4).length() > 4.0);
    }

    #[test]
    fn placed_wall_stands_on_the_ground() {
        let wall = straight_wall(&footprint(), 3.0);
        let rotation = wall.rotation();
        let lowest = wall
            .mesh
            .positions()
            .iter()
            .map(|p| (rotation * *p + wall.world_center).y)
            .fold(f32::INFINITY, f32::min);
        assert!(lowest.abs() < 1e-4);
    }

    #[test]
    fn extrusion_has_caps_and_sides() {
        let square = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        let mesh = extrude(&square, 2.0);
        assert_eq!(mesh.positions().len(), 8);
        assert_eq!(mesh.triangle_count(), 2 + 2 + 8);
    }

    #[test]
    fn room_walls_are_symmetric() {
        let walls = room_walls(10.0, 0.5);
        for wall in walls {
            let geometry = straight_wall(&wall, 4.0);
            assert_eq!(geometry.mesh.positions().len(), 12);
        }
        assert_eq!(walls[0][4], Vec2::new(10.5, 10.5));
        assert_eq!(walls[2][5], Vec2::new(10.5, -10.5));
        // Opposite walls are aligned with opposite edge directions.
        let north = straight_wall(&walls[0], 4.0);
        let south = straight_wall(&walls[2], 4.0);
        assert!((north.alignment_angle.abs() - std::f32::consts::PI).abs() < 1e-5);
        assert!(south.alignment_angle.abs() < 1e-5);
    }
}
