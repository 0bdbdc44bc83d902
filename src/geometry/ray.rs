use super::mesh::Mesh;
use glam::{Mat4, Vec3};

const TRIANGLE_EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero for a degenerate ray that hits nothing.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Double-sided Moller-Trumbore test. Returns the hit distance.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < TRIANGLE_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }

    /// Closest hit against `mesh` placed in the world by `matrix`.
    pub fn intersect_mesh(&self, mesh: &Mesh, matrix: Mat4) -> Option<f32> {
        mesh.triangles()
            .filter_map(|[a, b, c]| {
                self.intersect_triangle(
                    matrix.transform_point3(a),
                    matrix.transform_point3(b),
                    matrix.transform_point3(c),
                )
            })
            .min_by(f32::total_cmp)
    }

    /// Forward intersection with `plane`. A ray lying in the plane hits at
    /// its origin; a parallel ray off the plane misses.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return (plane.distance_to_point(self.origin).abs() < 1e-6).then_some(self.origin);
        }
        let t = -(plane.normal.dot(self.origin) + plane.constant) / denom;
        (t >= 0.0).then(|| self.at(t))
    }
}

/// Plane of points `p` with `normal . p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            constant,
        }
    }

    /// Horizontal plane `y = height`.
    pub fn ground(height: f32) -> Self {
        Self::new(Vec3::Y, -height)
    }

    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::{Plane, Ray};
    use crate::geometry::primitives::box_mesh;
    use glam::{Mat4, Vec3};

    #[test]
    fn triangle_hit_is_double_sided() {
        let (a, b, c) = (Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let front = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let back = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!((front.intersect_triangle(a, b, c).unwrap() - 5.0).abs() < 1e-5);
        assert!((back.intersect_triangle(a, b, c).unwrap() - 5.0).abs() < 1e-5);
        let miss = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(miss.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn triangle_behind_origin_is_ignored() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::NEG_Z);
        let hit = ray.intersect_triangle(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn mesh_hit_returns_nearest_face() {
        let mesh = box_mesh(Vec3::ONE);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = ray.intersect_mesh(&mesh, Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)));
        assert!((t.unwrap() - 7.5).abs() < 1e-4);
    }

    #[test]
    fn ground_plane_hits_and_misses() {
        let ground = Plane::ground(0.0);
        let down = Ray::new(Vec3::new(1.0, 4.0, 2.0), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(down.intersect_plane(&ground), Some(Vec3::new(1.0, 0.0, 2.0)));

        let up = Ray::new(Vec3::new(1.0, 4.0, 2.0), Vec3::Y);
        assert!(up.intersect_plane(&ground).is_none());

        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(parallel.intersect_plane(&ground).is_none());

        let raised = Plane::ground(2.0);
        let hit = down.intersect_plane(&raised).unwrap();
        assert!((hit.y - 2.0).abs() < 1e-6);
    }
}
