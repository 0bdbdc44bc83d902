use super::mesh::Mesh;
use super::ray::Ray;
use glam::{Mat3, Mat4, Vec3};

const OBB_EPSILON: f32 = 1e-6;

/// Axis-aligned bounding box. The empty box has `min = +inf`, `max = -inf`
/// so that expanding it by any point yields that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for point in points {
            aabb.expand_by_point(point);
        }
        aabb
    }

    /// Union of every vertex of `mesh` transformed by `matrix`.
    pub fn from_mesh(mesh: &Mesh, matrix: Mat4) -> Self {
        Self::from_points(mesh.positions().iter().map(|p| matrix.transform_point3(*p)))
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand_by_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn half_size(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Corners in `(x, y, z)` bit order: bit 0 selects max x, bit 1 max y,
    /// bit 2 max z.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        })
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn contains_point_eps(&self, point: Vec3, eps: f32) -> bool {
        point.cmpge(self.min - Vec3::splat(eps)).all()
            && point.cmple(self.max + Vec3::splat(eps)).all()
    }

    pub fn translated(&self, offset: Vec3) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::new(self.min + offset, self.max + offset)
    }

    /// Bounds of the eight transformed corners.
    pub fn transformed(&self, matrix: Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::from_points(self.corners().into_iter().map(|c| matrix.transform_point3(c)))
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Slab test. Returns the entry distance along the ray, or zero when the
    /// origin is inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            if dir.abs() < f32::EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t1 = (self.min[axis] - origin) * inv;
            let mut t2 = (self.max[axis] - origin) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// Oriented bounding box: center, half extents along its own axes, and the
/// rotation whose columns are those axes in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub half_size: Vec3,
    pub rotation: Mat3,
}

impl Default for Obb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Obb {
    pub const EMPTY: Self = Self {
        center: Vec3::ZERO,
        half_size: Vec3::splat(-1.0),
        rotation: Mat3::IDENTITY,
    };

    pub fn new(center: Vec3, half_size: Vec3, rotation: Mat3) -> Self {
        Self {
            center,
            half_size,
            rotation,
        }
    }

    /// Builds the box from a local AABB placed by `matrix`.
    pub fn from_aabb(aabb: &Aabb, matrix: Mat4) -> Self {
        if aabb.is_empty() {
            return Self::EMPTY;
        }
        Self::new(aabb.center(), aabb.half_size(), Mat3::IDENTITY).transformed(matrix)
    }

    pub fn is_empty(&self) -> bool {
        self.half_size.x < 0.0 || self.half_size.y < 0.0 || self.half_size.z < 0.0
    }

    /// Applies `matrix`: axes rotated by its rotation, extents scaled by its
    /// scale, center moved by the full transform.
    pub fn transformed(&self, matrix: Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let (scale, rotation, _) = matrix.to_scale_rotation_translation();
        Self {
            center: matrix.transform_point3(self.center),
            half_size: self.half_size * scale.abs(),
            rotation: Mat3::from_quat(rotation) * self.rotation,
        }
    }

    pub fn axes(&self) -> [Vec3; 3] {
        [self.rotation.x_axis, self.rotation.y_axis, self.rotation.z_axis]
    }

    /// Corners in the same bit order as [`Aabb::corners`].
    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_size;
        std::array::from_fn(|i| {
            let local = Vec3::new(
                if i & 1 == 0 { -h.x } else { h.x },
                if i & 2 == 0 { -h.y } else { h.y },
                if i & 4 == 0 { -h.z } else { h.z },
            );
            self.center + self.rotation * local
        })
    }

    pub fn to_aabb(&self) -> Aabb {
        if self.is_empty() {
            return Aabb::EMPTY;
        }
        Aabb::from_points(self.corners())
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        if self.is_empty() {
            return false;
        }
        let local = self.rotation.transpose() * (point - self.center);
        local.abs().cmple(self.half_size + Vec3::splat(1e-4)).all()
    }

    /// Separating-axis test over the 15 candidate axes.
    pub fn intersects(&self, other: &Obb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let a = self.axes();
        let b = other.axes();
        let ea = self.half_size.to_array();
        let eb = other.half_size.to_array();

        let mut r = [[0.0_f32; 3]; 3];
        let mut abs_r = [[0.0_f32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                r[i][j] = a[i].dot(b[j]);
                abs_r[i][j] = r[i][j].abs() + OBB_EPSILON;
            }
        }

        let d = other.center - self.center;
        let t = [d.dot(a[0]), d.dot(a[1]), d.dot(a[2])];

        for i in 0..3 {
            let ra = ea[i];
            let rb = eb[0] * abs_r[i][0] + eb[1] * abs_r[i][1] + eb[2] * abs_r[i][2];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        for j in 0..3 {
            let ra = ea[0] * abs_r[0][j] + ea[1] * abs_r[1][j] + ea[2] * abs_r[2][j];
            let rb = eb[j];
            let tj = t[0] * r[0][j] + t[1] * r[1][j] + t[2] * r[2][j];
            if tj.abs() > ra + rb {
                return false;
            }
        }

        // a[i] x b[j]
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = ea[i1] * abs_r[i2][j] + ea[i2] * abs_r[i1][j];
                let rb = eb[j1] * abs_r[i][j2] + eb[j2] * abs_r[i][j1];
                let tl = t[i2] * r[i1][j] - t[i1] * r[i2][j];
                if tl.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }
}
