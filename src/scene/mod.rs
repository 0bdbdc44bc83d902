pub mod builders;
pub mod collision;
pub mod node;
pub mod overlay;

pub use collision::CollisionIndex;
pub use node::{NodeFlags, NodeId, SceneNode};
pub use overlay::{
    LineMaterial, LineTopology, OverlayConfig, OverlayShape, OverlayStyle, OverlayWeight,
    WireOverlay,
};

use crate::geometry::wireframe::{mesh_edges, CREASE_ANGLE_DEG};
use crate::geometry::{Aabb, Mesh};
use glam::{Mat4, Quat, Vec3};

/// Translation, rotation and scale of an object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Rotates about a world axis through the object's origin.
    pub fn rotate_world(&mut self, axis: Vec3, angle: f32) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        self.rotation = (Quat::from_axis_angle(axis, angle) * self.rotation).normalize();
    }
}

/// What an object draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ObjectContent {
    #[default]
    Empty,
    Mesh(Mesh),
    /// Line geometry. Excluded from bounds and picking.
    Lines(Vec<Vec3>),
}

/// A renderable object tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    pub name: String,
    pub transform: Transform,
    pub content: ObjectContent,
    pub children: Vec<Object>,
}

impl Object {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            content: ObjectContent::Mesh(mesh),
            ..Self::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn add(&mut self, child: Object) {
        self.children.push(child);
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.content {
            ObjectContent::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// True when no object in the tree has any content.
    pub fn is_empty(&self) -> bool {
        matches!(self.content, ObjectContent::Empty) && self.children.iter().all(Object::is_empty)
    }

    /// Visits every mesh in the tree with its matrix relative to `parent`.
    pub fn visit_meshes(&self, parent: Mat4, visit: &mut impl FnMut(&Mesh, Mat4)) {
        let matrix = parent * self.transform.matrix();
        if let ObjectContent::Mesh(mesh) = &self.content {
            visit(mesh, matrix);
        }
        for child in &self.children {
            child.visit_meshes(matrix, visit);
        }
    }

    /// Bounds in this object's own frame. Uses a mesh's cached bounds when it
    /// has them and walks vertices otherwise.
    pub fn local_bounds(&self) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        let mut include = |mesh: &Mesh, matrix: Mat4| {
            let mesh_bounds = match mesh.bounds() {
                Some(cached) => cached.transformed(matrix),
                None => Aabb::from_mesh(mesh, matrix),
            };
            bounds = bounds.union(&mesh_bounds);
        };
        if let ObjectContent::Mesh(mesh) = &self.content {
            include(mesh, Mat4::IDENTITY);
        }
        for child in &self.children {
            child.visit_meshes(Mat4::IDENTITY, &mut include);
        }
        bounds
    }

    /// Feature edges of every mesh in the tree, in this object's own frame.
    pub fn local_edges(&self) -> Vec<[Vec3; 2]> {
        let mut edges = Vec::new();
        let mut include = |mesh: &Mesh, matrix: Mat4| {
            edges.extend(mesh_edges(mesh, matrix, CREASE_ANGLE_DEG));
        };
        if let ObjectContent::Mesh(mesh) = &self.content {
            include(mesh, Mat4::IDENTITY);
        }
        for child in &self.children {
            child.visit_meshes(Mat4::IDENTITY, &mut include);
        }
        edges
    }

    /// Bounds of every transformed vertex when this object is placed by
    /// `matrix` instead of its own transform's parent chain.
    pub fn world_bounds(&self, parent: Mat4) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        self.visit_meshes(parent, &mut |mesh, matrix| {
            bounds = bounds.union(&Aabb::from_mesh(mesh, matrix));
        });
        bounds
    }

    /// Zeroes the translation of every object in the tree so loaded content
    /// sits at its node's origin.
    pub fn zero_translations(&mut self) {
        self.transform.translation = Vec3::ZERO;
        for child in &mut self.children {
            child.zero_translations();
        }
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Object::count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::{Object, ObjectContent, Transform};
    use crate::geometry::primitives::box_mesh;
    use crate::geometry::Mesh;
    use glam::{Mat4, Quat, Vec3};

    #[test]
    fn local_bounds_ignore_own_transform_and_lines() {
        let mut root = Object::from_mesh("root", box_mesh(Vec3::ONE))
            .with_transform(Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        root.add(Object {
            name: "guide".into(),
            content: ObjectContent::Lines(vec![Vec3::splat(-50.0), Vec3::splat(50.0)]),
            ..Object::default()
        });
        root.add(
            Object::from_mesh("child", box_mesh(Vec3::ONE))
                .with_transform(Transform::from_translation(Vec3::new(0.0, 2.0, 0.0))),
        );
        let bounds = root.local_bounds();
        assert_eq!(bounds.min, Vec3::splat(-0.5));
        assert_eq!(bounds.max, Vec3::new(0.5, 2.5, 0.5));
    }

    #[test]
    fn local_bounds_walk_vertices_without_cache() {
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0)], Vec::new());
        let bounds = Object::from_mesh("raw", mesh).local_bounds();
        assert_eq!(bounds.max, Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn local_edges_collect_children_in_the_root_frame() {
        let mut root = Object::from_mesh("root", box_mesh(Vec3::ONE))
            .with_transform(Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        root.add(
            Object::from_mesh("child", box_mesh(Vec3::ONE))
                .with_transform(Transform::from_translation(Vec3::new(0.0, 2.0, 0.0))),
        );
        let edges = root.local_edges();
        assert_eq!(edges.len(), 24);
        let bounds = root.local_bounds();
        assert!(edges
            .iter()
            .flatten()
            .all(|point| bounds.contains_point_eps(*point, 1e-5)));
    }

    #[test]
    fn world_bounds_follow_the_matrix() {
        let object = Object::from_mesh("box", box_mesh(Vec3::ONE));
        let bounds = object.world_bounds(Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0)));
        assert_eq!(bounds.center(), Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn zero_translations_recenters_whole_tree() {
        let mut root = Object::group("scene")
            .with_transform(Transform::from_rotation_translation(Quat::from_rotation_y(1.0), Vec3::X));
        root.add(Object::group("child").with_transform(Transform::from_translation(Vec3::Y)));
        root.zero_translations();
        assert_eq!(root.transform.translation, Vec3::ZERO);
        assert_eq!(root.children[0].transform.translation, Vec3::ZERO);
        assert_eq!(root.transform.rotation, Quat::from_rotation_y(1.0));
        assert!(root.is_empty());
        assert_eq!(root.count(), 2);
    }

    #[test]
    fn rotate_world_accumulates() {
        let mut transform = Transform::IDENTITY;
        transform.rotate_world(Vec3::Y, std::f32::consts::FRAC_PI_2);
        let rotated = transform.matrix().transform_vector3(Vec3::X);
        assert!((rotated - Vec3::NEG_Z).length() < 1e-5);
    }
}
