//! CPU ray picking
//!
//! Each tick one ray is cast from the pointer through the camera and tested
//! against every node's triangle content. Results live only in the nodes'
//! `ray_casted` and `hovered` flags; no hit data is kept between ticks.
//!
//! ## What is tested
//!
//! A node is hit when the ray crosses its root object's own mesh or any mesh
//! further down its object tree. Line content and overlays are never tested.

use crate::geometry::Ray;
use crate::scene::{Object, ObjectContent, SceneNode};
use glam::Mat4;

// ========================================================================
// Hit tests
// ========================================================================

/// True when `ray` hits any triangle of `node`'s content.
pub fn node_hit(node: &SceneNode, ray: &Ray) -> bool {
    if node.bounding_box_world().intersect_ray(ray).is_none() {
        return false;
    }
    let root = node.object();
    let matrix = node.world_matrix();
    root_hit(root, matrix, ray) || subtree_hit(root, Mat4::IDENTITY, ray)
}

/// The root object's own mesh, children excluded.
fn root_hit(root: &Object, matrix: Mat4, ray: &Ray) -> bool {
    match &root.content {
        ObjectContent::Mesh(mesh) => ray.intersect_mesh(mesh, matrix).is_some(),
        _ => false,
    }
}

/// Every mesh in the tree, each tested on its own.
fn subtree_hit(object: &Object, parent: Mat4, ray: &Ray) -> bool {
    let matrix = parent * object.transform.matrix();
    if let ObjectContent::Mesh(mesh) = &object.content {
        if ray.intersect_mesh(mesh, matrix).is_some() {
            return true;
        }
    }
    object
        .children
        .iter()
        .any(|child| subtree_hit(child, matrix, ray))
}

// ========================================================================
// PickingEngine: per-tick flag update
// ========================================================================

#[derive(Debug, Default)]
pub struct PickingEngine {
    last_hit_count: usize,
}

impl PickingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `ray_casted` on every node and moves hover in or out. Selected
    /// nodes keep their hover flag while the pointer is elsewhere.
    pub fn update(&mut self, ray: &Ray, nodes: &mut [SceneNode]) -> usize {
        let mut hits = 0;
        for node in nodes.iter_mut() {
            let hit = node_hit(node, ray);
            node.set_ray_casted(hit);
            if hit {
                hits += 1;
                if !node.is_selected() && !node.is_hovered() {
                    node.set_hovered(true);
                }
            } else if !node.is_selected() && node.is_hovered() {
                node.set_hovered(false);
            }
        }
        self.last_hit_count = hits;
        hits
    }

    pub fn last_hit_count(&self) -> usize {
        self.last_hit_count
    }
}

// ========================================================================
// Tests
// ========================================================================

#[cfg(test)]
mod tests {
    use super::{node_hit, PickingEngine};
    use crate::geometry::primitives::box_mesh;
    use crate::geometry::Ray;
    use crate::scene::{Object, ObjectContent, SceneNode, Transform};
    use glam::Vec3;

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y)
    }

    #[test]
    fn ray_through_center_hits_and_offset_ray_misses() {
        let node = SceneNode::from_mesh("cube", box_mesh(Vec3::ONE));
        assert!(node_hit(&node, &down_ray(0.0, 0.0)));
        assert!(!node_hit(&node, &down_ray(3.0, 0.0)));
    }

    #[test]
    fn nested_meshes_are_hit_in_world_space() {
        let mut root = Object::group("group")
            .with_transform(Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        root.add(
            Object::from_mesh("leg", box_mesh(Vec3::ONE))
                .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, 2.0))),
        );
        let node = SceneNode::new(Some(root));
        assert!(node_hit(&node, &down_ray(5.0, 2.0)));
        assert!(!node_hit(&node, &down_ray(0.0, 2.0)));
        assert!(!node_hit(&node, &down_ray(5.0, 0.0)));
    }

    #[test]
    fn line_content_is_not_pickable() {
        let mut root = Object::group("guides");
        root.add(Object {
            name: "line".into(),
            content: ObjectContent::Lines(vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]),
            ..Object::default()
        });
        let node = SceneNode::new(Some(root));
        assert!(!node_hit(&node, &down_ray(0.0, 0.0)));
    }

    #[test]
    fn hover_follows_the_ray_unless_selected() {
        let mut nodes = vec![SceneNode::from_mesh("cube", box_mesh(Vec3::ONE))];
        let mut picking = PickingEngine::new();

        assert_eq!(picking.update(&down_ray(0.0, 0.0), &mut nodes), 1);
        assert!(nodes[0].is_ray_casted());
        assert!(nodes[0].is_hovered());

        picking.update(&down_ray(4.0, 0.0), &mut nodes);
        assert!(!nodes[0].is_ray_casted());
        assert!(!nodes[0].is_hovered());

        // A selected node keeps its hover state when the pointer leaves.
        picking.update(&down_ray(0.0, 0.0), &mut nodes);
        nodes[0].set_selected(true);
        picking.update(&down_ray(4.0, 0.0), &mut nodes);
        assert!(nodes[0].is_hovered());
        assert_eq!(picking.last_hit_count(), 0);
    }

    #[test]
    fn empty_nodes_are_never_hit() {
        let mut nodes = vec![SceneNode::empty()];
        assert_eq!(PickingEngine::new().update(&down_ray(0.0, 0.0), &mut nodes), 0);
        assert!(!nodes[0].is_hovered());
    }
}
