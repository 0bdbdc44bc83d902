//! Ready-made nodes for the editor's insert actions.

use super::node::SceneNode;
use super::overlay::{OverlayShape, OverlayStyle};
use super::{Object, Transform};
use crate::geometry::primitives::{box_mesh, plane_mesh, sphere_mesh};
use crate::geometry::{room_walls, straight_wall, subtract_solid, PlacedMesh, SolidModeler};
use glam::{Mat4, Vec2, Vec3};

pub const ROOM_WALL_HEIGHT: f32 = 4.0;

/// Lifts a node so its world box rests on `y = 0`.
pub fn sit_on_ground(node: &mut SceneNode) {
    let size = node.bounding_box_world().size();
    let mut position = node.position();
    position.y = size.y / 2.0;
    node.set_position(position);
    node.refresh_bounds();
}

/// Straight wall oriented upright and placed at its footprint center. Its
/// overlay outlines the wall's own edges rather than its box.
pub fn wall_node(points: &[Vec2; 6], depth: f32, style: OverlayStyle) -> SceneNode {
    let wall = straight_wall(points, depth);
    let transform = Transform::from_rotation_translation(wall.rotation(), wall.world_center);
    let object = Object::from_mesh("wall", wall.mesh).with_transform(transform);
    let mut node = SceneNode::with_style(Some(object), style);
    node.set_overlay_shape(OverlayShape::Edges);
    node
}

/// The four walls of a square room.
pub fn room_nodes(start: f32, thickness: f32, style: OverlayStyle) -> Vec<SceneNode> {
    room_walls(start, thickness)
        .iter()
        .map(|points| wall_node(points, ROOM_WALL_HEIGHT, style))
        .collect()
}

pub fn box_node(size: Vec3, style: OverlayStyle) -> SceneNode {
    let mut node = SceneNode::with_style(Some(Object::from_mesh("box", box_mesh(size))), style);
    sit_on_ground(&mut node);
    node
}

/// Upright square panel standing on the ground.
pub fn mirror_node(width: f32, height: f32, style: OverlayStyle) -> SceneNode {
    let object = Object::from_mesh("mirror", plane_mesh(width, height));
    let mut node = SceneNode::with_style(Some(object), style);
    sit_on_ground(&mut node);
    node
}

/// A thin block with a spherical hole punched through both faces.
pub fn hole_wall_node(modeler: &dyn SolidModeler, style: OverlayStyle) -> SceneNode {
    let base = box_mesh(Vec3::new(0.3, 0.3, 1.0));
    let tools = [
        PlacedMesh::new(sphere_mesh(0.2, 32, 16), Mat4::from_translation(Vec3::new(0.0, 0.0, 0.2))),
        PlacedMesh::new(sphere_mesh(0.2, 32, 16), Mat4::from_translation(Vec3::new(0.0, 0.0, -0.2))),
    ];
    let mesh = subtract_solid(modeler, &base, &tools);
    let mut node = SceneNode::with_style(Some(Object::from_mesh("hole wall", mesh)), style);
    sit_on_ground(&mut node);
    node
}

#[cfg(test)]
mod tests {
    use super::{box_node, hole_wall_node, mirror_node, room_nodes, wall_node};
    use crate::geometry::{Mesh, PlacedMesh, SolidModeler};
    use crate::scene::{LineTopology, OverlayShape, OverlayStyle};
    use glam::{Vec2, Vec3};

    struct KeepBase;

    impl SolidModeler for KeepBase {
        fn subtract(&self, base: &Mesh, _tools: &[PlacedMesh]) -> Mesh {
            base.clone()
        }
    }

    #[test]
    fn placed_nodes_rest_on_the_ground() {
        let style = OverlayStyle::default();
        for node in [
            box_node(Vec3::new(1.0, 2.0, 1.0), style),
            mirror_node(5.0, 5.0, style),
            hole_wall_node(&KeepBase, style),
        ] {
            assert!(node.bounding_box_world().min.y.abs() < 1e-5, "{}", node.name());
        }
    }

    #[test]
    fn wall_node_spans_its_footprint_in_world_space() {
        let points = [
            Vec2::new(4.0, 0.5),
            Vec2::new(4.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 0.5),
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
        ];
        let node = wall_node(&points, 3.0, OverlayStyle::default());
        let world = node.bounding_box_world();
        assert!((world.min - Vec3::new(0.0, 0.0, 0.0)).length() < 1e-4);
        assert!((world.max - Vec3::new(4.0, 3.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn room_walls_enclose_the_origin() {
        let walls = room_nodes(10.0, 0.5, OverlayStyle::default());
        assert_eq!(walls.len(), 4);
        for wall in &walls {
            let world = wall.bounding_box_world();
            assert!(!world.contains_point(Vec3::new(0.0, 1.0, 0.0)));
            assert!(world.max.abs().max_element() <= 10.5 + 1e-3);
            assert!((world.max.y - 4.0).abs() < 1e-4);
        }
    }

    #[test]
    fn walls_outline_their_edges_and_boxes_their_bounds() {
        let style = OverlayStyle::default();
        for wall in room_nodes(10.0, 0.5, style) {
            let overlay = wall.overlay().unwrap();
            assert_eq!(overlay.shape(), OverlayShape::Edges);
            assert_eq!(overlay.topology(), LineTopology::Segments);
            assert_eq!(overlay.points().len() % 2, 0);
            // At least the twelve edges of a box-like slab.
            assert!(overlay.points().len() >= 24);
            let local = wall.bounding_box_local();
            for point in overlay.points() {
                assert!(local.contains_point_eps(*point, 1e-3));
            }
        }
        let block = box_node(Vec3::ONE, style);
        assert_eq!(block.overlay().unwrap().shape(), OverlayShape::Bounds);
    }
}
