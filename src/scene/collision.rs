use super::node::{NodeId, SceneNode};
use crate::geometry::Obb;

/// Brute-force pairwise OBB overlap. Quadratic in node count, which is fine
/// for the tens of nodes an editing session holds.
#[derive(Debug, Default)]
pub struct CollisionIndex {
    last_pair_count: usize,
}

impl CollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds every node's collision list from the current oriented boxes.
    /// Lists keep node order. Returns the number of colliding pairs.
    pub fn update(&mut self, nodes: &mut [SceneNode]) -> usize {
        let boxes: Vec<(NodeId, Obb)> = nodes
            .iter()
            .map(|node| (node.id(), node.oriented_box()))
            .collect();
        let mut lists: Vec<Vec<NodeId>> = vec![Vec::new(); boxes.len()];
        let mut pairs = 0;
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                if boxes[i].1.intersects(&boxes[j].1) {
                    lists[i].push(boxes[j].0);
                    lists[j].push(boxes[i].0);
                    pairs += 1;
                }
            }
        }
        for (node, list) in nodes.iter_mut().zip(lists) {
            node.set_collisions(list);
        }
        if pairs != self.last_pair_count {
            log::debug!("collisions: {} -> {} pairs", self.last_pair_count, pairs);
        }
        self.last_pair_count = pairs;
        pairs
    }

    pub fn pair_count(&self) -> usize {
        self.last_pair_count
    }
}
