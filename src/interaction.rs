//! Pointer and keyboard state machine for selection, drag and gizmo mode.
//!
//! The controller never owns scene data. Each call borrows the viewport's
//! nodes, selection and gizmo through [`SceneAccess`], which also enforces
//! that the gizmo is only ever attached to a selected node.

use crate::render::{GizmoMode, TransformGizmo};
use crate::scene::{NodeId, SceneNode};
use glam::Vec3;
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    /// Shift toggles membership instead of replacing the selection.
    pub fn multi_select(&self) -> bool {
        self.shift
    }
}

/// Mutable view of the viewport state an interaction may touch.
pub struct SceneAccess<'a> {
    pub nodes: &'a mut [SceneNode],
    pub selected: &'a mut Vec<NodeId>,
    pub gizmo: &'a mut TransformGizmo,
}

impl SceneAccess<'_> {
    fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|node| node.id() == id)
    }

    /// Adds `id` to the selection and moves the gizmo onto it.
    pub fn select(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.set_selected(true);
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
        self.gizmo.detach();
        self.gizmo.attach(id);
    }

    /// Removes `id` from the selection; the gizmo leaves it if attached.
    pub fn deselect(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.set_selected(false);
        }
        self.selected.retain(|selected| *selected != id);
        if self.gizmo.attached() == Some(id) {
            self.gizmo.detach();
        }
    }

    pub fn clear_selection(&mut self) {
        for node in self.nodes.iter_mut() {
            if node.is_selected() {
                node.set_selected(false);
            }
        }
        self.selected.clear();
        self.gizmo.detach();
    }

    fn ray_casted(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.is_ray_casted())
            .map(SceneNode::id)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub anchor: Vec3,
    pub snapshots: Vec<(NodeId, Vec3)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragState),
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging(_))
    }

    /// Applies a click to the nodes under the pointer, in node order.
    ///
    /// Nothing under the pointer clears the selection. Otherwise each hit
    /// node is toggled when shift is held, replaces a single selection, or
    /// starts a new selection. With several nodes selected and no modifier
    /// the click leaves the selection alone.
    pub fn click(&mut self, scene: &mut SceneAccess<'_>, modifiers: Modifiers) {
        if self.is_dragging() {
            return;
        }
        let hits = scene.ray_casted();
        if hits.is_empty() {
            scene.clear_selection();
            return;
        }
        for id in hits {
            if scene.selected.is_empty() {
                scene.select(id);
            } else if modifiers.multi_select() {
                if scene.selected.contains(&id) {
                    scene.deselect(id);
                } else {
                    scene.select(id);
                }
            } else if scene.selected.len() == 1 {
                let previous = scene.selected[0];
                if previous != id {
                    scene.deselect(previous);
                }
                scene.select(id);
            }
        }
    }

    /// Starts a drag when a selected node is under the pointer and the ray
    /// meets the drag plane. Returns true when a drag began.
    pub fn pointer_down(&mut self, scene: &SceneAccess<'_>, plane_hit: Option<Vec3>) -> bool {
        if self.is_dragging() {
            return false;
        }
        let grabbed = scene
            .nodes
            .iter()
            .any(|node| node.is_ray_casted() && scene.selected.contains(&node.id()));
        let Some(anchor) = plane_hit.filter(|_| grabbed) else {
            return false;
        };
        let snapshots = scene
            .selected
            .iter()
            .filter_map(|id| {
                let node = scene.nodes.iter().find(|node| node.id() == *id)?;
                Some((*id, node.position()))
            })
            .collect();
        self.state = InteractionState::Dragging(DragState { anchor, snapshots });
        true
    }

    /// Moves dragged nodes by the plane-space pointer delta. Skipped while
    /// the gizmo itself is being dragged.
    pub fn pointer_move(&mut self, scene: &mut SceneAccess<'_>, plane_hit: Option<Vec3>) -> bool {
        let InteractionState::Dragging(drag) = &self.state else {
            return false;
        };
        if scene.gizmo.is_dragging() {
            return false;
        }
        let Some(hit) = plane_hit else {
            return false;
        };
        let delta = hit - drag.anchor;
        for (id, start) in &drag.snapshots {
            if let Some(node) = scene.node_mut(*id) {
                node.set_position(*start + delta);
                node.refresh_bounds();
            }
        }
        true
    }

    pub fn pointer_up(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Drops a removed node from any drag in progress.
    pub fn forget(&mut self, id: NodeId) {
        if let InteractionState::Dragging(drag) = &mut self.state {
            drag.snapshots.retain(|(node, _)| *node != id);
        }
    }

    /// `R` switches the gizmo to rotation about Y, `T` back to translation.
    /// Needs a non-empty selection. Returns the new mode when it applied.
    pub fn key_down(&mut self, scene: &mut SceneAccess<'_>, key: KeyCode) -> Option<GizmoMode> {
        if scene.selected.is_empty() {
            return None;
        }
        let mode = match key {
            KeyCode::KeyR => GizmoMode::Rotate,
            KeyCode::KeyT => GizmoMode::Translate,
            _ => return None,
        };
        scene.gizmo.set_mode(mode);
        Some(mode)
    }
}
