pub mod camera;
pub mod gizmo;
pub mod pick;

pub use camera::Camera;
pub use gizmo::{Axis, AxisMask, GizmoHandle, GizmoMode, TransformGizmo};
pub use pick::PickingEngine;

use crate::geometry::wireframe::strip_segments;
use crate::scene::{LineMaterial, LineTopology, NodeId, SceneNode};
use glam::{Mat4, Vec3};

/// Pixel size line widths are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineResolution {
    pub width: u32,
    pub height: u32,
}

/// One visible overlay, ready to draw. `points` are in the node's local
/// frame and `world` places them.
#[derive(Debug, Clone, Copy)]
pub struct OverlayDraw<'a> {
    pub node: NodeId,
    pub points: &'a [Vec3],
    pub topology: LineTopology,
    pub material: &'a LineMaterial,
    pub world: Mat4,
}

impl OverlayDraw<'_> {
    /// The overlay as independent local-space segments, whatever its topology.
    pub fn segments(&self) -> Vec<(Vec3, Vec3)> {
        match self.topology {
            LineTopology::Strip => strip_segments(self.points),
            LineTopology::Segments => self
                .points
                .chunks_exact(2)
                .map(|pair| (pair[0], pair[1]))
                .collect(),
        }
    }
}

/// Everything a backend needs for one frame. Borrowed from the viewport for
/// the duration of [`Renderer::render`].
pub struct RenderFrame<'a> {
    pub frame_index: u64,
    pub camera: &'a Camera,
    pub nodes: &'a [SceneNode],
    pub gizmo: &'a TransformGizmo,
    pub line_resolution: LineResolution,
}

impl<'a> RenderFrame<'a> {
    pub fn overlays(&self) -> impl Iterator<Item = OverlayDraw<'a>> + 'a {
        self.nodes.iter().filter_map(|node| {
            let overlay = node.overlay().filter(|overlay| overlay.is_visible())?;
            Some(OverlayDraw {
                node: node.id(),
                points: overlay.points(),
                topology: overlay.topology(),
                material: overlay.material(),
                world: node.world_matrix(),
            })
        })
    }

    pub fn gizmo_target(&self) -> Option<&'a SceneNode> {
        let id = self.gizmo.attached()?;
        self.nodes.iter().find(|node| node.id() == id)
    }
}

/// Rendering backend driven by the viewport tick.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame<'_>);
    fn resize(&mut self, width: u32, height: u32);
}
