use crate::scene::NodeId;
use glam::Vec3;

const MODE_TRANSLATE: u8 = 0b01;
const MODE_ROTATE: u8 = 0b10;

const GIZMO_TRANSLATE_X: u8 = 1;
const GIZMO_TRANSLATE_Y: u8 = 2;
const GIZMO_TRANSLATE_Z: u8 = 3;
const GIZMO_ROTATE_X: u8 = 11;
const GIZMO_ROTATE_Y: u8 = 12;
const GIZMO_ROTATE_Z: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
}

impl GizmoMode {
    fn mask(self) -> u8 {
        match self {
            Self::Translate => MODE_TRANSLATE,
            Self::Rotate => MODE_ROTATE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Which axis handles are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisMask {
    pub const ALL: Self = Self {
        x: true,
        y: true,
        z: true,
    };
    pub const Y_ONLY: Self = Self {
        x: false,
        y: true,
        z: false,
    };

    pub fn contains(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Zeroes the components of `v` on hidden axes.
    pub fn filter(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            if self.x { v.x } else { 0.0 },
            if self.y { v.y } else { 0.0 },
            if self.z { v.z } else { 0.0 },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GizmoHandle {
    pub id: u8,
    pub axis: Axis,
    mode_mask: u8,
}

const HANDLES: [GizmoHandle; 6] = [
    GizmoHandle { id: GIZMO_TRANSLATE_X, axis: Axis::X, mode_mask: MODE_TRANSLATE },
    GizmoHandle { id: GIZMO_TRANSLATE_Y, axis: Axis::Y, mode_mask: MODE_TRANSLATE },
    GizmoHandle { id: GIZMO_TRANSLATE_Z, axis: Axis::Z, mode_mask: MODE_TRANSLATE },
    GizmoHandle { id: GIZMO_ROTATE_X, axis: Axis::X, mode_mask: MODE_ROTATE },
    GizmoHandle { id: GIZMO_ROTATE_Y, axis: Axis::Y, mode_mask: MODE_ROTATE },
    GizmoHandle { id: GIZMO_ROTATE_Z, axis: Axis::Z, mode_mask: MODE_ROTATE },
];

/// Translate/rotate manipulator state. At most one node is attached; the
/// viewport keeps that node selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformGizmo {
    attached: Option<NodeId>,
    mode: GizmoMode,
    axes: AxisMask,
    dragging: bool,
}

impl Default for TransformGizmo {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self {
            attached: None,
            mode: GizmoMode::Translate,
            axes: AxisMask::ALL,
            dragging: false,
        }
    }

    pub fn attached(&self) -> Option<NodeId> {
        self.attached
    }

    pub fn is_visible(&self) -> bool {
        self.attached.is_some()
    }

    pub fn attach(&mut self, node: NodeId) {
        self.attached = Some(node);
    }

    pub fn detach(&mut self) {
        self.attached = None;
        self.dragging = false;
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn axes(&self) -> AxisMask {
        self.axes
    }

    /// Rotation is limited to the vertical axis; translation shows all three.
    pub fn set_mode(&mut self, mode: GizmoMode) {
        self.mode = mode;
        self.axes = match mode {
            GizmoMode::Translate => AxisMask::ALL,
            GizmoMode::Rotate => AxisMask::Y_ONLY,
        };
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Returns true when the flag changed.
    pub fn set_dragging(&mut self, dragging: bool) -> bool {
        let dragging = dragging && self.attached.is_some();
        let changed = self.dragging != dragging;
        self.dragging = dragging;
        changed
    }

    pub fn allows(&self, mode: GizmoMode, axis: Axis) -> bool {
        self.attached.is_some() && self.mode == mode && self.axes.contains(axis)
    }

    /// Handles a renderer should draw for the current mode and axis mask.
    pub fn visible_handles(&self) -> impl Iterator<Item = GizmoHandle> + '_ {
        let mode_mask = self.mode.mask();
        HANDLES.iter().copied().filter(move |handle| {
            self.attached.is_some()
                && (handle.mode_mask & mode_mask) != 0
                && self.axes.contains(handle.axis)
        })
    }
}
