use super::node::NodeFlags;
use crate::geometry::wireframe::wireframe_strip;
use crate::geometry::Aabb;
use glam::Vec3;

/// Line material for bounding box overlays. Colour is `0xRRGGBB`, width is in
/// pixels at the current line resolution.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineMaterial {
    pub color: u32,
    pub width: f32,
}

impl LineMaterial {
    pub const fn new(color: u32, width: f32) -> Self {
        Self { color, width }
    }

    pub fn rgb(&self) -> [f32; 3] {
        [
            ((self.color >> 16) & 0xFF) as f32 / 255.0,
            ((self.color >> 8) & 0xFF) as f32 / 255.0,
            (self.color & 0xFF) as f32 / 255.0,
        ]
    }
}

/// The two materials an overlay switches between.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub hover: LineMaterial,
    pub selected: LineMaterial,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            hover: LineMaterial::new(0x4080ff, 2.0),
            selected: LineMaterial::new(0x4080ff, 4.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayWeight {
    Hover,
    Selected,
}

/// Visual state of an overlay, derived from node flags only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    pub visible: bool,
    pub weight: OverlayWeight,
}

impl OverlayConfig {
    pub const HIDDEN: Self = Self {
        visible: false,
        weight: OverlayWeight::Hover,
    };

    pub fn from_flags(flags: NodeFlags) -> Self {
        Self {
            visible: flags.hovered || flags.selected,
            weight: if flags.selected {
                OverlayWeight::Selected
            } else {
                OverlayWeight::Hover
            },
        }
    }

    /// New config when the flag change alters what is drawn.
    pub fn transition(old: NodeFlags, new: NodeFlags) -> Option<Self> {
        let before = Self::from_flags(old);
        let after = Self::from_flags(new);
        (before != after).then_some(after)
    }
}

/// What a node's overlay outlines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayShape {
    /// The local bounding box, as one connected strip.
    #[default]
    Bounds,
    /// The content's feature edges, as independent segments.
    Edges,
}

/// How a backend should read [`WireOverlay::points`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTopology {
    Strip,
    /// Consecutive pairs are separate segments.
    Segments,
}

/// Wireframe of a node's content. Points are in the node's local frame;
/// renderers place them with the node's world matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct WireOverlay {
    shape: OverlayShape,
    points: Vec<Vec3>,
    style: OverlayStyle,
    config: OverlayConfig,
}

impl WireOverlay {
    pub fn new(bounds: &Aabb, style: OverlayStyle, flags: NodeFlags) -> Self {
        Self {
            shape: OverlayShape::Bounds,
            points: wireframe_strip(bounds).to_vec(),
            style,
            config: OverlayConfig::from_flags(flags),
        }
    }

    pub fn from_edges(edges: &[[Vec3; 2]], style: OverlayStyle, flags: NodeFlags) -> Self {
        Self {
            shape: OverlayShape::Edges,
            points: edges.iter().flatten().copied().collect(),
            style,
            config: OverlayConfig::from_flags(flags),
        }
    }

    pub fn shape(&self) -> OverlayShape {
        self.shape
    }

    pub fn topology(&self) -> LineTopology {
        match self.shape {
            OverlayShape::Bounds => LineTopology::Strip,
            OverlayShape::Edges => LineTopology::Segments,
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn config(&self) -> OverlayConfig {
        self.config
    }

    pub fn is_visible(&self) -> bool {
        self.config.visible
    }

    /// The material bound for the current weight.
    pub fn material(&self) -> &LineMaterial {
        match self.config.weight {
            OverlayWeight::Hover => &self.style.hover,
            OverlayWeight::Selected => &self.style.selected,
        }
    }

    pub(crate) fn apply(&mut self, config: OverlayConfig) {
        self.config = config;
    }
}
