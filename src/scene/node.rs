use super::overlay::{OverlayConfig, OverlayShape, OverlayStyle, WireOverlay};
use super::{Object, Transform};
use crate::assets::{LoadError, MeshFormat, MeshLoader};
use crate::geometry::{Aabb, Mesh, Obb};
use glam::{Mat4, Vec3};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity, stable for the node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub hovered: bool,
    pub selected: bool,
    pub ray_casted: bool,
}

/// A scene object plus everything the editor derives from it: bounding
/// volumes, the wireframe overlay, interaction flags and collisions.
///
/// Mutating the transform through [`SceneNode::object_mut`] or
/// [`SceneNode::set_position`] does not refresh derived bounds; call
/// [`SceneNode::refresh_bounds`] before the next picking or collision pass.
#[derive(Debug, Clone)]
pub struct SceneNode {
    id: NodeId,
    object: Object,
    bounding_box_local: Aabb,
    bounding_box_world: Aabb,
    oriented_box: Obb,
    overlay: Option<WireOverlay>,
    overlay_shape: OverlayShape,
    style: OverlayStyle,
    flags: NodeFlags,
    parent: Option<NodeId>,
    children: Vec<SceneNode>,
    collision_list: Vec<NodeId>,
    url: Option<String>,
}

impl SceneNode {
    pub fn new(object: Option<Object>) -> Self {
        Self::with_style(object, OverlayStyle::default())
    }

    pub fn with_style(object: Option<Object>, style: OverlayStyle) -> Self {
        let has_object = object.is_some();
        let mut node = Self {
            id: NodeId::next(),
            object: object.unwrap_or_else(|| Object::group("node")),
            bounding_box_local: Aabb::EMPTY,
            bounding_box_world: Aabb::EMPTY,
            oriented_box: Obb::EMPTY,
            overlay: None,
            overlay_shape: OverlayShape::default(),
            style,
            flags: NodeFlags::default(),
            parent: None,
            children: Vec::new(),
            collision_list: Vec::new(),
            url: None,
        };
        if has_object {
            node.compute_local_bounds();
        }
        node
    }

    pub fn from_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::new(Some(Object::from_mesh(name, mesh)))
    }

    /// A node with no content yet, typically the target of a load.
    pub fn empty() -> Self {
        Self::new(None)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.object.name
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut Object {
        &mut self.object
    }

    pub fn has_content(&self) -> bool {
        !self.object.is_empty()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn transform(&self) -> &Transform {
        &self.object.transform
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.object.transform.matrix()
    }

    pub fn position(&self) -> Vec3 {
        self.object.transform.translation
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.object.transform.translation = position;
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.object.transform = transform;
    }

    pub fn bounding_box_local(&self) -> Aabb {
        self.bounding_box_local
    }

    pub fn bounding_box_world(&self) -> Aabb {
        self.bounding_box_world
    }

    pub fn oriented_box(&self) -> Obb {
        self.oriented_box
    }

    pub fn overlay(&self) -> Option<&WireOverlay> {
        self.overlay.as_ref()
    }

    pub fn overlay_shape(&self) -> OverlayShape {
        self.overlay_shape
    }

    /// Switches what the overlay outlines, keeping its current weight.
    pub fn set_overlay_shape(&mut self, shape: OverlayShape) {
        if self.overlay_shape != shape {
            self.overlay_shape = shape;
            self.rebuild_overlay();
        }
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn is_hovered(&self) -> bool {
        self.flags.hovered
    }

    pub fn is_selected(&self) -> bool {
        self.flags.selected
    }

    pub fn is_ray_casted(&self) -> bool {
        self.flags.ray_casted
    }

    pub fn collision_list(&self) -> &[NodeId] {
        &self.collision_list
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn add_child(&mut self, mut child: SceneNode) {
        child.parent = Some(self.id);
        self.children.push(child);
    }

    pub fn remove_child(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.children.iter().position(|child| child.id == id)?;
        let mut child = self.children.remove(index);
        child.parent = None;
        Some(child)
    }

    /// Recomputes the local box from content, rebuilds the overlay around it
    /// and refreshes the world-space volumes.
    pub fn compute_local_bounds(&mut self) {
        self.bounding_box_local = self.object.local_bounds();
        self.rebuild_overlay();
        self.refresh_bounds();
    }

    fn rebuild_overlay(&mut self) {
        if self.bounding_box_local.is_empty() {
            self.overlay = None;
            return;
        }
        self.overlay = Some(match self.overlay_shape {
            OverlayShape::Bounds => {
                WireOverlay::new(&self.bounding_box_local, self.style, self.flags)
            }
            OverlayShape::Edges => {
                WireOverlay::from_edges(&self.object.local_edges(), self.style, self.flags)
            }
        });
    }

    /// Recomputes the world box from the current world transform.
    pub fn update_bounding_box(&mut self) {
        self.bounding_box_world = self.object.world_bounds(Mat4::IDENTITY);
    }

    /// Recomputes the oriented box. Must follow [`Self::update_bounding_box`]
    /// whenever the local box changed.
    pub fn update_oriented_box(&mut self) {
        self.oriented_box = Obb::from_aabb(&self.bounding_box_local, self.world_matrix());
    }

    pub fn refresh_bounds(&mut self) {
        self.update_bounding_box();
        self.update_oriented_box();
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        let old = self.flags;
        self.flags.hovered = hovered;
        self.sync_overlay(old);
    }

    pub fn set_selected(&mut self, selected: bool) {
        let old = self.flags;
        self.flags.selected = selected;
        self.sync_overlay(old);
    }

    pub(crate) fn set_ray_casted(&mut self, ray_casted: bool) {
        self.flags.ray_casted = ray_casted;
    }

    pub(crate) fn set_collisions(&mut self, collisions: Vec<NodeId>) {
        self.collision_list = collisions;
    }

    pub(crate) fn forget_collision(&mut self, id: NodeId) {
        self.collision_list.retain(|other| *other != id);
    }

    fn sync_overlay(&mut self, old: NodeFlags) {
        if let (Some(config), Some(overlay)) =
            (OverlayConfig::transition(old, self.flags), self.overlay.as_mut())
        {
            overlay.apply(config);
        }
    }

    /// Loads `url` synchronously and attaches the result. Dispatches on the
    /// file extension; anything other than glTF or GLB is rejected.
    pub fn load(&mut self, loader: &dyn MeshLoader, url: &str) -> Result<(), LoadError> {
        let format = MeshFormat::from_url(url)?;
        let scene = loader.load_mesh(url, format)?;
        self.attach_loaded(url, scene);
        Ok(())
    }

    /// Re-centers a loaded scene, attaches it under this node's object and
    /// rebuilds the derived state.
    pub fn attach_loaded(&mut self, url: &str, mut scene: Object) {
        scene.zero_translations();
        log::info!(
            "{} attached {} ({} objects)",
            self.id,
            url,
            scene.count()
        );
        self.object.add(scene);
        self.url = Some(url.to_string());
        self.compute_local_bounds();
    }
}
