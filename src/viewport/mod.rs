//! The editing viewport
//!
//! Owns the scene nodes, the selection, the camera and the gizmo, and runs
//! the per-frame tick: finished loads are attached, the pointer ray is cast,
//! hover and collision state are refreshed and the frame is handed to a
//! [`Renderer`]. Input arrives through plain method calls so any windowing
//! layer can drive it.

pub mod scheduler;

pub use scheduler::FrameScheduler;

use crate::assets::{
    CompletedLoad, GltfLoader, LoadError, LoadHandle, LoadOutcome, LoadQueue, MeshLoader,
};
use crate::config::ViewportConfig;
use crate::geometry::{Plane, Ray};
use crate::interaction::{InteractionController, Modifiers, SceneAccess};
use crate::render::{
    Axis, Camera, GizmoMode, LineResolution, PickingEngine, RenderFrame, Renderer, TransformGizmo,
};
use crate::scene::{CollisionIndex, NodeId, SceneNode};
use glam::{Vec2, Vec3};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::keyboard::KeyCode;

/// Rotate-mode gizmo drags turn this many radians per NDC unit of
/// horizontal pointer travel.
const GIZMO_ROTATE_PER_NDC: f32 = std::f32::consts::FRAC_PI_2;

pub struct Viewport {
    config: ViewportConfig,
    width: u32,
    height: u32,
    camera: Camera,
    nodes: Vec<SceneNode>,
    selected: Vec<NodeId>,
    gizmo: TransformGizmo,
    interaction: InteractionController,
    picking: PickingEngine,
    collisions: CollisionIndex,
    pointer: Vec2,
    ground: Plane,
    orbit_enabled: bool,
    scheduler: FrameScheduler,
    loads: LoadQueue,
    load_outcomes: Vec<LoadOutcome>,
    frame_index: u64,
}

impl Viewport {
    pub fn new(config: ViewportConfig, loader: Arc<dyn MeshLoader>) -> Self {
        let [width, height] = config.initial_size();
        let camera = Camera::from_config(&config.camera, width as f32 / height.max(1) as f32);
        let ground = Plane::ground(config.drag_plane_height);
        let scheduler = FrameScheduler::new(Duration::from_millis(config.frame_interval_ms));
        log::info!(
            "viewport created: {}x{}{}",
            width,
            height,
            if config.fixed_size.is_some() { " (fixed)" } else { "" }
        );
        Self {
            config,
            width,
            height,
            camera,
            nodes: Vec::new(),
            selected: Vec::new(),
            gizmo: TransformGizmo::new(),
            interaction: InteractionController::new(),
            picking: PickingEngine::new(),
            collisions: CollisionIndex::new(),
            pointer: Vec2::ZERO,
            ground,
            orbit_enabled: true,
            scheduler,
            loads: LoadQueue::new(loader),
            load_outcomes: Vec::new(),
            frame_index: 0,
        }
    }

    /// Default configuration with the glTF loader.
    pub fn with_defaults() -> Self {
        Self::new(ViewportConfig::default(), Arc::new(GltfLoader::new()))
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn is_dragging(&self) -> bool {
        self.interaction.is_dragging()
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn line_resolution(&self) -> LineResolution {
        LineResolution {
            width: self.width,
            height: self.height,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Call [`SceneNode::refresh_bounds`] after moving the node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|node| node.id() == id)
    }

    // ---------------------------------------------------------------------
    // Nodes
    // ---------------------------------------------------------------------

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = node.id();
        log::info!("added {} '{}'", id, node.name());
        self.nodes.push(node);
        id
    }

    pub fn add_all(&mut self, nodes: impl IntoIterator<Item = SceneNode>) -> Vec<NodeId> {
        nodes.into_iter().map(|node| self.add(node)).collect()
    }

    /// Takes a node out of the scene. It leaves the selection, the gizmo,
    /// any drag and every collision list, and its pending loads are
    /// cancelled.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|node| node.id() == id)?;
        {
            let (interaction, mut scene) = self.interaction_parts();
            scene.deselect(id);
            interaction.forget(id);
        }
        self.sync_orbit();
        let node = self.nodes.remove(index);
        for other in &mut self.nodes {
            other.forget_collision(id);
        }
        let cancelled = self.loads.cancel_node(id);
        log::info!(
            "removed {} '{}' ({} pending loads cancelled)",
            id,
            node.name(),
            cancelled
        );
        Some(node)
    }

    /// Logs every node with its world box and flags.
    pub fn log_nodes(&self) {
        for node in &self.nodes {
            let bounds = node.bounding_box_world();
            log::debug!(
                "{} '{}' center={:?} size={:?} flags={:?} collisions={}",
                node.id(),
                node.name(),
                bounds.center(),
                bounds.size(),
                node.flags(),
                node.collision_list().len()
            );
        }
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Loads `url` on a worker thread. The result is attached to the node on
    /// a later tick and reported through [`Self::drain_load_outcomes`].
    pub fn load_async(&mut self, id: NodeId, url: &str) -> Result<LoadHandle, LoadError> {
        if self.node(id).is_none() {
            return Err(LoadError::Cancelled {
                url: url.to_string(),
            });
        }
        self.loads.submit(id, url)
    }

    pub fn pending_loads(&self) -> usize {
        self.loads.pending_count()
    }

    /// Blocks until all pending loads are in and attaches them.
    pub fn wait_for_loads(&mut self) -> usize {
        let done = self.loads.wait_all();
        let count = done.len();
        self.attach_completed(done);
        count
    }

    pub fn drain_load_outcomes(&mut self) -> Vec<LoadOutcome> {
        std::mem::take(&mut self.load_outcomes)
    }

    fn attach_completed(&mut self, done: Vec<CompletedLoad>) {
        for load in done {
            let CompletedLoad {
                id,
                node,
                url,
                result,
            } = load;
            let result = match result {
                Ok(scene) => match self.node_mut(node) {
                    Some(target) => {
                        target.attach_loaded(&url, scene);
                        Ok(())
                    }
                    None => Err(LoadError::Cancelled { url: url.clone() }),
                },
                Err(err) => Err(err),
            };
            match &result {
                Ok(()) => log::info!("{id} finished for {node}"),
                Err(LoadError::Cancelled { .. }) => log::info!("{id} cancelled for {node}"),
                Err(err) => log::warn!("{id} failed for {node}: {err}"),
            }
            self.load_outcomes.push(LoadOutcome {
                id,
                node,
                url,
                result,
            });
        }
    }

    // ---------------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------------

    /// Pointer position in window pixels.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let width = self.width.max(1) as f32;
        let height = self.height.max(1) as f32;
        self.pointer_move_ndc(Vec2::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0))
    }

    /// Pointer position in normalized device coordinates. Returns true when
    /// a node drag or a gizmo drag moved nodes.
    pub fn pointer_move_ndc(&mut self, ndc: Vec2) -> bool {
        let previous = std::mem::replace(&mut self.pointer, ndc);
        if self.gizmo.is_dragging() {
            return self.drag_gizmo(previous);
        }
        if !self.interaction.is_dragging() {
            return false;
        }
        let hit = self.ground_hit();
        let (interaction, mut scene) = self.interaction_parts();
        interaction.pointer_move(&mut scene, hit)
    }

    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer
    }

    pub fn pointer_ray(&self) -> Ray {
        self.camera.ray_from_ndc(self.pointer)
    }

    /// Starts a drag when a selected node is under the pointer. Orbiting is
    /// suspended until the pointer is released.
    pub fn pointer_down(&mut self) -> bool {
        let hit = self.ground_hit();
        let (interaction, scene) = self.interaction_parts();
        let started = interaction.pointer_down(&scene, hit);
        self.sync_orbit();
        if started {
            log::debug!("drag started with {} selected", self.selected.len());
        }
        started
    }

    pub fn pointer_up(&mut self) {
        if self.interaction.is_dragging() {
            log::debug!("drag ended");
        }
        self.interaction.pointer_up();
        self.sync_orbit();
    }

    /// Selection click against the nodes under the pointer as of the last
    /// tick.
    pub fn click(&mut self, modifiers: Modifiers) {
        let (interaction, mut scene) = self.interaction_parts();
        interaction.click(&mut scene, modifiers);
        self.sync_orbit();
    }

    pub fn key_down(&mut self, key: KeyCode) -> Option<GizmoMode> {
        let (interaction, mut scene) = self.interaction_parts();
        let mode = interaction.key_down(&mut scene, key)?;
        log::info!("gizmo mode: {:?}", mode);
        Some(mode)
    }

    /// Orbits the camera by a pointer travel in pixels. Ignored while a node
    /// or the gizmo is being dragged.
    pub fn orbit(&mut self, dx: f32, dy: f32) -> bool {
        if !self.orbit_enabled {
            return false;
        }
        let sensitivity = self.config.orbit_sensitivity;
        self.camera.orbit(-dx * sensitivity, dy * sensitivity);
        true
    }

    /// Applies a new canvas size. A fixed-size viewport ignores resizes.
    pub fn resize(&mut self, width: u32, height: u32, renderer: &mut dyn Renderer) -> bool {
        if self.config.fixed_size.is_some() {
            return false;
        }
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.camera.set_viewport_size(width, height);
        renderer.resize(width, height);
        log::info!("viewport resized to {}x{}", width, height);
        true
    }

    // ---------------------------------------------------------------------
    // Gizmo
    // ---------------------------------------------------------------------

    pub fn gizmo_drag_started(&mut self) -> bool {
        self.set_gizmo_dragging(true)
    }

    pub fn gizmo_drag_ended(&mut self) -> bool {
        self.set_gizmo_dragging(false)
    }

    fn set_gizmo_dragging(&mut self, dragging: bool) -> bool {
        if !self.gizmo.set_dragging(dragging) {
            return false;
        }
        self.sync_orbit();
        let selected = self.selected.clone();
        for id in selected {
            if let Some(node) = self.node_mut(id) {
                node.refresh_bounds();
            }
        }
        true
    }

    /// Moves the attached node along the visible translate axes.
    pub fn apply_gizmo_translation(&mut self, delta: Vec3) -> bool {
        if self.gizmo.mode() != GizmoMode::Translate {
            return false;
        }
        let delta = self.gizmo.axes().filter(delta);
        let Some(id) = self.gizmo.attached() else {
            return false;
        };
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let position = node.position() + delta;
        node.set_position(position);
        node.refresh_bounds();
        true
    }

    /// Spins the attached node about the vertical axis. Walls stay upright
    /// whatever the angle.
    pub fn apply_gizmo_rotation(&mut self, angle: f32) -> bool {
        if self.gizmo.mode() != GizmoMode::Rotate {
            return false;
        }
        let Some(id) = self.gizmo.attached() else {
            return false;
        };
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let mut transform = *node.transform();
        transform.rotate_world(Axis::Y.unit(), angle);
        node.set_transform(transform);
        node.refresh_bounds();
        true
    }

    /// Turns pointer travel since `previous` into a gizmo edit: ground-plane
    /// travel in translate mode, horizontal travel as a half turn per
    /// viewport width in rotate mode.
    fn drag_gizmo(&mut self, previous: Vec2) -> bool {
        match self.gizmo.mode() {
            GizmoMode::Translate => {
                let from = self.camera.ray_from_ndc(previous).intersect_plane(&self.ground);
                match (from, self.ground_hit()) {
                    (Some(from), Some(to)) => self.apply_gizmo_translation(to - from),
                    _ => false,
                }
            }
            GizmoMode::Rotate => {
                let angle = (self.pointer.x - previous.x) * GIZMO_ROTATE_PER_NDC;
                self.apply_gizmo_rotation(angle)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Frame loop
    // ---------------------------------------------------------------------

    pub fn start(&mut self) {
        self.scheduler.start(Instant::now());
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Runs one tick now, whether or not the loop is running.
    pub fn step(&mut self, renderer: &mut dyn Renderer) {
        self.tick(renderer);
        self.scheduler.record_frame(Instant::now());
    }

    /// Runs a tick if the loop is running and a frame is due at `now`.
    pub fn run_due(&mut self, now: Instant, renderer: &mut dyn Renderer) -> bool {
        if !self.scheduler.is_due(now) {
            return false;
        }
        self.tick(renderer);
        self.scheduler.record_frame(now);
        true
    }

    fn tick(&mut self, renderer: &mut dyn Renderer) {
        let done = self.loads.poll();
        if !done.is_empty() {
            self.attach_completed(done);
        }

        let ray = self.pointer_ray();
        self.picking.update(&ray, &mut self.nodes);
        self.collisions.update(&mut self.nodes);

        let frame = RenderFrame {
            frame_index: self.frame_index,
            camera: &self.camera,
            nodes: &self.nodes,
            gizmo: &self.gizmo,
            line_resolution: self.line_resolution(),
        };
        renderer.render(&frame);
        self.frame_index += 1;
    }

    /// Orbiting is allowed only while neither a node drag nor a gizmo drag
    /// is in progress.
    fn sync_orbit(&mut self) {
        self.orbit_enabled = !self.interaction.is_dragging() && !self.gizmo.is_dragging();
    }

    fn ground_hit(&self) -> Option<Vec3> {
        self.pointer_ray().intersect_plane(&self.ground)
    }

    fn interaction_parts(&mut self) -> (&mut InteractionController, SceneAccess<'_>) {
        (
            &mut self.interaction,
            SceneAccess {
                nodes: &mut self.nodes,
                selected: &mut self.selected,
                gizmo: &mut self.gizmo,
            },
        )
    }
}
