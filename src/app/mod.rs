mod input;

pub use input::{modifiers_from, InputAction, InputState};

use crate::render::{RenderFrame, Renderer};
use crate::viewport::Viewport;

use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::error::EventLoopError;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

const FRAME_LOG_INTERVAL: u64 = 120;

/// Renderer that reports frames to the log instead of drawing them.
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
    last_overlays: usize,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        self.frames += 1;
        let overlays: Vec<_> = frame.overlays().collect();
        if overlays.len() != self.last_overlays || frame.frame_index % FRAME_LOG_INTERVAL == 0 {
            let segments: usize = overlays.iter().map(|overlay| overlay.segments().len()).sum();
            log::debug!(
                "frame {}: {} nodes, {} overlays ({} segments), gizmo on {} ({} handles)",
                frame.frame_index,
                frame.nodes.len(),
                overlays.len(),
                segments,
                frame
                    .gizmo_target()
                    .map(|node| node.id().to_string())
                    .unwrap_or_else(|| "nothing".into()),
                frame.gizmo.visible_handles().count()
            );
        }
        self.last_overlays = overlays.len();
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("render target {}x{}", width, height);
    }
}

pub struct App {
    window: Option<Arc<Window>>,
    viewport: Viewport,
    renderer: LogRenderer,
    input: InputState,
}

impl App {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            window: None,
            viewport,
            renderer: LogRenderer::new(),
            input: InputState::default(),
        }
    }

    fn report_loads(&mut self) {
        for outcome in self.viewport.drain_load_outcomes() {
            if let Err(err) = outcome.result {
                log::warn!("could not load {}: {}", outcome.url, err);
            }
        }
    }

    fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: InputAction) {
        match action {
            InputAction::Exit => event_loop.exit(),
            InputAction::Key(code) => {
                self.viewport.key_down(code);
            }
            InputAction::PointerDown => {
                self.viewport.pointer_down();
            }
            InputAction::PointerUp(modifiers) => {
                self.viewport.pointer_up();
                self.viewport.click(modifiers);
            }
            InputAction::GizmoDown => {
                if self.viewport.gizmo_drag_started() {
                    log::debug!("gizmo drag started ({:?})", self.viewport.gizmo().mode());
                }
            }
            InputAction::GizmoUp => {
                if self.viewport.gizmo_drag_ended() {
                    log::debug!("gizmo drag ended");
                }
            }
            InputAction::None => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = self.viewport.config();
        let [width, height] = config.initial_size();
        let window_attrs = WindowAttributes::default()
            .with_title("archviz")
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(config.fixed_size.is_none());

        match event_loop.create_window(window_attrs) {
            Ok(window) => {
                self.window = Some(Arc::new(window));
                self.viewport.start();
            }
            Err(err) => {
                log::warn!("failed to create window: {}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.viewport.stop();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                let action = self.input.handle_key(event.physical_key, pressed);
                self.handle_action(event_loop, action);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.input.set_modifiers(modifiers.state());
            }
            WindowEvent::Resized(new_size) => {
                self.viewport
                    .resize(new_size.width, new_size.height, &mut self.renderer);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                if let Some((dx, dy)) = self.input.handle_cursor(x, y) {
                    self.viewport.orbit(dx, dy);
                }
                self.viewport.pointer_move(x, y);
            }
            WindowEvent::CursorLeft { .. } => {
                self.input.cursor_left();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                let action = self.input.handle_button(button, pressed);
                self.handle_action(event_loop, action);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewport.run_due(Instant::now(), &mut self.renderer) {
            self.report_loads();
        }
        match self.viewport.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

/// Runs `viewport` in a window until it is closed.
pub fn run(viewport: Viewport) -> Result<(), EventLoopError> {
    log::info!("archviz: left click selects, shift toggles, drag moves, right drag orbits");
    log::info!("   middle drag moves the gizmo, R rotates, T translates, ESC exits");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(viewport);
    event_loop.run_app(&mut app)?;

    log::info!("{} frames rendered", app.renderer.frames());
    Ok(())
}
