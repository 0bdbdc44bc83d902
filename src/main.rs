//! archviz - interactive layout viewport
//!
//! Usage: `archviz [config.json] [model.gltf | model.glb]...`
//!
//! Opens a window over a demo room with a box and a diagonal wall. Each model
//! argument is loaded in the background into its own node.

use archviz::app;
use archviz::assets::GltfLoader;
use archviz::config::ViewportConfig;
use archviz::scene::builders::{box_node, room_nodes, wall_node};
use archviz::scene::{OverlayStyle, SceneNode};
use archviz::viewport::Viewport;

use glam::{Vec2, Vec3};
use std::path::Path;
use std::sync::Arc;

fn demo_scene(style: OverlayStyle) -> Vec<SceneNode> {
    let mut nodes = room_nodes(10.0, 0.5, style);
    nodes.push(box_node(Vec3::ONE, style));
    let wall = [
        Vec2::new(-3.5, 1.0),
        Vec2::new(-3.0, 1.0),
        Vec2::new(-1.0, 3.0),
        Vec2::new(-1.0, 3.5),
        Vec2::new(-1.0, 4.0),
        Vec2::new(-4.0, 1.0),
    ];
    nodes.push(wall_node(&wall, 1.0, style));
    nodes
}

fn main() {
    app::init_logging();

    let (configs, models): (Vec<String>, Vec<String>) = std::env::args()
        .skip(1)
        .partition(|arg| arg.to_ascii_lowercase().ends_with(".json"));

    let config = match configs.first() {
        Some(path) => ViewportConfig::load_from_file(Path::new(path)).unwrap_or_else(|err| {
            log::warn!("ignoring config {}: {}", path, err);
            ViewportConfig::default()
        }),
        None => ViewportConfig::default(),
    };

    let style = config.overlay;
    let mut viewport = Viewport::new(config, Arc::new(GltfLoader::new()));
    viewport.add_all(demo_scene(style));

    for url in &models {
        let id = viewport.add(SceneNode::with_style(None, style));
        if let Err(err) = viewport.load_async(id, url) {
            log::warn!("could not start loading {}: {}", url, err);
            viewport.remove(id);
        }
    }
    viewport.log_nodes();

    if let Err(err) = app::run(viewport) {
        log::warn!("event loop error: {}", err);
        std::process::exit(1);
    }
}
