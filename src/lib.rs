//! archviz - scene nodes and an editing viewport for architectural layouts.
//!
//! Nodes wrap an object tree with bounding volumes, a wireframe overlay and
//! interaction flags. The [`viewport::Viewport`] owns them and runs the
//! per-frame tick: picking, collision detection and rendering through a
//! pluggable [`render::Renderer`].

pub mod app;
pub mod assets;
pub mod config;
pub mod geometry;
pub mod interaction;
pub mod render;
pub mod scene;
pub mod viewport;
