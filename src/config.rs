use crate::scene::OverlayStyle;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [5.0, 5.0, 5.0],
            target: [0.0, 0.0, 0.0],
            fov_y_deg: 45.0,
            near: 0.1,
            far: 600.0,
        }
    }
}

/// Viewport settings. Every field has a default, so partial files load.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Fixed canvas size. When set, window resizes are ignored.
    pub fixed_size: Option<[u32; 2]>,
    pub window_size: [u32; 2],
    pub camera: CameraConfig,
    pub overlay: OverlayStyle,
    pub drag_plane_height: f32,
    pub frame_interval_ms: u64,
    /// Radians of orbit per pixel of pointer travel.
    pub orbit_sensitivity: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fixed_size: None,
            window_size: [1280, 720],
            camera: CameraConfig::default(),
            overlay: OverlayStyle::default(),
            drag_plane_height: 0.0,
            frame_interval_ms: 16,
            orbit_sensitivity: 0.005,
        }
    }
}

impl ViewportConfig {
    pub fn initial_size(&self) -> [u32; 2] {
        self.fixed_size.unwrap_or(self.window_size)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ViewportConfig};
    use crate::scene::LineMaterial;

    #[test]
    fn partial_json_fills_in_defaults() {
        let config = ViewportConfig::from_json_str(
            r#"{ "drag_plane_height": 1.5, "camera": { "fov_y_deg": 60.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.drag_plane_height, 1.5);
        assert_eq!(config.camera.fov_y_deg, 60.0);
        assert_eq!(config.camera.far, 600.0);
        assert_eq!(config.overlay.selected.width, 4.0);
        assert_eq!(config.initial_size(), [1280, 720]);
    }

    #[test]
    fn fixed_size_wins_over_window_size() {
        let config = ViewportConfig::from_json_str(r#"{ "fixed_size": [800, 600] }"#).unwrap();
        assert_eq!(config.initial_size(), [800, 600]);
    }

    #[test]
    fn save_and_load_round_trip_through_a_file() {
        let mut config = ViewportConfig::default();
        config.overlay.hover = LineMaterial::new(0xff0000, 3.0);
        config.frame_interval_ms = 33;

        let path = std::env::temp_dir().join("archviz_viewport_config_test.json");
        config.save_to_file(&path).unwrap();
        let loaded = ViewportConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = ViewportConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        let missing = std::env::temp_dir().join("archviz_no_such_config.json");
        let err = ViewportConfig::load_from_file(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
