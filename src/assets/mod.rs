pub mod queue;

pub use queue::{CancelToken, CompletedLoad, LoadHandle, LoadId, LoadOutcome, LoadQueue};

use crate::geometry::Mesh;
use crate::scene::{Object, ObjectContent, Transform};
use glam::{Quat, Vec3};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read model at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model {url}: {message}")]
    Parse { url: String, message: String },
    #[error("unsupported model format {extension:?}: {url}")]
    UnsupportedFormat { url: String, extension: String },
    #[error("load cancelled: {url}")]
    Cancelled { url: String },
}

impl LoadError {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Parse { url, .. }
            | Self::UnsupportedFormat { url, .. }
            | Self::Cancelled { url } => url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Gltf,
    Glb,
}

impl MeshFormat {
    /// Picks the format from the URL's extension, ignoring case, query and
    /// fragment.
    pub fn from_url(url: &str) -> Result<Self, LoadError> {
        let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
        let extension = path
            .rsplit_once('.')
            .filter(|(_, ext)| !ext.contains('/'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "gltf" => Ok(Self::Gltf),
            "glb" => Ok(Self::Glb),
            _ => Err(LoadError::UnsupportedFormat {
                url: url.to_string(),
                extension,
            }),
        }
    }
}

/// Produces an object tree for a model URL. Called from loader threads.
pub trait MeshLoader: Send + Sync {
    fn load_mesh(&self, url: &str, format: MeshFormat) -> Result<Object, LoadError>;
}

/// Imports `.gltf` and `.glb` files from local paths or `file://` URLs.
/// Draco-compressed primitives are not decoded.
#[derive(Debug, Clone, Default)]
pub struct GltfLoader {
    base_dir: Option<PathBuf>,
}

impl GltfLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, LoadError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(LoadError::Transport {
                url: url.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "remote model URLs are not supported",
                ),
            });
        }
        let raw = url.strip_prefix("file://").unwrap_or(url);
        let path = Path::new(raw);
        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }
}

impl MeshLoader for GltfLoader {
    fn load_mesh(&self, url: &str, format: MeshFormat) -> Result<Object, LoadError> {
        let path = self.resolve(url)?;
        log::debug!("importing {:?} from {}", format, path.display());
        let (document, buffers, _images) = gltf::import(&path).map_err(|err| match err {
            gltf::Error::Io(source) => LoadError::Transport {
                url: url.to_string(),
                source,
            },
            other => LoadError::Parse {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;

        let name = path
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or("gltf")
            .to_string();
        let mut root = Object::group(name);
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| LoadError::Parse {
                url: url.to_string(),
                message: "document has no scenes".to_string(),
            })?;
        for node in scene.nodes() {
            root.add(convert_node(&node, &buffers));
        }
        Ok(root)
    }
}

fn convert_node(node: &gltf::Node<'_>, buffers: &[gltf::buffer::Data]) -> Object {
    let (translation, rotation, scale) = node.transform().decomposed();
    let mut object = Object::group(node.name().unwrap_or("node")).with_transform(Transform {
        translation: Vec3::from_array(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from_array(scale),
    });

    if let Some(mesh) = node.mesh() {
        let mut parts: Vec<ObjectContent> = mesh
            .primitives()
            .filter_map(|primitive| convert_primitive(&primitive, buffers))
            .collect();
        if parts.len() == 1 {
            object.content = parts.remove(0);
        } else {
            for (index, content) in parts.into_iter().enumerate() {
                object.add(Object {
                    name: format!("{}#{}", mesh.name().unwrap_or("primitive"), index),
                    content,
                    ..Object::default()
                });
            }
        }
    }

    for child in node.children() {
        object.add(convert_node(&child, buffers));
    }
    object
}

fn convert_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Option<ObjectContent> {
    use gltf::mesh::Mode;

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
    let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from_array).collect();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    match primitive.mode() {
        Mode::Triangles => Some(ObjectContent::Mesh(Mesh::with_bounds(positions, indices))),
        Mode::TriangleStrip => {
            let list = strip_to_list(&indices);
            Some(ObjectContent::Mesh(Mesh::with_bounds(positions, list)))
        }
        Mode::TriangleFan => {
            let list = fan_to_list(&indices);
            Some(ObjectContent::Mesh(Mesh::with_bounds(positions, list)))
        }
        Mode::Lines | Mode::LineStrip | Mode::LineLoop => Some(ObjectContent::Lines(
            indices
                .iter()
                .filter_map(|&i| positions.get(i as usize).copied())
                .collect(),
        )),
        Mode::Points => None,
    }
}

fn strip_to_list(indices: &[u32]) -> Vec<u32> {
    let mut list = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
    for (k, w) in indices.windows(3).enumerate() {
        if k % 2 == 0 {
            list.extend_from_slice(&[w[0], w[1], w[2]]);
        } else {
            list.extend_from_slice(&[w[1], w[0], w[2]]);
        }
    }
    list
}

fn fan_to_list(indices: &[u32]) -> Vec<u32> {
    let Some((&first, rest)) = indices.split_first() else {
        return Vec::new();
    };
    rest.windows(2)
        .flat_map(|w| [first, w[0], w[1]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{fan_to_list, strip_to_list, GltfLoader, LoadError, MeshFormat, MeshLoader};

    #[test]
    fn format_dispatches_on_extension() {
        assert_eq!(MeshFormat::from_url("models/chair.glb").unwrap(), MeshFormat::Glb);
        assert_eq!(MeshFormat::from_url("Scene.GLTF").unwrap(), MeshFormat::Gltf);
        assert_eq!(
            MeshFormat::from_url("https://cdn.test/a/model.glb?v=3#top").unwrap(),
            MeshFormat::Glb
        );
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = MeshFormat::from_url("models/chair.obj").unwrap_err();
        match err {
            LoadError::UnsupportedFormat { extension, .. } => assert_eq!(extension, "obj"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(MeshFormat::from_url("models.d/readme").is_err());
    }

    #[test]
    fn missing_file_is_a_transport_error() {
        let path = std::env::temp_dir().join("archviz_missing_model_for_test.glb");
        let _ = std::fs::remove_file(&path);
        let url = path.display().to_string();
        let err = GltfLoader::new().load_mesh(&url, MeshFormat::Glb).unwrap_err();
        assert!(matches!(err, LoadError::Transport { .. }), "{err:?}");
        assert_eq!(err.url(), url);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join("archviz_malformed_model_for_test.gltf");
        std::fs::write(&path, b"{ not json").unwrap();
        let err = GltfLoader::new()
            .load_mesh(&format!("file://{}", path.display()), MeshFormat::Gltf)
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }), "{err:?}");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn remote_urls_are_rejected() {
        let err = GltfLoader::new()
            .load_mesh("https://example.test/model.glb", MeshFormat::Glb)
            .unwrap_err();
        assert!(matches!(err, LoadError::Transport { .. }));
    }

    #[test]
    fn minimal_gltf_imports_as_triangle_mesh() {
        // One triangle; positions live in a sibling .bin referenced by a
        // relative uri, and the model path is relative to the loader's base.
        let dir = std::env::temp_dir().join("archviz_gltf_import_test");
        std::fs::create_dir_all(&dir).unwrap();
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let bytes: Vec<u8> = positions.iter().flat_map(|v| v.to_le_bytes()).collect();
        std::fs::write(dir.join("triangle.bin"), &bytes).unwrap();
        let json = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [{ "mesh": 0, "translation": [5.0, 0.0, 0.0] }],
  "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
  "buffers": [{ "byteLength": 36, "uri": "triangle.bin" }],
  "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
  "accessors": [{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
  }]
}"#;
        std::fs::write(dir.join("triangle.gltf"), json).unwrap();

        let object = GltfLoader::with_base_dir(&dir)
            .load_mesh("triangle.gltf", MeshFormat::Gltf)
            .unwrap();
        assert_eq!(object.name, "triangle.gltf");
        let node = &object.children[0];
        assert_eq!(node.transform.translation.x, 5.0);
        let mesh = node.mesh().unwrap();
        assert_eq!(mesh.positions().len(), 3);
        assert_eq!(mesh.triangle_count(), 1);

        // Without the base the relative path does not resolve.
        let err = GltfLoader::new()
            .load_mesh("triangle.gltf", MeshFormat::Gltf)
            .unwrap_err();
        assert!(matches!(err, LoadError::Transport { .. }), "{err:?}");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn strips_and_fans_become_lists() {
        assert_eq!(strip_to_list(&[0, 1, 2, 3]), vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(fan_to_list(&[0, 1, 2, 3]), vec![0, 1, 2, 0, 2, 3]);
        assert!(fan_to_list(&[]).is_empty());
    }
}
