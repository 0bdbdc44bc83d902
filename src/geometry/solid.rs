use super::mesh::Mesh;
use glam::Mat4;

/// A mesh placed relative to the base solid of a boolean operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMesh {
    pub mesh: Mesh,
    pub transform: Mat4,
}

impl PlacedMesh {
    pub fn new(mesh: Mesh, transform: Mat4) -> Self {
        Self { mesh, transform }
    }
}

/// Boolean solid modelling backend. The viewport only consumes the resulting
/// mesh and never inspects how it was produced.
pub trait SolidModeler {
    /// `base` minus the union of `tools`, in the base's local space.
    fn subtract(&self, base: &Mesh, tools: &[PlacedMesh]) -> Mesh;
}

/// Runs `modeler` and returns the result with local bounds computed, ready
/// to hand to a scene node.
pub fn subtract_solid(modeler: &dyn SolidModeler, base: &Mesh, tools: &[PlacedMesh]) -> Mesh {
    let mut mesh = modeler.subtract(base, tools);
    mesh.compute_bounds();
    log::debug!(
        "solid subtract: {} tools, {} -> {} triangles",
        tools.len(),
        base.triangle_count(),
        mesh.triangle_count()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::{subtract_solid, PlacedMesh, SolidModeler};
    use crate::geometry::mesh::Mesh;
    use crate::geometry::primitives::{box_mesh, sphere_mesh};
    use glam::{Mat4, Vec3};

    /// Drops base triangles whose centroid falls inside any tool's bounds.
    struct BoundsCarver;

    impl SolidModeler for BoundsCarver {
        fn subtract(&self, base: &Mesh, tools: &[PlacedMesh]) -> Mesh {
            let boxes: Vec<_> = tools
                .iter()
                .filter_map(|t| t.mesh.bounds().map(|b| b.transformed(t.transform)))
                .collect();
            let mut indices = Vec::new();
            for tri in base.indices().chunks_exact(3) {
                let centroid = tri
                    .iter()
                    .map(|&i| base.positions()[i as usize])
                    .sum::<Vec3>()
                    / 3.0;
                if !boxes.iter().any(|b| b.contains_point(centroid)) {
                    indices.extend_from_slice(tri);
                }
            }
            Mesh::new(base.positions().to_vec(), indices)
        }
    }

    #[test]
    fn subtract_result_has_bounds() {
        let base = box_mesh(Vec3::new(4.0, 4.0, 0.3));
        let tools = [
            PlacedMesh::new(box_mesh(Vec3::splat(10.0)), Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))),
            PlacedMesh::new(sphere_mesh(0.2, 8, 4), Mat4::from_translation(Vec3::new(0.0, 0.0, 0.2))),
        ];
        let result = subtract_solid(&BoundsCarver, &base, &tools);
        assert!(result.bounds().is_some());
        assert!(result.triangle_count() < base.triangle_count());
    }
}
