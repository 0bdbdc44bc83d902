use super::bounds::Aabb;
use glam::Vec3;

/// Indexed triangle mesh in object-local space.
///
/// Positions are private so the cached local bounds can never go stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    bounds: Option<Aabb>,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            bounds: None,
        }
    }

    /// Same as [`Mesh::new`] but with the local bounds computed up front.
    pub fn with_bounds(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let mut mesh = Self::new(positions, indices);
        mesh.compute_bounds();
        mesh
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn compute_bounds(&mut self) {
        self.bounds = Some(Aabb::from_points(self.positions.iter().copied()));
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles as position triples. Triangles referencing out-of-range
    /// vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let a = *self.positions.get(tri[0] as usize)?;
            let b = *self.positions.get(tri[1] as usize)?;
            let c = *self.positions.get(tri[2] as usize)?;
            Some([a, b, c])
        })
    }

    pub fn translate(&mut self, offset: Vec3) {
        for position in &mut self.positions {
            *position += offset;
        }
        if let Some(bounds) = &mut self.bounds {
            *bounds = bounds.translated(offset);
        }
    }

    /// Moves the geometry so its bounding box is centered on the origin and
    /// returns the previous center.
    pub fn center(&mut self) -> Vec3 {
        let bounds = Aabb::from_points(self.positions.iter().copied());
        if bounds.is_empty() {
            return Vec3::ZERO;
        }
        let center = bounds.center();
        self.translate(-center);
        self.bounds = Some(bounds.translated(-center));
        center
    }
}

#[cfg(test)]
mod tests {
    use super::Mesh;
    use glam::Vec3;

    #[test]
    fn center_moves_bounds_to_origin() {
        let mut mesh = Mesh::new(
            vec![Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 5.0, 1.0), Vec3::new(1.0, 1.0, 3.0)],
            vec![0, 1, 2],
        );
        let previous = mesh.center();
        assert_eq!(previous, Vec3::new(2.0, 3.0, 2.0));
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.center(), Vec3::ZERO);
        assert_eq!(mesh.positions()[0], Vec3::new(-1.0, -2.0, -1.0));
    }

    #[test]
    fn out_of_range_triangles_are_skipped() {
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2, 0, 1, 9]);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles().count(), 1);
    }
}
