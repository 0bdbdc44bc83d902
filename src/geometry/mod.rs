pub mod bounds;
pub mod mesh;
pub mod primitives;
pub mod ray;
pub mod solid;
pub mod wall;
pub mod wireframe;

pub use bounds::{Aabb, Obb};
pub use mesh::Mesh;
pub use ray::{Plane, Ray};
pub use solid::{subtract_solid, PlacedMesh, SolidModeler};
pub use wall::{room_walls, straight_wall, WallGeometry};
pub use wireframe::wireframe_strip;
