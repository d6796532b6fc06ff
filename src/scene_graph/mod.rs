pub mod object3d;
pub mod scene;
pub mod scene_mesh;
pub mod transform;

pub use object3d::{Object3D, ObjectId};
pub use scene::{MeshInstance, Scene};
pub use scene_mesh::{SceneMesh, SceneMeshId};
pub use transform::Transform;
