use glam::Vec3;
use id_arena::Id;

use crate::scene_graph::scene_mesh::SceneMeshId;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub mesh_id: Option<SceneMeshId>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Object3D {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn mesh(name: impl Into<String>, mesh_id: SceneMeshId) -> Self {
        Self {
            name: name.into(),
            mesh_id: Some(mesh_id),
            ..Default::default()
        }
    }

    pub fn is_mesh(&self) -> bool {
        self.mesh_id.is_some()
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::from_translation(Vec3::ZERO),
            mesh_id: None,
            parent_id: None,
            child_ids: Vec::new(),
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}
