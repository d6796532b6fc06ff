use id_arena::Id;

use crate::{mesh::MeshData, rendering::render_mesh::RenderMeshId};

pub type SceneMeshId = Id<SceneMesh>;

pub struct SceneMesh {
    pub mesh: MeshData,
    /// Set by the renderer once the mesh has been uploaded.
    pub render_mesh: Option<RenderMeshId>,
}

impl SceneMesh {
    pub fn new(mesh: MeshData) -> Self {
        Self {
            mesh,
            render_mesh: None,
        }
    }
}
