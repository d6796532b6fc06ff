use glam::Mat4;
use id_arena::Arena;

use crate::asset::ObjModel;
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_mesh::{SceneMesh, SceneMeshId};

/// A mesh node flattened for drawing.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance {
    pub object_id: ObjectId,
    pub mesh_id: SceneMeshId,
    pub world_matrix: Mat4,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub meshes: Arena<SceneMesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            meshes: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    /// Allocates `object` and attaches it under `parent`.
    pub fn add_child(&mut self, parent: ObjectId, object: Object3D) -> ObjectId {
        let object_id = self.add_object(object);
        self.set_object_parent(object_id, Some(parent));
        object_id
    }

    #[cfg(test)]
    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    pub fn add_mesh(&mut self, mesh: SceneMesh) -> SceneMeshId {
        self.meshes.alloc(mesh)
    }

    pub fn get_mesh(&self, id: SceneMeshId) -> Option<&SceneMesh> {
        self.meshes.get(id)
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        let old_parent_id = self.objects.get(child_id).and_then(|child| child.parent_id);

        if let Some(old_parent) = old_parent_id.and_then(|id| self.objects.get_mut(id)) {
            old_parent.child_ids.retain(|&id| id != child_id);
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;
        }

        if let Some(new_parent) = new_parent_id.and_then(|id| self.objects.get_mut(id)) {
            new_parent.child_ids.push(child_id);
        }
    }

    /// Adds an OBJ model as a subtree: one group per OBJ object with one mesh
    /// node per material run. Returns the root group.
    pub fn spawn_obj_model(&mut self, name: &str, model: ObjModel) -> ObjectId {
        let root = self.add_object(Object3D::group(name));

        for object in model.objects {
            let group = self.add_child(root, Object3D::group(object.name));

            for mesh in object.meshes {
                let mesh_name = mesh.name.clone();
                let mesh_id = self.add_mesh(SceneMesh::new(mesh));
                self.add_child(group, Object3D::mesh(mesh_name, mesh_id));
            }
        }

        root
    }

    /// Visits `root` and all of its descendants depth-first, parents before
    /// children, in child order.
    pub fn traverse<F>(&mut self, root: ObjectId, mut visitor: F)
    where
        F: FnMut(ObjectId, &mut Object3D),
    {
        let mut stack = vec![root];

        while let Some(object_id) = stack.pop() {
            let Some(object) = self.objects.get_mut(object_id) else {
                continue;
            };

            visitor(object_id, object);
            stack.extend(object.child_ids.iter().rev().copied());
        }
    }

    /// Recomputes world matrices from the roots down.
    pub fn update_world_matrices(&mut self) {
        let mut stack = self
            .objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| (id, Mat4::IDENTITY))
            .collect::<Vec<_>>();

        while let Some((object_id, parent_world_matrix)) = stack.pop() {
            let Some(object) = self.objects.get_mut(object_id) else {
                continue;
            };

            let world_matrix = parent_world_matrix * object.transform.local_matrix();
            object.transform.set_world_matrix(world_matrix);

            stack.extend(object.child_ids.iter().map(|&child| (child, world_matrix)));
        }
    }

    pub fn mesh_instances(&self) -> impl Iterator<Item = MeshInstance> + '_ {
        self.objects.iter().filter_map(|(object_id, object)| {
            object.mesh_id.map(|mesh_id| MeshInstance {
                object_id,
                mesh_id,
                world_matrix: object.transform.world_matrix(),
                cast_shadow: object.cast_shadow,
                receive_shadow: object.receive_shadow,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::asset::{MaterialLibrary, ObjModel};

    const TWO_OBJECTS: &str = "
o Body
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o Tail
f 1 3 2
";

    fn spawn_model(scene: &mut Scene) -> ObjectId {
        let model = ObjModel::parse(TWO_OBJECTS, &MaterialLibrary::default()).unwrap();
        scene.spawn_obj_model("Model", model)
    }

    #[test]
    fn traversal_visits_parents_before_children() {
        let mut scene = Scene::new();
        let root = spawn_model(&mut scene);

        let mut names = Vec::new();
        scene.traverse(root, |_, object| names.push(object.name.clone()));

        assert_eq!(names, ["Model", "Body", "Body", "Tail", "Tail"]);
    }

    #[test]
    fn traversal_reaches_every_mesh() {
        let mut scene = Scene::new();
        let container = scene.add_object(Object3D::group("Container"));
        let root = spawn_model(&mut scene);
        scene.set_object_parent(root, Some(container));

        scene.traverse(container, |_, object| {
            if object.is_mesh() {
                object.cast_shadow = true;
                object.receive_shadow = true;
            }
        });

        let instances = scene.mesh_instances().collect::<Vec<_>>();
        assert_eq!(instances.len(), 2);
        assert!(instances
            .iter()
            .all(|instance| instance.cast_shadow && instance.receive_shadow));

        let container = scene.get_object(container).unwrap();
        assert!(!container.cast_shadow);
    }

    #[test]
    fn world_matrices_compose_parent_transforms() {
        let mut scene = Scene::new();
        let parent = scene.add_object(Object3D::group("Parent"));
        let child = scene.add_child(parent, Object3D::group("Child"));

        {
            let parent = scene.get_object_mut(parent).unwrap();
            parent.transform.set_scale(2.0);
            parent.transform.set_rotation(Quat::from_rotation_y(std::f32::consts::PI));
        }
        scene
            .get_object_mut(child)
            .unwrap()
            .transform
            .set_translation(Vec3::new(0.0, 0.0, -5.0));

        scene.update_world_matrices();

        let world = scene.get_object(child).unwrap().transform.world_matrix();
        let position = world.transform_point3(Vec3::ZERO);
        assert!(position.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-4), "{position}");
    }

    #[test]
    fn reparenting_updates_child_lists() {
        let mut scene = Scene::new();
        let a = scene.add_object(Object3D::group("A"));
        let b = scene.add_object(Object3D::group("B"));
        let child = scene.add_child(a, Object3D::group("Child"));

        scene.set_object_parent(child, Some(b));

        assert!(scene.get_object(a).unwrap().child_ids.is_empty());
        assert_eq!(scene.get_object(b).unwrap().child_ids, vec![child]);
    }
}
