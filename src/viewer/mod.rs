//! Spinning showcase of a single OBJ model with horizontal-only orbiting.

pub mod lights;
pub mod loader;
pub mod orbit_controls;

use std::f32::consts::TAU;

use glam::{Quat, Vec2, Vec3};

use crate::{
    asset::ObjModel,
    camera::Camera,
    config::ModelViewerConfig,
    scene_graph::{Object3D, ObjectId, Scene},
};

use self::{lights::LightRig, loader::LoadEvent, orbit_controls::OrbitControls};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy)]
pub struct LoadedModel {
    /// Group that carries the presentation scale and spin.
    pub container: ObjectId,
    pub asset_root: ObjectId,
}

pub struct ModelViewer {
    pub scene: Scene,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub lights: LightRig,
    pub exposure: f32,
    model: Option<LoadedModel>,
    load_state: LoadState,
    loading_indicator_visible: bool,
    rotation_y: f32,
    rotation_step: f32,
    model_offset: Vec3,
    model_scale: f32,
    container_size: Vec2,
}

impl ModelViewer {
    pub fn new(config: &ModelViewerConfig) -> Self {
        let mut camera = Camera::perspective(config.camera_position, 75.0, 1.0);

        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = true;
        controls.damping_factor = config.damping_factor;
        controls.rotate_speed = config.rotate_speed;
        controls.update(&mut camera);
        controls.lock_polar_angle();

        Self {
            scene: Scene::new(),
            camera,
            controls,
            lights: LightRig::showcase(config.shadow_map_size),
            exposure: config.exposure,
            model: None,
            load_state: LoadState::Loading,
            loading_indicator_visible: true,
            rotation_y: config.initial_rotation.rem_euclid(TAU),
            rotation_step: config.rotation_step,
            model_offset: config.model_offset,
            model_scale: config.model_scale,
            container_size: Vec2::ZERO,
        }
    }

    #[cfg(test)]
    pub fn model(&self) -> Option<LoadedModel> {
        self.model
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading_indicator_visible(&self) -> bool {
        self.loading_indicator_visible
    }

    #[cfg(test)]
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    #[cfg(test)]
    pub fn container_size(&self) -> Vec2 {
        self.container_size
    }

    pub fn apply_load_event(&mut self, event: LoadEvent) {
        if self.load_state != LoadState::Loading {
            log::warn!("Ignoring model load result, viewer is already {:?}", self.load_state);
            return;
        }

        match event {
            LoadEvent::Loaded(model) => {
                self.add_model(model);
                self.load_state = LoadState::Loaded;
                self.loading_indicator_visible = false;
            }
            // The loading indicator is left alone, nothing else will happen.
            LoadEvent::MaterialFailed(_) => {
                self.load_state = LoadState::Failed;
            }
            LoadEvent::GeometryFailed(_) => {
                self.load_state = LoadState::Failed;
                self.loading_indicator_visible = false;
            }
        }
    }

    fn add_model(&mut self, model: ObjModel) {
        let container = self.scene.add_object(Object3D::group("Model container"));
        let asset_root = self.scene.spawn_obj_model("Model", model);
        self.scene.set_object_parent(asset_root, Some(container));

        if let Some(root) = self.scene.get_object_mut(asset_root) {
            root.transform.set_translation(self.model_offset);
        }

        if let Some(container) = self.scene.get_object_mut(container) {
            container.transform.set_scale(self.model_scale);
            container.transform.set_rotation(Quat::from_rotation_y(self.rotation_y));
        }

        let mut mesh_count = 0;
        self.scene.traverse(asset_root, |_, object| {
            if object.is_mesh() {
                object.cast_shadow = true;
                object.receive_shadow = true;
                mesh_count += 1;
            }
        });
        log::debug!("Enabled shadows on {mesh_count} meshes");

        self.scene.update_world_matrices();
        self.model = Some(LoadedModel {
            container,
            asset_root,
        });
    }

    /// Tracks the size of the element the viewer draws into.
    pub fn resize_container(&mut self, size: Vec2) {
        if size == self.container_size {
            return;
        }

        self.container_size = size;
        self.camera.set_aspect(size.x, size.y);
    }

    pub fn orbit(&mut self, drag: Vec2) {
        self.controls.rotate_by_drag(drag, self.container_size.y);
    }

    pub fn update(&mut self) {
        if let Some(model) = self.model {
            self.rotation_y = (self.rotation_y + self.rotation_step).rem_euclid(TAU);

            if let Some(container) = self.scene.get_object_mut(model.container) {
                container
                    .transform
                    .set_rotation(Quat::from_rotation_y(self.rotation_y));
            }
        }

        self.controls.update(&mut self.camera);
        self.scene.update_world_matrices();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        asset::MaterialLibrary,
        viewer::loader::tests::{GEOMETRY, MATERIALS},
    };

    fn loaded_event() -> LoadEvent {
        let materials = MaterialLibrary::parse(MATERIALS).unwrap();
        LoadEvent::Loaded(ObjModel::parse(GEOMETRY, &materials).unwrap())
    }

    #[test]
    fn vertical_orbit_is_locked_at_startup_angle() {
        let config = ModelViewerConfig::default();
        let viewer = ModelViewer::new(&config);

        let expected = (config.camera_position.y / config.camera_position.length()).acos();
        assert_eq!(viewer.controls.min_polar_angle, viewer.controls.max_polar_angle);
        assert!((viewer.controls.min_polar_angle - expected).abs() < 1e-5);
    }

    #[test]
    fn loaded_model_is_shadowed_and_hides_indicator() {
        let mut viewer = ModelViewer::new(&ModelViewerConfig::default());
        assert!(viewer.is_loading_indicator_visible());

        viewer.apply_load_event(loaded_event());

        assert_eq!(viewer.load_state(), LoadState::Loaded);
        assert!(viewer.model().is_some());
        assert!(!viewer.is_loading_indicator_visible());

        let instances = viewer.scene.mesh_instances().collect::<Vec<_>>();
        assert_eq!(instances.len(), 1);
        assert!(instances[0].cast_shadow && instances[0].receive_shadow);
    }

    #[test]
    fn material_failure_keeps_model_empty() {
        let mut viewer = ModelViewer::new(&ModelViewerConfig::default());
        viewer.apply_load_event(LoadEvent::MaterialFailed(anyhow::anyhow!("404")));

        assert_eq!(viewer.load_state(), LoadState::Failed);
        assert!(viewer.model().is_none());
        assert!(viewer.is_loading_indicator_visible());
        assert_eq!(viewer.scene.objects.len(), 0);
    }

    #[test]
    fn geometry_failure_hides_indicator_without_model() {
        let mut viewer = ModelViewer::new(&ModelViewerConfig::default());
        viewer.apply_load_event(LoadEvent::GeometryFailed(anyhow::anyhow!("404")));

        assert_eq!(viewer.load_state(), LoadState::Failed);
        assert!(viewer.model().is_none());
        assert!(!viewer.is_loading_indicator_visible());
    }

    #[test]
    fn model_is_populated_only_once() {
        let mut viewer = ModelViewer::new(&ModelViewerConfig::default());
        viewer.apply_load_event(loaded_event());
        let first = viewer.model().map(|model| model.container);

        viewer.apply_load_event(loaded_event());

        assert_eq!(viewer.model().map(|model| model.container), first);
        assert_eq!(viewer.scene.mesh_instances().count(), 1);
    }

    #[test]
    fn rotation_advances_by_fixed_step_each_frame() {
        let config = ModelViewerConfig::default();
        let mut viewer = ModelViewer::new(&config);

        // No model, no spin
        let before = viewer.rotation_y();
        viewer.update();
        assert_eq!(viewer.rotation_y(), before);

        viewer.apply_load_event(loaded_event());

        for _ in 0..2000 {
            let before = viewer.rotation_y();
            viewer.update();
            let advanced = (viewer.rotation_y() - before).rem_euclid(TAU);
            assert!((advanced - config.rotation_step).abs() < 1e-4, "{advanced}");
            assert!(viewer.rotation_y() >= 0.0 && viewer.rotation_y() < TAU);
        }
    }

    #[test]
    fn model_sits_offset_from_the_spin_axis() {
        let config = ModelViewerConfig::default();
        let mut viewer = ModelViewer::new(&config);
        viewer.apply_load_event(loaded_event());

        let root = viewer.model().unwrap().asset_root;
        let world = viewer.scene.get_object(root).unwrap().transform.world_matrix();
        let origin = world.transform_point3(Vec3::ZERO);

        // Offset by -5 on Z, scaled by 1.5 and turned half way around
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 0.0, 7.5), 1e-3), "{origin}");
    }

    #[test]
    fn container_resize_updates_aspect() {
        let mut viewer = ModelViewer::new(&ModelViewerConfig::default());
        viewer.resize_container(Vec2::new(600.0, 400.0));
        assert_eq!(viewer.camera.aspect, 1.5);
        assert_eq!(viewer.container_size(), Vec2::new(600.0, 400.0));
    }
}
