use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::mpsc::{self, channel},
};

use anyhow::Context;

use crate::{
    asset::{MaterialLibrary, ObjModel},
    config::AssetPaths,
};

/// Where model files come from.
pub trait AssetSource: Send + Sync + 'static {
    fn fetch(&self, path: &Path) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// Reads assets from the local filesystem.
pub struct FileSource;

impl AssetSource for FileSource {
    fn fetch(&self, path: &Path) -> impl Future<Output = anyhow::Result<String>> + Send {
        let path = path.to_path_buf();

        async move {
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))
        }
    }
}

#[derive(Debug)]
pub enum LoadEvent {
    Loaded(ObjModel),
    MaterialFailed(anyhow::Error),
    GeometryFailed(anyhow::Error),
}

/// Fetches the material library, then the geometry bound to it. The geometry
/// is never requested when the materials fail.
pub async fn load_model<S: AssetSource>(
    source: &S,
    material_path: &Path,
    geometry_path: &Path,
) -> LoadEvent {
    let materials = source
        .fetch(material_path)
        .await
        .and_then(|text| MaterialLibrary::parse(&text))
        .with_context(|| format!("Failed to load materials from {}", material_path.display()));

    let mut materials = match materials {
        Ok(materials) => materials,
        Err(error) => {
            log::error!("Error loading MTL material: {error:#}");
            return LoadEvent::MaterialFailed(error);
        }
    };

    materials.preload();
    log::debug!("Loaded {} materials", materials.len());

    let model = source
        .fetch(geometry_path)
        .await
        .and_then(|text| ObjModel::parse(&text, &materials))
        .with_context(|| format!("Failed to load geometry from {}", geometry_path.display()));

    match model {
        Ok(model) => {
            log::info!(
                "Loaded {} with {} meshes and {} triangles",
                geometry_path.display(),
                model.mesh_count(),
                model.triangle_count()
            );
            LoadEvent::Loaded(model)
        }
        Err(error) => {
            log::error!("Error loading OBJ model: {error:#}");
            LoadEvent::GeometryFailed(error)
        }
    }
}

/// Runs the load sequence on a background runtime and hands the result to the
/// render loop.
pub struct ModelLoader {
    _runtime: tokio::runtime::Runtime,
    receiver: mpsc::Receiver<LoadEvent>,
}

impl ModelLoader {
    pub fn spawn<S: AssetSource>(source: S, paths: &AssetPaths) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("model-loader")
            .build()
            .context("Failed to create model loader runtime")?;

        let (sender, receiver) = channel();
        let material_path: PathBuf = paths.material_library();
        let geometry_path: PathBuf = paths.geometry();

        runtime.spawn(async move {
            let event = load_model(&source, &material_path, &geometry_path).await;

            if sender.send(event).is_err() {
                log::warn!("Model loaded after the viewer was dropped");
            }
        });

        Ok(Self {
            _runtime: runtime,
            receiver,
        })
    }

    /// Returns the load result once it is available.
    pub fn poll(&self) -> Option<LoadEvent> {
        self.receiver.try_recv().ok()
    }
}
