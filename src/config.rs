use std::path::PathBuf;

use glam::Vec3;

const BASE_PATH_ENV: &str = "PORTFOLIO_BASE_PATH";

#[derive(Debug, Clone)]
pub struct ParticleFieldConfig {
    pub count: usize,
    /// Spawn box is `[-extent, extent)` on every axis.
    pub spawn_extent: Vec3,
    /// Velocity components are drawn from `[-max_speed, max_speed)`.
    pub max_speed: f32,
    pub bounds: Vec3,
    pub rotation_step: f32,
    pub radius: f32,
    pub segments: u32,
    pub primary_color: u32,
    pub secondary_color: u32,
    /// Draw a separate interpolation factor for every particle instead of one
    /// shared by the whole field.
    pub per_particle_color: bool,
    pub camera_distance: f32,
    pub pointer_influence: f32,
    pub camera_easing: f32,
}

impl Default for ParticleFieldConfig {
    fn default() -> Self {
        Self {
            count: 300,
            spawn_extent: Vec3::new(10.0, 10.0, 5.0),
            max_speed: 0.005,
            bounds: Vec3::new(10.0, 10.0, 5.0),
            rotation_step: 0.01,
            radius: 0.02,
            segments: 8,
            primary_color: 0xff0056,
            secondary_color: 0xf3682b,
            per_particle_color: false,
            camera_distance: 5.0,
            pointer_influence: 0.5,
            camera_easing: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelViewerConfig {
    pub camera_position: Vec3,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub rotation_step: f32,
    pub model_offset: Vec3,
    pub model_scale: f32,
    pub initial_rotation: f32,
    pub shadow_map_size: u32,
    pub exposure: f32,
}

impl Default for ModelViewerConfig {
    fn default() -> Self {
        Self {
            camera_position: Vec3::new(10.0, 10.0, 18.0),
            damping_factor: 0.05,
            rotate_speed: 1.0,
            rotation_step: 0.005,
            model_offset: Vec3::new(0.0, 0.0, -5.0),
            model_scale: 1.5,
            initial_rotation: std::f32::consts::PI,
            shadow_map_size: 2048,
            exposure: 1.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageConfig {
    pub navbar_offset: f32,
    pub active_link_offset: f32,
    pub mobile_breakpoint: f32,
    pub counter_duration_ms: u64,
    pub counter_tick_ms: u64,
    pub counter_suffix: &'static str,
    pub typewriter_delay_ms: u64,
    pub typewriter_char_ms: u64,
    pub reveal_threshold: f32,
    pub reveal_bottom_margin: f32,
    pub stats_threshold: f32,
    pub fade_in_secs: f32,
    pub scroll_easing: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            navbar_offset: 70.0,
            active_link_offset: 100.0,
            mobile_breakpoint: 768.0,
            counter_duration_ms: 2000,
            counter_tick_ms: 16,
            counter_suffix: "+",
            typewriter_delay_ms: 1000,
            typewriter_char_ms: 100,
            reveal_threshold: 0.1,
            reveal_bottom_margin: 50.0,
            stats_threshold: 0.5,
            fade_in_secs: 0.6,
            scroll_easing: 0.15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub base: PathBuf,
}

impl AssetPaths {
    pub fn from_env() -> Self {
        Self::from_base(std::env::var(BASE_PATH_ENV).ok())
    }

    /// An unset or empty base falls back to the bundled `assets` folder.
    pub fn from_base(base: Option<String>) -> Self {
        match base {
            Some(base) if !base.is_empty() => Self {
                base: PathBuf::from(base),
            },
            _ => Self::default(),
        }
    }

    pub fn material_library(&self) -> PathBuf {
        self.base.join("model").join("model.mtl")
    }

    pub fn geometry(&self) -> PathBuf {
        self.base.join("model").join("model.obj")
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            base: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PortfolioConfig {
    pub particles: ParticleFieldConfig,
    pub viewer: ModelViewerConfig,
    pub page: PageConfig,
    pub assets: AssetPaths,
}

impl PortfolioConfig {
    pub fn from_env() -> Self {
        Self {
            assets: AssetPaths::from_env(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn base_path_override_moves_both_model_files() {
        let paths = AssetPaths::from_base(Some("/srv/portfolio".to_string()));

        assert_eq!(paths.material_library(), Path::new("/srv/portfolio/model/model.mtl"));
        assert_eq!(paths.geometry(), Path::new("/srv/portfolio/model/model.obj"));
    }

    #[test]
    fn missing_or_empty_base_path_uses_bundled_assets() {
        for base in [None, Some(String::new())] {
            let paths = AssetPaths::from_base(base);
            assert_eq!(paths.geometry(), Path::new("assets/model/model.obj"));
        }
    }
}
