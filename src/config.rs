//! Application configuration
//!
//! All tunables live here with defaults matching the shipped forest scene.
//! There are no command-line arguments; a couple of environment variables
//! can override where assets come from and how the scenery is seeded.

use std::path::PathBuf;

use cgmath::Point3;

/// Environment variable overriding the asset root directory
pub const ASSETS_ENV: &str = "WOODLAND_ASSETS";
/// Environment variable fixing the layout RNG seed
pub const SEED_ENV: &str = "WOODLAND_SEED";

/// Camera start state and zoom limits
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub position: Point3<f32>,
    /// Yaw in degrees; 180 looks down -Z
    pub yaw: f32,
    pub pitch: f32,
    /// Rotations applied after construction, in order, as (yaw, pitch) degrees
    pub initial_rotations: [(f32, f32); 2],
    pub fov: f32,
    pub min_fov: f32,
    pub max_fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(-80.0, 50.0, 80.0),
            yaw: 180.0,
            pitch: 0.0,
            initial_rotations: [(-100.0, -20.0), (60.0, 0.0)],
            fov: 45.0,
            min_fov: 1.0,
            max_fov: 120.0,
        }
    }
}

/// Input sensitivities
#[derive(Debug, Clone, Copy)]
pub struct ControlConfig {
    /// World units per second
    pub move_speed: f32,
    /// Degrees of rotation per pixel of mouse motion
    pub mouse_sensitivity: f32,
    /// Degrees of FOV change per scroll line
    pub zoom_sensitivity: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            move_speed: 15.0,
            mouse_sensitivity: 0.1,
            zoom_sensitivity: -3.0,
        }
    }
}

/// Fixed clip planes for the perspective projection
#[derive(Debug, Clone, Copy)]
pub struct ProjectionConfig {
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 600.0,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    /// Logical window size; the surface itself uses physical pixels
    pub window_size: (u32, u32),
    pub clear_color: wgpu::Color,
    pub asset_root: PathBuf,
    pub seed: Option<u64>,
    pub camera: CameraConfig,
    pub controls: ControlConfig,
    pub projection: ProjectionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Woodland - Multiple Lights".to_string(),
            window_size: (1600, 900),
            clear_color: wgpu::Color {
                r: 0.06,
                g: 0.06,
                b: 0.07,
                a: 1.0,
            },
            asset_root: PathBuf::from("assets"),
            seed: None,
            camera: CameraConfig::default(),
            controls: ControlConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults with `WOODLAND_ASSETS` / `WOODLAND_SEED` applied
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            std::env::var(ASSETS_ENV).ok(),
            std::env::var(SEED_ENV).ok(),
        )
    }

    fn with_overrides(mut self, assets: Option<String>, seed: Option<String>) -> Self {
        if let Some(root) = assets.filter(|s| !s.trim().is_empty()) {
            self.asset_root = PathBuf::from(root);
        }

        if let Some(raw) = seed {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(e) => log::warn!("ignoring {SEED_ENV}={raw:?}: {e}"),
            }
        }

        self
    }
}
