use std::time::Duration;

/// Tunables of a viewer session. The defaults reproduce the classic viewer
/// setup: 35° perspective, camera five units back, Tipsify cache of 24.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub resolution: na::Vector2<u32>,
    pub fovy: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub camera_distance: f32,
    pub cache_size: usize,
    pub fps_window: Duration,
    /// Fraction of the remaining distance kept per wheel notch.
    pub dolly_factor: f32,
    pub key_rotation_step: f32,
    pub key_translation_step: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            resolution: *super::DEFAULT_RESOLUTION,
            fovy: 35.0_f32.to_radians(),
            z_near: 0.001,
            z_far: 100.0,
            camera_distance: 5.0,
            cache_size: 24,
            fps_window: Duration::from_secs_f64(3.5),
            dolly_factor: 0.85,
            key_rotation_step: std::f32::consts::PI / 18.0,
            key_translation_step: 0.5,
        }
    }
}
