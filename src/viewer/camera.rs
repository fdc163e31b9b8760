use crate::common::{Camera, ViewerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DollyDirection {
    Closer,
    Away,
}

/// Owns the viewer camera and applies zoom, translation and viewport
/// changes to it.
pub struct CameraRig {
    camera: Camera,
    dolly_factor: f32,
    log: slog::Logger,
}

impl CameraRig {
    pub fn new(log: &slog::Logger, camera: Camera, dolly_factor: f32) -> Self {
        let log = log.new(o!("camera controller" => "rig"));
        Self {
            camera,
            dolly_factor,
            log,
        }
    }

    pub fn from_config(log: &slog::Logger, config: &ViewerConfig) -> Self {
        Self::new(log, Camera::from_config(config), config.dolly_factor)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> &na::Vector2<u32> {
        &self.camera.viewport
    }

    pub fn set_viewport(&mut self, size: &na::Vector2<u32>) {
        self.camera.set_viewport(size);
        debug!(self.log, "viewport is now {}x{}", size.x, size.y);
    }

    /// Moves the camera along its own Z axis.
    pub fn translate(&mut self, z: f32) {
        self.camera.cam_to_world *= na::Translation3::new(0.0, 0.0, z);
        trace!(self.log, "camera is now at: {:?}", self.camera.cam_to_world);
    }

    /// Moves a fixed fraction of the distance between the near plane and the
    /// origin, so steps shrink as the camera closes in and never overshoot.
    pub fn dolly(&mut self, direction: DollyDirection) {
        let distance = self.camera.cam_to_world.translation.z - 0.0 - self.camera.z_near();
        let step = match direction {
            DollyDirection::Closer => distance * (1.0 - 1.0 / self.dolly_factor),
            DollyDirection::Away => distance * (1.0 - self.dolly_factor),
        };
        self.translate(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig_at(z: f32, z_near: f32) -> CameraRig {
        let log = slog::Logger::root(slog::Discard, o!());
        let camera = Camera::new(
            &na::Isometry3::translation(0.0, 0.0, z),
            35.0f32.to_radians(),
            z_near,
            100.0,
            &na::Vector2::new(640, 480),
        );
        CameraRig::new(&log, camera, 0.85)
    }

    fn z(rig: &CameraRig) -> f32 {
        rig.camera().cam_to_world.translation.z
    }

    #[test]
    fn test_dolly_closer_arithmetic() {
        // one unit between the camera and the near plane
        let mut rig = rig_at(1.5, 0.5);
        rig.dolly(DollyDirection::Closer);
        let step = 1.0f32 * (1.0 - 1.0 / 0.85);
        assert_eq!(z(&rig), 1.5 + step);
        approx::assert_relative_eq!(z(&rig) - 0.5, 2.0 - 1.0 / 0.85, epsilon = 0.000_001);
    }

    #[test]
    fn test_dolly_away_arithmetic() {
        let mut rig = rig_at(1.5, 0.5);
        rig.dolly(DollyDirection::Away);
        assert_eq!(z(&rig), 1.5 + 1.0f32 * (1.0 - 0.85));
    }

    #[test]
    fn test_dolly_steps_scale_with_distance() {
        let mut near = rig_at(1.5, 0.5);
        let mut far = rig_at(10.5, 0.5);
        near.dolly(DollyDirection::Away);
        far.dolly(DollyDirection::Away);
        approx::assert_relative_eq!(z(&far) - 10.5, 10.0 * (z(&near) - 1.5), epsilon = 0.000_01);

        let mut rig = rig_at(5.0, 0.001);
        let mut last = z(&rig);
        for _ in 0..5 {
            rig.dolly(DollyDirection::Away);
            let now = z(&rig);
            assert!(now > last);
            last = now;
        }
    }

    #[test]
    fn test_translate_and_resize() {
        let mut rig = rig_at(5.0, 0.001);
        rig.translate(-0.5);
        approx::assert_relative_eq!(z(&rig), 4.5, epsilon = 0.000_001);

        rig.set_viewport(&na::Vector2::new(1024, 512));
        assert_eq!(*rig.viewport(), na::Vector2::new(1024, 512));
        approx::assert_relative_eq!(rig.camera().cam_to_screen.aspect(), 2.0, epsilon = 0.000_001);
    }
}
