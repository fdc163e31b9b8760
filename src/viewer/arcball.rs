const DEGENERATE_EPSILON: f32 = 0.001;

/// Incremental rotation produced by one pointer motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcballRotation {
    pub axis: glm::Vec3,
    pub angle: f32,
}

/// Trackball that turns pointer drags into rotations about a virtual sphere
/// centered in the viewport.
#[derive(Clone)]
pub struct ArcballController {
    last_point: glm::Vec3,
    log: slog::Logger,
}

/// Maps a pixel position onto the unit sphere. Inside the unit disk the
/// point is lifted onto the front hemisphere; outside it stays on the z = 0
/// sheet, which meets the hemisphere at the rim, so the mapping is
/// continuous everywhere.
pub fn project_to_sphere(point: &na::Point2<f32>, viewport: &na::Vector2<u32>) -> glm::Vec3 {
    let w = viewport.x.max(1) as f32;
    let h = viewport.y.max(1) as f32;
    let x = point.x * 2.0 / w - 1.0;
    let y = -(point.y * 2.0 / h - 1.0);

    let length_squared = x * x + y * y;
    let z = if length_squared > 1.0 {
        0.0
    } else {
        (1.0 - length_squared).sqrt()
    };

    let result = glm::vec3(x, y, z);
    let length = glm::length(&result);
    if length.is_finite() && length > 0.0 {
        result / length
    } else {
        glm::vec3(0.0, 0.0, 1.0)
    }
}

impl ArcballController {
    pub fn new(log: &slog::Logger) -> Self {
        let log = log.new(o!("controller" => "arcball"));
        Self {
            last_point: glm::Vec3::zeros(),
            log,
        }
    }

    pub fn is_dragging(&self) -> bool {
        glm::length(&self.last_point) >= DEGENERATE_EPSILON
    }

    pub fn last_point(&self) -> &glm::Vec3 {
        &self.last_point
    }

    pub fn on_pointer_down(&mut self, point: &na::Point2<f32>, viewport: &na::Vector2<u32>) {
        self.last_point = project_to_sphere(point, viewport);
        trace!(self.log, "drag started at {:?}", self.last_point);
    }

    pub fn on_pointer_up(&mut self) {
        self.last_point = glm::Vec3::zeros();
    }

    /// Rotation from the previous sphere point to the one under `point`.
    /// Nothing is produced while no drag is active or when the two points
    /// are too close to give a well-defined axis.
    pub fn on_pointer_move(
        &mut self,
        point: &na::Point2<f32>,
        viewport: &na::Vector2<u32>,
    ) -> Option<ArcballRotation> {
        if !self.is_dragging() {
            return None;
        }

        let current = project_to_sphere(point, viewport);
        let axis = glm::cross(&self.last_point, &current);
        if glm::length(&axis) < DEGENERATE_EPSILON {
            return None;
        }

        let angle = glm::dot(&self.last_point, &current).clamp(-1.0, 1.0).acos();
        self.last_point = current;

        trace!(self.log, "rotating {} rad about {:?}", angle, axis);
        Some(ArcballRotation { axis, angle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn log() -> slog::Logger {
        slog::Logger::root(slog::Discard, o!())
    }

    fn viewport() -> na::Vector2<u32> {
        na::Vector2::new(640, 480)
    }

    #[test]
    fn test_center_is_north_pole() {
        for size in &[na::Vector2::new(640, 480), na::Vector2::new(101, 33)] {
            let center = na::Point2::new(size.x as f32 / 2.0, size.y as f32 / 2.0);
            let p = project_to_sphere(&center, size);
            approx::assert_relative_eq!(p, glm::vec3(0.0, 0.0, 1.0), epsilon = 0.000_001);
        }
    }

    #[test]
    fn test_screen_y_points_down() {
        let top = project_to_sphere(&na::Point2::new(320.0, 0.0), &viewport());
        approx::assert_relative_eq!(top, glm::vec3(0.0, 1.0, 0.0), epsilon = 0.000_001);

        let half_right = project_to_sphere(&na::Point2::new(480.0, 240.0), &viewport());
        approx::assert_relative_eq!(
            half_right,
            glm::vec3(0.5, 0.0, 0.75f32.sqrt()),
            epsilon = 0.000_001
        );
    }

    #[test]
    fn test_outside_disk_stays_on_unit_sphere() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..1000 {
            let point = na::Point2::new(rng.gen_range(-1.0e6, 1.0e6), rng.gen_range(-1.0e6, 1.0e6));
            let p = project_to_sphere(&point, &viewport());
            assert!(p.iter().all(|c| c.is_finite()));
            approx::assert_relative_eq!(glm::length(&p), 1.0, epsilon = 0.000_01);
            assert!(p.z >= 0.0);
        }

        let corner = project_to_sphere(&na::Point2::new(0.0, 0.0), &viewport());
        approx::assert_relative_eq!(
            corner,
            glm::vec3(-1.0, 1.0, 0.0) / 2.0f32.sqrt(),
            epsilon = 0.000_001
        );
        let degenerate = project_to_sphere(&na::Point2::new(0.0, 0.0), &na::Vector2::new(0, 0));
        assert!(degenerate.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_rim_is_continuous() {
        let inside = project_to_sphere(&na::Point2::new(639.99, 240.0), &viewport());
        let outside = project_to_sphere(&na::Point2::new(640.01, 240.0), &viewport());
        approx::assert_relative_eq!(inside, outside, epsilon = 0.02);
    }

    #[test]
    fn test_no_rotation_without_drag() {
        let mut arcball = ArcballController::new(&log());
        assert!(!arcball.is_dragging());
        assert!(arcball
            .on_pointer_move(&na::Point2::new(10.0, 10.0), &viewport())
            .is_none());

        arcball.on_pointer_down(&na::Point2::new(320.0, 240.0), &viewport());
        assert!(arcball.is_dragging());
        arcball.on_pointer_up();
        assert!(!arcball.is_dragging());
        assert!(arcball
            .on_pointer_move(&na::Point2::new(400.0, 240.0), &viewport())
            .is_none());
    }

    #[test]
    fn test_drag_rotates_about_vertical_axis() {
        let mut arcball = ArcballController::new(&log());
        arcball.on_pointer_down(&na::Point2::new(320.0, 240.0), &viewport());
        let rotation = arcball
            .on_pointer_move(&na::Point2::new(480.0, 240.0), &viewport())
            .unwrap();

        // north pole to (0.5, 0, sqrt(0.75)) is 30 degrees about +y
        approx::assert_relative_eq!(
            glm::normalize(&rotation.axis),
            glm::vec3(0.0, 1.0, 0.0),
            epsilon = 0.000_01
        );
        approx::assert_relative_eq!(rotation.angle, 30.0f32.to_radians(), epsilon = 0.000_01);
        approx::assert_relative_eq!(
            *arcball.last_point(),
            glm::vec3(0.5, 0.0, 0.75f32.sqrt()),
            epsilon = 0.000_001
        );
    }

    #[test]
    fn test_repeated_move_is_idempotent() {
        let mut arcball = ArcballController::new(&log());
        arcball.on_pointer_down(&na::Point2::new(300.0, 200.0), &viewport());
        let target = na::Point2::new(350.0, 260.0);
        let first = arcball.on_pointer_move(&target, &viewport());
        assert!(first.map_or(false, |r| r.angle > 0.0));
        assert!(arcball.on_pointer_move(&target, &viewport()).is_none());
    }
}
