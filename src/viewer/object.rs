#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationSpace {
    /// About an axis fixed in the world (pre-multiplied).
    World,
    /// About an axis of the object's own frame (post-multiplied).
    Local,
}

/// The displayed model. Rotations accumulate onto its current orientation.
#[derive(Debug, Clone)]
pub struct ViewedObject {
    pub obj_to_world: na::Isometry3<f32>,
}

impl Default for ViewedObject {
    fn default() -> Self {
        Self {
            obj_to_world: na::Isometry3::identity(),
        }
    }
}

impl ViewedObject {
    /// Rotates by `angle` radians about `axis` around the object origin. A
    /// zero axis is ignored.
    pub fn rotate(&mut self, angle: f32, axis: &glm::Vec3, space: RotationSpace) {
        let axis = match na::Unit::try_new(*axis, f32::EPSILON) {
            Some(axis) => axis,
            None => return,
        };
        let rotation = na::UnitQuaternion::from_axis_angle(&axis, angle);
        match space {
            RotationSpace::World => self.obj_to_world.rotation = rotation * self.obj_to_world.rotation,
            RotationSpace::Local => self.obj_to_world.rotation *= rotation,
        }
        self.obj_to_world.rotation.renormalize();
    }

    pub fn model(&self) -> glm::Mat4 {
        self.obj_to_world.to_homogeneous()
    }
}
