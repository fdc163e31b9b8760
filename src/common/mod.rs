pub mod config;
pub mod error;
pub mod importer;
pub mod mesh;

pub use config::ViewerConfig;
pub use error::{ImportError, MeshError, ViewerError};
pub use mesh::{AttributeArray, RawMeshData, Semantic, VertexFormat};

lazy_static::lazy_static! {
    pub static ref DEFAULT_RESOLUTION: na::Vector2<u32> = na::Vector2::new(640, 480);
}

pub struct Camera {
    pub cam_to_world: na::Isometry3<f32>,
    pub cam_to_screen: na::Perspective3<f32>,
    pub viewport: na::Vector2<u32>,
    z_near: f32,
}

impl Camera {
    pub fn new(
        cam_to_world: &na::Isometry3<f32>,
        fovy: f32,
        z_near: f32,
        z_far: f32,
        viewport: &na::Vector2<u32>,
    ) -> Camera {
        Camera {
            cam_to_world: *cam_to_world,
            cam_to_screen: na::Perspective3::new(aspect(viewport), fovy, z_near, z_far),
            viewport: *viewport,
            z_near,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Camera {
        Camera::new(
            &na::Isometry3::translation(0.0, 0.0, config.camera_distance),
            config.fovy,
            config.z_near,
            config.z_far,
            &config.resolution,
        )
    }

    /// Near plane as configured; `Perspective3::znear` recomputes it from
    /// the matrix and loses exactness.
    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn set_viewport(&mut self, viewport: &na::Vector2<u32>) {
        self.viewport = *viewport;
        self.cam_to_screen.set_aspect(aspect(viewport));
    }

    pub fn view_proj(&self) -> glm::Mat4 {
        self.cam_to_screen.as_matrix() * self.cam_to_world.inverse().to_homogeneous()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::from_config(&ViewerConfig::default())
    }
}

fn aspect(viewport: &na::Vector2<u32>) -> f32 {
    viewport.x.max(1) as f32 / viewport.y.max(1) as f32
}
