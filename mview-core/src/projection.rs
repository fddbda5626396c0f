/// Perspective camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

/// A perspective camera looking at `target`.
///
/// The projection matrix is cached: after changing `fov`, `aspect`, `near` or
/// `far`, call [`PerspectiveCamera::update_projection_matrix`] for the change to
/// take effect.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Matrix4<f32>,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov,
            aspect,
            near,
            far,
            projection: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Matrix4::new_perspective(self.aspect, self.fov.to_radians(), self.near, self.far);
    }

    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(45.0, 1.0, DEFAULT_NEAR, DEFAULT_FAR)
    }
}
