/// Object placement in the scene
use nalgebra::{Matrix4, Vector3};

/// Euler rotation in radians, applied in X, Y, Z order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Rotation {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.z));

        rx * ry * rz
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Rotation,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Rotation that turns a Z-up model (the STL convention) into the Y-up scene.
    pub fn z_up() -> Self {
        Self {
            rotation: Rotation::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0),
            ..Self::default()
        }
    }

    /// Model matrix: scale, then rotate, then translate.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position)
            * self.rotation.matrix()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Rotation::default(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}
