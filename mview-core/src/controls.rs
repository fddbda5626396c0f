/// Orbit-style camera controller
use nalgebra::{Point3, Vector3};

use crate::projection::PerspectiveCamera;

const EPS: f32 = 1e-6;

/// Rotates, dollies and pans a camera around a target point.
///
/// Input is accumulated through [`OrbitControls::rotate_left`] and friends and
/// applied to the camera on the next [`OrbitControls::update`].
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
}

impl OrbitControls {
    /// Binds a controller to the camera, taking over its current target.
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            target: camera.target,
            enable_damping: false,
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zeros(),
        }
    }

    /// Azimuthal rotation around the up axis.
    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    /// Polar rotation towards the up axis.
    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    pub fn dolly_in(&mut self, scale: f32) {
        if scale > 0.0 {
            self.scale /= scale;
        }
    }

    pub fn dolly_out(&mut self, scale: f32) {
        if scale > 0.0 {
            self.scale *= scale;
        }
    }

    /// World-space translation of both target and camera.
    pub fn pan(&mut self, offset: Vector3<f32>) {
        self.pan_offset += offset;
    }

    /// Applies pending input to the camera. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let radius = offset.norm();

        let (mut theta, mut phi) = if radius > EPS {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, std::f32::consts::FRAC_PI_2)
        };

        let (theta_step, phi_step, pan_step) = if self.enable_damping {
            (
                self.theta_delta * self.damping_factor,
                self.phi_delta * self.damping_factor,
                self.pan_offset * self.damping_factor,
            )
        } else {
            (self.theta_delta, self.phi_delta, self.pan_offset)
        };

        theta += theta_step;
        phi = (phi + phi_step).clamp(EPS, std::f32::consts::PI - EPS);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += pan_step;

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );

        let previous = camera.position;
        camera.position = self.target + offset;
        camera.look_at(self.target);

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vector3::zeros();
        }
        self.scale = 1.0;

        (camera.position - previous).norm_squared() > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Point3<f32>) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.position = position;
        camera
    }

    #[test]
    fn test_update_without_input_keeps_pose() {
        let mut camera = camera_at(Point3::new(1.0, 2.0, 3.0));
        let mut controls = OrbitControls::new(&camera);

        assert!(!controls.update(&mut camera));
        assert!((camera.position - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-4);
        assert_eq!(camera.target, controls.target);
    }

    #[test]
    fn test_rotate_left_keeps_distance() {
        let mut camera = camera_at(Point3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(&camera);

        controls.rotate_left(-std::f32::consts::FRAC_PI_2);
        assert!(controls.update(&mut camera));

        assert!((camera.position - Point3::new(5.0, 0.0, 0.0)).norm() < 1e-4);
        assert!(((camera.position - controls.target).norm() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_orbits_around_moved_target() {
        let mut camera = camera_at(Point3::new(1.0, 1.0, 4.0));
        let mut controls = OrbitControls::new(&camera);
        controls.target = Point3::new(1.0, 1.0, 1.0);

        controls.dolly_in(1.5);
        controls.update(&mut camera);

        assert!((camera.position - Point3::new(1.0, 1.0, 3.0)).norm() < 1e-4);
        assert_eq!(camera.target, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = camera_at(Point3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(&camera);

        controls.rotate_up(10.0);
        controls.update(&mut camera);

        assert!(camera.position.y <= 5.0);
        assert!(camera.position.y > 4.99);
    }

    #[test]
    fn test_damping_spreads_rotation_over_updates() {
        let mut camera = camera_at(Point3::new(0.0, 0.0, 5.0));
        let mut controls = OrbitControls::new(&camera);
        controls.enable_damping = true;
        controls.damping_factor = 0.5;

        controls.rotate_left(-1.0);
        controls.update(&mut camera);
        let first = camera.position.x.atan2(camera.position.z);
        controls.update(&mut camera);
        let second = camera.position.x.atan2(camera.position.z);

        assert!((first - 0.5).abs() < 1e-4);
        assert!((second - 0.75).abs() < 1e-4);
    }
}
