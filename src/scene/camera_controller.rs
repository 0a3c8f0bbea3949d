//! Camera controller system
//!
//! [`OrbitControls`] rotates the camera around a target point with optional
//! damping (inertia). Pointer input is buffered between frames and consumed
//! by [`CameraController::update`], which the frame loop calls exactly once
//! per frame.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use super::Camera;

/// Minimum squared camera displacement reported as a change by `update`
const CHANGE_EPSILON: f32 = 1e-6;

/// Keeps the polar angle away from the poles so `look_at` stays defined
const POLE_EPSILON: f32 = 1e-6;

/// Abstract camera controller trait
pub trait CameraController {
    /// Advance the controller by one step and write the result into `camera`.
    ///
    /// Returns `true` if the camera moved.
    fn update(&mut self, camera: &mut Camera) -> bool;

    /// Get the controller name for debugging
    fn name(&self) -> &'static str;

    /// Restore the camera to the state captured when the controller was created
    fn reset(&mut self, camera: &mut Camera);
}

/// Pointer buttons understood by the controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Rotate around the target
    Primary,
    /// Pan the target
    Secondary,
    /// Dolly in/out by dragging vertically
    Middle,
}

/// Spherical coordinates (radius, polar angle from +Y, azimuth around +Y)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit camera controls
///
/// - Primary drag: orbit around target
/// - Secondary drag (or primary + shift): pan the target
/// - Middle drag / wheel: dolly in and out
///
/// With `enable_damping` set, input is applied gradually: each update applies
/// `damping_factor` of the outstanding rotation and pan, then shrinks the
/// outstanding amount by `1 - damping_factor`.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Point the camera orbits around
    pub target: Vec3,
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    spherical_delta: Vec2,
    scale: f32,
    pan_offset: Vec3,
    pending_pan: Vec2,
    active_button: Option<PointerButton>,
    last_pointer: Option<Vec2>,
    viewport_height: f32,
    saved_position: Vec3,
    saved_target: Vec3,
}

impl OrbitControls {
    /// Create controls orbiting the camera's current target
    pub fn new(camera: &Camera) -> Self {
        Self {
            target: camera.target,
            enabled: true,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Vec2::ZERO,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            pending_pan: Vec2::ZERO,
            active_button: None,
            last_pointer: None,
            viewport_height: 1.0,
            saved_position: camera.position,
            saved_target: camera.target,
        }
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = damping_factor;
        self
    }

    /// Height of the element receiving pointer input, in the same units as
    /// pointer positions. Drag distances are measured relative to it.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(1.0);
    }

    pub fn pointer_down(&mut self, button: PointerButton, position: Vec2) {
        if !self.enabled {
            return;
        }
        self.active_button = Some(button);
        self.last_pointer = Some(position);
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        if self.active_button == Some(button) {
            self.active_button = None;
            self.last_pointer = None;
        }
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        let (Some(button), Some(last)) = (self.active_button, self.last_pointer) else {
            return;
        };
        self.last_pointer = Some(position);
        if !self.enabled {
            return;
        }

        let delta = position - last;
        match button {
            PointerButton::Primary => {
                self.rotate_left(2.0 * PI * delta.x / self.viewport_height * self.rotate_speed);
                self.rotate_up(2.0 * PI * delta.y / self.viewport_height * self.rotate_speed);
            }
            PointerButton::Secondary => {
                self.pending_pan += delta * self.pan_speed;
            }
            PointerButton::Middle => {
                if delta.y > 0.0 {
                    self.dolly_out(self.zoom_scale());
                } else if delta.y < 0.0 {
                    self.dolly_in(self.zoom_scale());
                }
            }
        }
    }

    /// Mouse wheel; positive values scroll away from the user and zoom in
    pub fn wheel(&mut self, delta_y: f32) {
        if !self.enabled {
            return;
        }
        if delta_y > 0.0 {
            self.dolly_in(self.zoom_scale());
        } else if delta_y < 0.0 {
            self.dolly_out(self.zoom_scale());
        }
    }

    /// Current distance between a camera and the orbit target
    pub fn distance(&self, camera: &Camera) -> f32 {
        (camera.position - self.target).length()
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.x -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.y -= angle;
    }

    fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    /// Convert buffered pan pixels into a world-space offset.
    ///
    /// Pans by the distance that keeps the target under the pointer at the
    /// target's depth.
    fn consume_pending_pan(&mut self, camera: &Camera) {
        if self.pending_pan == Vec2::ZERO {
            return;
        }
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov_y_degrees.to_radians() / 2.0).tan();

        let right = camera.right();
        let up = right.cross(camera.forward()).normalize();

        let left_amount = 2.0 * self.pending_pan.x * target_distance / self.viewport_height;
        let up_amount = 2.0 * self.pending_pan.y * target_distance / self.viewport_height;

        self.pan_offset += -right * left_amount + up * up_amount;
        self.pending_pan = Vec2::ZERO;
    }
}

impl CameraController for OrbitControls {
    fn update(&mut self, camera: &mut Camera) -> bool {
        let last_position = camera.position;
        self.consume_pending_pan(camera);

        let mut spherical = Spherical::from_offset(camera.position - self.target);

        if self.enable_damping {
            spherical.theta += self.spherical_delta.x * self.damping_factor;
            spherical.phi += self.spherical_delta.y * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.x;
            spherical.phi += self.spherical_delta.y;
        }

        let min_phi = self.min_polar_angle.max(POLE_EPSILON);
        let max_phi = self.max_polar_angle.min(PI - POLE_EPSILON);
        spherical.phi = spherical.phi.clamp(min_phi, max_phi);

        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.spherical_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Vec2::ZERO;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        last_position.distance_squared(camera.position) > CHANGE_EPSILON
    }

    fn name(&self) -> &'static str {
        "Orbit"
    }

    fn reset(&mut self, camera: &mut Camera) {
        self.target = self.saved_target;
        camera.position = self.saved_position;
        camera.look_at(self.saved_target);
        self.spherical_delta = Vec2::ZERO;
        self.pan_offset = Vec3::ZERO;
        self.pending_pan = Vec2::ZERO;
        self.scale = 1.0;
        self.active_button = None;
        self.last_pointer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::perspective(35.0, 4.0 / 3.0, 0.1, 10_000.0)
            .with_position(Vec3::new(0.0, 5.0, 10.0));
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn drag(controls: &mut OrbitControls, button: PointerButton, by: Vec2) {
        controls.pointer_down(button, Vec2::new(100.0, 100.0));
        controls.pointer_move(Vec2::new(100.0, 100.0) + by);
        controls.pointer_up(button);
    }

    #[test]
    fn test_spherical_round_trip() {
        let offset = Vec3::new(3.0, 4.0, -2.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-5);
    }

    #[test]
    fn test_idle_update_keeps_camera_still() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera).with_damping(0.05);
        let before = camera.position;

        assert!(!controls.update(&mut camera));
        assert!((camera.position - before).length() < 1e-4);
    }

    #[test]
    fn test_rotation_without_damping_applies_once() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.set_viewport_height(600.0);

        drag(&mut controls, PointerButton::Primary, Vec2::new(60.0, 0.0));
        assert!(controls.update(&mut camera));
        let after_first = camera.position;

        assert!(!controls.update(&mut camera));
        assert!((camera.position - after_first).length() < 1e-5);
    }

    #[test]
    fn test_damping_keeps_gliding_with_shrinking_steps() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera).with_damping(0.05);
        controls.set_viewport_height(600.0);

        drag(&mut controls, PointerButton::Primary, Vec2::new(60.0, 0.0));

        let mut previous = camera.position;
        let mut previous_step = f32::INFINITY;
        for _ in 0..10 {
            assert!(controls.update(&mut camera));
            let step = (camera.position - previous).length();
            assert!(step > 0.0);
            assert!(step < previous_step);
            previous_step = step;
            previous = camera.position;
        }

        let mut settled = false;
        for _ in 0..1000 {
            if !controls.update(&mut camera) {
                settled = true;
                break;
            }
        }
        assert!(settled);
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.set_viewport_height(600.0);
        let distance = controls.distance(&camera);

        drag(&mut controls, PointerButton::Primary, Vec2::new(-45.0, 20.0));
        controls.update(&mut camera);

        assert!((controls.distance(&camera) - distance).abs() < 1e-3);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.set_viewport_height(100.0);

        // Drag far enough to flip over the top pole
        drag(&mut controls, PointerButton::Primary, Vec2::new(0.0, 500.0));
        controls.update(&mut camera);

        let offset = camera.position - controls.target;
        assert!(offset.y > 0.0);
        assert!(offset.x.is_finite() && offset.z.is_finite());
    }

    #[test]
    fn test_wheel_dolly() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        let distance = controls.distance(&camera);

        controls.wheel(1.0);
        controls.update(&mut camera);
        let closer = controls.distance(&camera);
        assert!((closer - distance * 0.95).abs() < 1e-3);

        controls.wheel(-1.0);
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - distance).abs() < 1e-3);
    }

    #[test]
    fn test_distance_limits() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.min_distance = 10.0;
        controls.max_distance = 12.0;

        for _ in 0..50 {
            controls.wheel(1.0);
        }
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - 10.0).abs() < 1e-3);

        for _ in 0..50 {
            controls.wheel(-1.0);
        }
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - 12.0).abs() < 1e-3);
    }

    #[test]
    fn test_pan_moves_target_and_camera_together() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.set_viewport_height(600.0);
        let offset_before = camera.position - controls.target;

        drag(&mut controls, PointerButton::Secondary, Vec2::new(30.0, 0.0));
        controls.update(&mut camera);

        assert!(controls.target.length() > 0.0);
        // Dragging right moves the target left (towards -X)
        assert!(controls.target.x < 0.0);
        let offset_after = camera.position - controls.target;
        assert!((offset_after - offset_before).length() < 1e-3);
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&camera);
        controls.enabled = false;
        let before = camera.position;

        drag(&mut controls, PointerButton::Primary, Vec2::new(60.0, 60.0));
        controls.wheel(3.0);
        controls.update(&mut camera);

        assert!((camera.position - before).length() < 1e-4);
    }

    #[test]
    fn test_reset_restores_saved_state() {
        let mut camera = camera();
        let start = camera.position;
        let mut controls = OrbitControls::new(&camera).with_damping(0.1);
        controls.set_viewport_height(600.0);

        drag(&mut controls, PointerButton::Secondary, Vec2::new(80.0, -40.0));
        drag(&mut controls, PointerButton::Primary, Vec2::new(80.0, 10.0));
        for _ in 0..5 {
            controls.update(&mut camera);
        }
        assert!((camera.position - start).length() > 1e-3);

        controls.reset(&mut camera);
        assert_eq!(camera.position, start);
        assert_eq!(controls.target, Vec3::ZERO);
        assert!(!controls.update(&mut camera));
    }
}
