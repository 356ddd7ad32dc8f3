use cgmath::{InnerSpace, Vector3};

use crate::config::{CameraConfig, ControlsConfig};

// cgmath builds OpenGL clip space (z in -1..1), wgpu wants z in 0..1
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);
pub const IDENTITY_MATRIX_4: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// GPU side of the camera. The camera itself lives in the `Scene`.
pub struct CameraComponent {
    pub camera_uniform: CameraUniform,
    pub camera_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: cgmath::Point3<f32>,
    pub target: cgmath::Point3<f32>,
    pub up: cgmath::Vector3<f32>,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            eye: config.eye.into(),
            target: (0.0, 0.0, 0.0).into(),
            up: cgmath::Vector3::unit_y(),
            aspect: Camera::aspect_ratio(width, height),
            fovy: config.fovy,
            znear: config.znear,
            zfar: config.zfar,
        }
    }

    pub fn aspect_ratio(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }

    pub fn view_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> cgmath::Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(cgmath::Deg(self.fovy), self.aspect, self.znear, self.zfar)
    }

    pub fn build_view_projection_matrix(&self) -> cgmath::Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Damped orbit around `camera.target`, modelled on the usual web orbit
/// controls: drag to rotate, wheel to dolly, distance clamped.
#[derive(Debug, Clone)]
pub struct OrbitController {
    damping_factor: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,

    // pending spherical rotation, drained by `update`
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,

    is_rotating: bool,
    rotate_start: Option<(f32, f32)>,
}

const EPS: f32 = 0.000001;

impl OrbitController {
    pub fn new(config: &ControlsConfig) -> Self {
        Self {
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            is_rotating: false,
            rotate_start: None,
        }
    }

    pub fn begin_rotate(&mut self, x: f32, y: f32) {
        self.is_rotating = true;
        self.rotate_start = Some((x, y));
    }

    pub fn end_rotate(&mut self) {
        self.is_rotating = false;
        self.rotate_start = None;
    }

    /// Feed a pointer position while the rotate button is held. `height` is
    /// the viewport height, both axes are scaled by it.
    pub fn drag_to(&mut self, x: f32, y: f32, height: f32) {
        if !self.is_rotating {
            return;
        }
        let Some((start_x, start_y)) = self.rotate_start else {
            self.rotate_start = Some((x, y));
            return;
        };

        let height = height.max(1.0);
        let dx = (x - start_x) * self.rotate_speed;
        let dy = (y - start_y) * self.rotate_speed;

        self.delta_theta -= 2.0 * std::f32::consts::PI * dx / height;
        self.delta_phi -= 2.0 * std::f32::consts::PI * dy / height;

        self.rotate_start = Some((x, y));
    }

    /// Positive `amount` is a scroll up, which moves the camera closer.
    pub fn zoom(&mut self, amount: f32) {
        let zoom_scale = 0.95f32.powf(self.zoom_speed);
        if amount > 0.0 {
            self.scale *= zoom_scale;
        } else if amount < 0.0 {
            self.scale /= zoom_scale;
        }
    }

    /// Apply the damped share of the pending motion to the camera. Returns
    /// true when the eye moved.
    pub fn update_camera(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.eye - camera.target;

        let mut radius = offset.magnitude();
        let (mut theta, mut phi) = if radius == 0.0 {
            (0.0, 0.0)
        } else {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        };

        theta += self.delta_theta * self.damping_factor;
        phi += self.delta_phi * self.damping_factor;
        phi = phi.clamp(EPS, std::f32::consts::PI - EPS);

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let new_offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let previous_eye = camera.eye;
        camera.eye = camera.target + new_offset;

        self.delta_theta *= 1.0 - self.damping_factor;
        self.delta_phi *= 1.0 - self.damping_factor;
        self.scale = 1.0;

        (camera.eye - previous_eye).magnitude2() > EPS
    }
}

// We need this for Rust to store our data correctly for the shaders
#[repr(C)]
// This is so we can store this in a buffer
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // We can't use cgmath with bytemuck directly so we'll have
    // to convert the Matrix4 into a 4x4 f32 array
    pub view_proj_matrix: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj_matrix: IDENTITY_MATRIX_4,
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_proj_matrix = camera.build_view_projection_matrix().into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::EuclideanSpace;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), 800, 600)
    }

    fn controller() -> OrbitController {
        OrbitController::new(&ControlsConfig::default())
    }

    fn distance(camera: &Camera) -> f32 {
        camera.eye.to_vec().magnitude()
    }

    #[test]
    fn idle_update_leaves_the_camera_in_place() {
        let mut camera = camera();
        let mut controls = controller();
        let moved = controls.update_camera(&mut camera);
        assert!(!moved);
        assert!((camera.eye.z - 2.5).abs() < 1e-5);
        assert!(camera.eye.x.abs() < 1e-5);
        assert!(camera.eye.y.abs() < 1e-5);
    }

    #[test]
    fn drag_orbits_without_changing_distance() {
        let mut camera = camera();
        let mut controls = controller();
        controls.begin_rotate(100.0, 100.0);
        controls.drag_to(220.0, 130.0, 600.0);
        controls.end_rotate();

        for _ in 0..200 {
            controls.update_camera(&mut camera);
        }

        assert!((distance(&camera) - 2.5).abs() < 1e-4);
        // dragging right swings the eye towards -x
        assert!(camera.eye.x < -0.1, "eye = {:?}", camera.eye);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let mut camera = camera();
        let mut controls = controller();
        controls.begin_rotate(0.0, 0.0);
        controls.drag_to(60.0, 0.0, 600.0);

        controls.update_camera(&mut camera);
        let first = camera.eye.x.abs();
        controls.update_camera(&mut camera);
        let second = camera.eye.x.abs() - first;

        assert!(first > 0.0);
        assert!(second > 0.0);
        assert!(second < first);
    }

    #[test]
    fn drag_without_button_does_nothing() {
        let mut camera = camera();
        let mut controls = controller();
        controls.drag_to(300.0, 300.0, 600.0);
        assert!(!controls.update_camera(&mut camera));
    }

    #[test]
    fn zoom_is_clamped_to_min_distance() {
        let mut camera = camera();
        let mut controls = controller();
        for _ in 0..100 {
            controls.zoom(1.0);
            controls.update_camera(&mut camera);
        }
        assert!((distance(&camera) - 1.5).abs() < 1e-4);
    }

    #[test]
    fn zoom_is_clamped_to_max_distance() {
        let mut camera = camera();
        let mut controls = controller();
        for _ in 0..100 {
            controls.zoom(-1.0);
            controls.update_camera(&mut camera);
        }
        assert!((distance(&camera) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut camera = camera();
        let mut controls = controller();
        controls.begin_rotate(0.0, 0.0);
        controls.drag_to(0.0, 100_000.0, 600.0);
        for _ in 0..500 {
            controls.update_camera(&mut camera);
        }
        assert!(camera.eye.y > 2.49, "eye = {:?}", camera.eye);
        assert!(!camera.eye.x.is_nan() && !camera.eye.z.is_nan());
        assert!((distance(&camera) - 2.5).abs() < 1e-3);
    }

    #[test]
    fn projection_maps_target_into_depth_range() {
        let camera = camera();
        let clip = camera.build_view_projection_matrix() * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc_z = clip.z / clip.w;
        assert!(ndc_z > 0.0 && ndc_z < 1.0, "ndc z = {ndc_z}");
        assert!((clip.x / clip.w).abs() < 1e-6);
        assert!((clip.y / clip.w).abs() < 1e-6);
    }

    #[test]
    fn near_and_far_planes_map_to_wgpu_depth_bounds() {
        let camera = camera();
        let depth_at = |distance: f32| {
            // straight ahead of the eye, which looks down -z
            let point = cgmath::Vector4::new(0.0, 0.0, camera.eye.z - distance, 1.0);
            let clip = camera.build_view_projection_matrix() * point;
            clip.z / clip.w
        };
        assert!(depth_at(camera.znear).abs() < 1e-5, "near = {}", depth_at(camera.znear));
        assert!((depth_at(camera.zfar) - 1.0).abs() < 1e-4, "far = {}", depth_at(camera.zfar));
    }

    #[test]
    fn vertical_field_of_view_reaches_the_screen_edge() {
        let camera = camera();
        let distance = 2.5;
        let half_height = distance * (camera.fovy.to_radians() / 2.0).tan();
        let point = cgmath::Vector4::new(0.0, half_height, camera.eye.z - distance, 1.0);
        let clip = camera.build_view_projection_matrix() * point;
        assert!((clip.y / clip.w - 1.0).abs() < 1e-4, "ndc y = {}", clip.y / clip.w);
    }
}
