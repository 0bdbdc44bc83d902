use crate::config::CameraConfig;
use crate::geometry::Ray;
use glam::{Mat4, Vec2, Vec3};

const MIN_ORBIT_DISTANCE: f32 = 0.05;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Perspective camera looking from `position` at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, aspect: f32) -> Self {
        Self::from_config(
            &CameraConfig {
                position: position.to_array(),
                target: target.to_array(),
                ..CameraConfig::default()
            },
            aspect,
        )
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            up: Vec3::Y,
            fov_y_deg: config.fov_y_deg,
            aspect: sanitize_aspect(aspect),
            near: config.near,
            far: config.far,
        }
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.aspect = sanitize_aspect(width as f32 / height.max(1) as f32);
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up_vector())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a point in normalized device coordinates
    /// (x right, y up, both in [-1, 1]).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, far - near)
    }

    /// Orbits around `target` keeping the distance.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        let offset = self.position - self.target;
        let distance = offset.length().max(MIN_ORBIT_DISTANCE);
        let (yaw, pitch) = offset_to_yaw_pitch(offset);
        let yaw = wrap_angle(yaw + yaw_delta);
        let pitch = (pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let cos_pitch = pitch.cos();
        let direction = Vec3::new(yaw.sin() * cos_pitch, pitch.sin(), yaw.cos() * cos_pitch);
        self.position = self.target + direction * distance;
    }

    /// Looking straight down the up axis breaks `look_at`; fall back to +Z.
    fn up_vector(&self) -> Vec3 {
        if self.forward().cross(self.up).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            self.up
        }
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

fn offset_to_yaw_pitch(offset: Vec3) -> (f32, f32) {
    let n = offset.normalize_or_zero();
    if n == Vec3::ZERO {
        return (0.0, 0.0);
    }
    (n.x.atan2(n.z), n.y.clamp(-1.0, 1.0).asin())
}

fn wrap_angle(angle: f32) -> f32 {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if angle.is_finite() {
        (angle + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI
    } else {
        0.0
    }
}
