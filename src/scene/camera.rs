use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// What the scene and renderer need from a camera.
///
/// `view_matrix` returns the matrix captured by the last
/// `update_view_matrix` call; the scene refreshes it once per frame.
pub trait Camera {
    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
    fn update_view_matrix(&mut self);

    fn position(&self) -> Vec3;
    fn front(&self) -> Vec3;

    fn set_aspect_ratio(&mut self, _aspect: f32) {}
    fn process_movement_input(&mut self, _direction: CameraMovement, _dt: f32) {}
    fn process_rotation_input(&mut self, _dx: f32, _dy: f32) {}
    fn add_movement_speed(&mut self, _delta: f32) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Projection {
    Perspective {
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
    },
}

impl Projection {
    fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov_y_degrees,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
            } => Mat4::orthographic_rh(left, right, bottom, top, -1.0, 1.0),
        }
    }
}

/// Free-flying camera driven by yaw/pitch in degrees.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    view: Mat4,
    projection: Projection,
    movement_speed: f32,
    sensitivity: f32,
    last_cursor: Option<(f32, f32)>,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y)
    }
}

impl FlyCamera {
    pub const MIN_SPEED: f32 = 0.5;
    pub const MAX_SPEED: f32 = 150.0;
    const PITCH_LIMIT: f32 = 89.0;

    pub fn new(position: Vec3, world_up: Vec3) -> Self {
        let mut camera = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            front: Vec3::X,
            right: Vec3::Z,
            up: world_up,
            world_up,
            view: Mat4::IDENTITY,
            projection: Projection::Perspective {
                fov_y_degrees: 45.0,
                aspect: 16.0 / 9.0,
                near: 0.1,
                far: 1000.0,
            },
            movement_speed: 50.0,
            sensitivity: 0.25,
            last_cursor: None,
        };
        camera.update_vectors();
        camera.update_view_matrix();
        camera
    }

    pub fn set_perspective(&mut self, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Projection::Perspective {
            fov_y_degrees,
            aspect,
            near,
            far,
        };
    }

    pub fn set_orthographic(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.projection = Projection::Orthographic {
            left,
            right,
            bottom,
            top,
        };
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Yaw and pitch in degrees.
    pub fn set_rotation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.update_vectors();
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    /// Feeds an absolute cursor position. The first sample only seeds the
    /// reference point; screen y grows downwards, so it is inverted.
    pub fn update_rotation_input(&mut self, x: f32, y: f32) {
        let (last_x, last_y) = self.last_cursor.unwrap_or((x, y));
        self.last_cursor = Some((x, y));

        let dx = x - last_x;
        let dy = last_y - y;
        if dx != 0.0 || dy != 0.0 {
            self.process_rotation_input(dx, dy);
        }
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Camera for FlyCamera {
    fn view_matrix(&self) -> Mat4 {
        self.view
    }

    fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    fn update_view_matrix(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.position + self.front, self.up);
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn front(&self) -> Vec3 {
        self.front
    }

    fn set_aspect_ratio(&mut self, new_aspect: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = new_aspect;
        }
    }

    fn process_movement_input(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        self.position += match direction {
            CameraMovement::Forward => self.front * velocity,
            CameraMovement::Backward => -self.front * velocity,
            CameraMovement::Left => -self.right * velocity,
            CameraMovement::Right => self.right * velocity,
        };
    }

    fn process_rotation_input(&mut self, dx: f32, dy: f32) {
        self.set_rotation(
            self.yaw + dx * self.sensitivity,
            self.pitch + dy * self.sensitivity,
        );
    }

    fn add_movement_speed(&mut self, delta: f32) {
        self.movement_speed = (self.movement_speed + delta).clamp(Self::MIN_SPEED, Self::MAX_SPEED);
    }
}
