use glam::{Mat4, Vec3};

/// Position, Euler rotation in degrees and scale, with a lazily rebuilt
/// model matrix.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    model: Mat4,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            model: Mat4::IDENTITY,
            dirty: false,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: rotation_degrees,
            scale,
            model: Mat4::IDENTITY,
            dirty: true,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO, Vec3::ONE)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    pub fn set_rotation(&mut self, rotation_degrees: Vec3) {
        self.rotation = rotation_degrees;
        self.dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    pub fn rotate(&mut self, delta_degrees: Vec3) {
        self.set_rotation(self.rotation + delta_degrees);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// `T * Rx * Ry * Rz * S`, rebuilt only after a setter ran.
    pub fn model_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.model = Self::compose(self.position, self.rotation, self.scale);
            self.dirty = false;
        }
        self.model
    }

    /// Returns `(view_projection * model, model)`.
    pub fn compute_model_view_projection(&mut self, view_projection: Mat4) -> (Mat4, Mat4) {
        let model = self.model_matrix();
        (view_projection * model, model)
    }

    fn compose(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
        Mat4::from_translation(position)
            * Mat4::from_rotation_x(rotation.x.to_radians())
            * Mat4::from_rotation_y(rotation.y.to_radians())
            * Mat4::from_rotation_z(rotation.z.to_radians())
            * Mat4::from_scale(scale)
    }
}
