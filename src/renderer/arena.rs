// renderer/arena.rs
use glam::Mat4;

use crate::renderer::backend::GpuBackend;

const MATRIX_BYTES: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// Host-side staging for per-instance matrices.
///
/// Object `i` owns slots `2 * i` (MVP) and `2 * i + 1` (model). Capacity is
/// counted in objects, grows to exactly twice the request and never shrinks.
#[derive(Debug, Default)]
pub struct MatrixArena {
    matrices: Vec<[[f32; 4]; 4]>,
    capacity: usize,
    needs_respecify: bool,
}

impl MatrixArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn byte_capacity(&self) -> u64 {
        self.capacity as u64 * 2 * MATRIX_BYTES
    }

    /// Whether the next upload reallocates the GPU buffer.
    pub fn needs_respecify(&self) -> bool {
        self.needs_respecify
    }

    /// Grows to `2 * required` objects when `required` exceeds the current
    /// capacity. Returns whether it grew.
    pub fn ensure_capacity(&mut self, required: usize) -> bool {
        if required <= self.capacity {
            return false;
        }

        let new_capacity = required * 2;
        log::info!(
            "Growing instance arena: {} -> {}",
            self.capacity,
            new_capacity
        );
        self.matrices.resize(new_capacity * 2, Mat4::IDENTITY.to_cols_array_2d());
        self.capacity = new_capacity;
        self.needs_respecify = true;
        true
    }

    /// Stores the matrix pair of object `index`.
    pub fn write(&mut self, index: usize, mvp: Mat4, model: Mat4) {
        debug_assert!(index < self.capacity, "arena write past capacity");
        self.matrices[2 * index] = mvp.to_cols_array_2d();
        self.matrices[2 * index + 1] = model.to_cols_array_2d();
    }

    pub fn mvp(&self, index: usize) -> Mat4 {
        Mat4::from_cols_array_2d(&self.matrices[2 * index])
    }

    pub fn model(&self, index: usize) -> Mat4 {
        Mat4::from_cols_array_2d(&self.matrices[2 * index + 1])
    }

    /// Sends the first `used` objects to the GPU, reallocating the buffer
    /// first if the arena grew since the last upload.
    pub fn upload(&mut self, backend: &mut dyn GpuBackend, used: usize) {
        if self.needs_respecify {
            backend.respecify_instance_buffer(self.byte_capacity());
            self.needs_respecify = false;
        }

        let used = used.min(self.capacity);
        if used > 0 {
            backend.write_instance_buffer(bytemuck::cast_slice(&self.matrices[..used * 2]));
        }
    }
}
