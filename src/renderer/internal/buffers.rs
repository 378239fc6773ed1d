use std::num::NonZeroU64;

use crate::renderer::internal::DrawUniforms;

const INITIAL_DRAW_CAPACITY: u32 = 64;

/// One [`DrawUniforms`] block per draw of the frame, addressed with a
/// dynamic offset.
pub(crate) struct DrawUniformBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    capacity: u32,
    stride: u64,
    scratch: Vec<u8>,
}

impl DrawUniformBuffer {
    pub(crate) fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let stride = DrawUniforms::SIZE.div_ceil(alignment) * alignment;
        let (buffer, bind_group) = create(device, layout, INITIAL_DRAW_CAPACITY, stride);

        Self {
            buffer,
            bind_group,
            capacity: INITIAL_DRAW_CAPACITY,
            stride,
            scratch: Vec::new(),
        }
    }

    /// Dynamic offset of draw `index`.
    pub(crate) fn offset(&self, index: usize) -> u32 {
        (index as u64 * self.stride) as u32
    }

    /// Uploads every block, growing the buffer first when it is too small.
    pub(crate) fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        blocks: impl ExactSizeIterator<Item = DrawUniforms>,
    ) {
        let required = blocks.len() as u32;
        if required == 0 {
            return;
        }
        if required > self.capacity {
            let new_capacity = required.max(self.capacity * 2);
            log::info!(
                "Growing draw uniform buffer: {} -> {}",
                self.capacity,
                new_capacity
            );
            let (buffer, bind_group) = create(device, layout, new_capacity, self.stride);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = new_capacity;
        }

        self.scratch.clear();
        self.scratch.resize(required as usize * self.stride as usize, 0);
        for (i, block) in blocks.enumerate() {
            let start = self.offset(i) as usize;
            self.scratch[start..start + DrawUniforms::SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&block));
        }
        queue.write_buffer(&self.buffer, 0, &self.scratch);
    }
}

fn create(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: u32,
    stride: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("DrawUniformBuffer"),
        size: u64::from(capacity) * stride,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("DrawUniformBindGroup"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(DrawUniforms::SIZE),
            }),
        }],
    });
    (buffer, bind_group)
}

/// Vertex buffer holding the instance arena's matrices.
pub(crate) struct InstanceBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) size: u64,
}

impl InstanceBuffer {
    pub(crate) fn new(device: &wgpu::Device, size: u64) -> Self {
        // Zero-sized vertex buffers cannot be bound.
        let size = size.max(crate::renderer::InstanceRaw::SIZE);
        log::debug!("Allocating instance buffer: {} bytes", size);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("InstanceBuffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, size }
    }
}
