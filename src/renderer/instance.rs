use bytemuck::{Pod, Zeroable};
use std::mem;

/// One instance worth of arena data: the MVP matrix followed by the model
/// matrix, both column-major. Matches the byte layout of two consecutive
/// arena slots.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct InstanceRaw {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    /// First shader location used by instance attributes; 0..=2 belong to [`Vertex`](super::Vertex).
    pub const FIRST_LOCATION: u32 = 3;

    pub const SIZE: u64 = mem::size_of::<InstanceRaw>() as u64;

    /// Eight float4 columns, advancing once per instance: 3..=6 MVP, 7..=10 model.
    pub const ATTRS: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4,
        10 => Float32x4
    ];

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_layout_covers_two_matrices() {
        let layout = InstanceRaw::layout();
        assert_eq!(layout.array_stride, 128);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);

        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, (3..=10).collect::<Vec<_>>());

        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, (0..8).map(|i| i * 16).collect::<Vec<_>>());
    }
}
