use std::collections::HashMap;
use std::num::NonZeroU64;

use crate::renderer::backend::{DepthCompare, ShaderId};
use crate::renderer::internal::DrawUniforms;
use crate::renderer::pipeline_builder::PipelineBuilder;
use crate::renderer::texture::TextureKind;
use crate::renderer::{Depth, InstanceRaw, Vertex};

/// A compiled WGSL module and the inputs it expects.
pub(crate) struct GpuShader {
    pub(crate) module: wgpu::ShaderModule,
    pub(crate) label: String,
    pub(crate) texture: Option<TextureKind>,
    pub(crate) instanced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub(crate) shader: ShaderId,
    pub(crate) depth: DepthCompare,
    pub(crate) polygon: wgpu::PolygonMode,
}

/// Bind group layouts shared by every program, plus one pipeline per
/// (program, depth comparison, polygon mode) built on first use.
pub(crate) struct PipelineCache {
    pub(crate) uniform_layout: wgpu::BindGroupLayout,
    texture_2d_layout: wgpu::BindGroupLayout,
    texture_cube_layout: wgpu::BindGroupLayout,
    pub(crate) sampler: wgpu::Sampler,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("DrawUniformsLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(DrawUniforms::SIZE),
                },
                count: None,
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("MaterialSampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            uniform_layout,
            texture_2d_layout: texture_layout(device, wgpu::TextureViewDimension::D2),
            texture_cube_layout: texture_layout(device, wgpu::TextureViewDimension::Cube),
            sampler,
            pipelines: HashMap::new(),
        }
    }

    pub(crate) fn texture_layout(&self, kind: TextureKind) -> &wgpu::BindGroupLayout {
        match kind {
            TextureKind::D2 => &self.texture_2d_layout,
            TextureKind::Cube => &self.texture_cube_layout,
        }
    }

    /// Builds the pipeline for `key` unless it already exists.
    pub(crate) fn prepare(
        &mut self,
        device: &wgpu::Device,
        key: PipelineKey,
        shader: &GpuShader,
        color_format: wgpu::TextureFormat,
    ) {
        if self.pipelines.contains_key(&key) {
            return;
        }

        let mut layouts = vec![&self.uniform_layout];
        if let Some(kind) = shader.texture {
            layouts.push(self.texture_layout(kind));
        }
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(shader.label.as_str()),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let mut builder = PipelineBuilder::new(device, &layout, &shader.module)
            .with_label(&shader.label)
            .with_vertex_buffer(Vertex::layout())
            .with_color_target(color_format)
            .with_depth(Depth::FORMAT, key.depth)
            .with_polygon_mode(key.polygon);
        if shader.instanced {
            builder = builder.with_vertex_buffer(InstanceRaw::layout());
        }

        log::debug!(
            "Building pipeline {:?} for {} ({:?}, {:?})",
            key.shader,
            shader.label,
            key.depth,
            key.polygon
        );
        let pipeline = builder.build();
        self.pipelines.insert(key, pipeline);
    }

    pub(crate) fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }
}

fn texture_layout(
    device: &wgpu::Device,
    dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(match dimension {
            wgpu::TextureViewDimension::Cube => "CubeTextureLayout",
            _ => "TextureLayout",
        }),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: dimension,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}
