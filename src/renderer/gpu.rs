// renderer/gpu.rs
use std::ops::Range;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::asset::AssetCache;
use crate::error::BackendError;
use crate::renderer::backend::{
    ClearFlags, DepthCompare, GpuBackend, MeshBufferId, MeshBuffers, RenderingMode, ShaderId,
    ShaderProgram, TextureId, TextureResource, UniformValue,
};
use crate::renderer::internal::{
    DrawUniformBuffer, DrawUniforms, GpuContext, GpuShader, InstanceBuffer, PipelineCache,
    PipelineKey,
};
use crate::renderer::shader::ShaderDesc;
use crate::renderer::texture::{TextureImage, TextureKind};
use crate::renderer::Vertex;
use crate::settings::RenderSettings;

pub(crate) struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_layout: bool,
    instance_layout: bool,
}

pub(crate) struct GpuTexture {
    kind: TextureKind,
    bind_group: wgpu::BindGroup,
    _texture: wgpu::Texture,
}

/// A draw captured with the uniform state current at the time of the call.
struct RecordedDraw {
    key: PipelineKey,
    mesh: MeshBufferId,
    texture: Option<TextureId>,
    uniforms: DrawUniforms,
    index_count: u32,
    instances: Range<u32>,
    instanced: bool,
}

/// [`GpuBackend`] over wgpu.
///
/// Calls made during a frame are recorded and replayed inside a single
/// render pass when the frame finishes. The clear flags decide the pass's
/// load operations.
pub struct WgpuBackend {
    context: GpuContext,
    pipelines: PipelineCache,
    draw_uniforms: DrawUniformBuffer,
    instances: InstanceBuffer,
    meshes: AssetCache<GpuMesh, MeshBuffers>,
    shaders: AssetCache<GpuShader, ShaderProgram>,
    textures: AssetCache<GpuTexture, TextureResource>,
    clear_color: wgpu::Color,
    clear: ClearFlags,
    polygon_mode: wgpu::PolygonMode,
    depth_compare: DepthCompare,
    active_shader: Option<ShaderId>,
    bound_texture: Option<TextureId>,
    uniforms: DrawUniforms,
    instance_bound: bool,
    draws: Vec<RecordedDraw>,
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>, settings: &RenderSettings) -> Result<Self, BackendError> {
        let context = GpuContext::new(window, settings).await?;
        let pipelines = PipelineCache::new(&context.device);
        let draw_uniforms = DrawUniformBuffer::new(&context.device, &pipelines.uniform_layout);
        let instances = InstanceBuffer::new(&context.device, 0);
        let [r, g, b, a] = settings.clear_color;

        Ok(Self {
            context,
            pipelines,
            draw_uniforms,
            instances,
            meshes: AssetCache::new(),
            shaders: AssetCache::new(),
            textures: AssetCache::new(),
            clear_color: wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: f64::from(a),
            },
            clear: ClearFlags::empty(),
            polygon_mode: wgpu::PolygonMode::Fill,
            depth_compare: DepthCompare::Less,
            active_shader: None,
            bound_texture: None,
            uniforms: DrawUniforms::default(),
            instance_bound: false,
            draws: Vec::new(),
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.context.resize(size);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.context.aspect_ratio()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    fn record(
        &self,
        mesh: MeshBufferId,
        index_count: u32,
        instances: Range<u32>,
    ) -> Option<RecordedDraw> {
        let Some(shader_id) = self.active_shader else {
            log::warn!("Draw of {:?} without an active shader; skipping", mesh);
            return None;
        };
        let shader = self.shaders.get(shader_id)?;
        let Some(gpu_mesh) = self.meshes.get(mesh) else {
            log::warn!("Draw of released mesh {:?}; skipping", mesh);
            return None;
        };

        if !gpu_mesh.vertex_layout {
            log::warn!("Mesh {:?} has no vertex layout; skipping draw", mesh);
            return None;
        }
        if shader.instanced && !gpu_mesh.instance_layout {
            log::warn!("Mesh {:?} has no instance layout; skipping draw", mesh);
            return None;
        }

        let texture = match shader.texture {
            None => None,
            Some(kind) => {
                let bound = self
                    .bound_texture
                    .filter(|id| self.textures.get(*id).is_some_and(|t| t.kind == kind));
                if bound.is_none() {
                    log::warn!(
                        "Program {} needs a {:?} texture in slot 0; skipping draw",
                        shader.label,
                        kind
                    );
                    return None;
                }
                bound
            }
        };

        Some(RecordedDraw {
            key: PipelineKey {
                shader: shader_id,
                depth: self.depth_compare,
                polygon: self.polygon_mode,
            },
            mesh,
            texture,
            uniforms: self.uniforms,
            index_count,
            instances,
            instanced: shader.instanced,
        })
    }

    fn encode(&self, target: &wgpu::TextureView, draws: &[RecordedDraw], clear: ClearFlags) {
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("FrameEncoder"),
            });

        {
            let color_load = if clear.contains(ClearFlags::COLOR) {
                wgpu::LoadOp::Clear(self.clear_color)
            } else {
                wgpu::LoadOp::Load
            };
            let depth_load = if clear.contains(ClearFlags::DEPTH) {
                wgpu::LoadOp::Clear(1.0)
            } else {
                wgpu::LoadOp::Load
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ForwardPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.context.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (i, draw) in draws.iter().enumerate() {
                let (Some(pipeline), Some(mesh)) =
                    (self.pipelines.get(&draw.key), self.meshes.get(draw.mesh))
                else {
                    continue;
                };

                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.draw_uniforms.bind_group, &[self.draw_uniforms.offset(i)]);
                if let Some(id) = draw.texture {
                    let Some(texture) = self.textures.get(id) else {
                        continue;
                    };
                    pass.set_bind_group(1, &texture.bind_group, &[]);
                }

                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                if draw.instanced {
                    pass.set_vertex_buffer(1, self.instances.buffer.slice(..));
                }
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.index_count, 0, draw.instances.clone());
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
    }
}

impl GpuBackend for WgpuBackend {
    fn clear(&mut self, flags: ClearFlags) {
        self.clear |= flags;
    }

    fn set_rendering_mode(&mut self, mode: RenderingMode) {
        let polygon_mode = mode.polygon_mode();
        self.polygon_mode =
            if polygon_mode == wgpu::PolygonMode::Line && !self.context.supports_line_mode {
                log::warn!("Wireframe not supported by this device; drawing filled");
                wgpu::PolygonMode::Fill
            } else {
                polygon_mode
            };
    }

    fn set_depth_compare(&mut self, compare: DepthCompare) {
        self.depth_compare = compare;
    }

    fn create_mesh_buffers(&mut self, vertices: &[Vertex], indices: &[u32]) -> MeshBufferId {
        let device = &self.context.device;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MeshVertexBuffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MeshIndexBuffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.meshes.insert(GpuMesh {
            vertex_buffer,
            index_buffer,
            vertex_layout: false,
            instance_layout: false,
        })
    }

    fn configure_vertex_attributes(&mut self, mesh: MeshBufferId) {
        match self.meshes.get_mut(mesh) {
            Some(gpu_mesh) => gpu_mesh.vertex_layout = true,
            None => log::warn!("Vertex layout for unknown mesh {:?}", mesh),
        }
    }

    fn configure_instance_attributes(&mut self, mesh: MeshBufferId) {
        if !self.instance_bound {
            log::warn!("Instance layout for {:?} declared before binding the instance buffer", mesh);
        }
        match self.meshes.get_mut(mesh) {
            Some(gpu_mesh) => gpu_mesh.instance_layout = true,
            None => log::warn!("Instance layout for unknown mesh {:?}", mesh),
        }
    }

    fn release_mesh_buffers(&mut self, mesh: MeshBufferId) {
        if let Some(gpu_mesh) = self.meshes.remove(mesh) {
            gpu_mesh.vertex_buffer.destroy();
            gpu_mesh.index_buffer.destroy();
        }
    }

    fn bind_instance_buffer(&mut self) {
        self.instance_bound = true;
    }

    fn respecify_instance_buffer(&mut self, size: u64) {
        self.instances = InstanceBuffer::new(&self.context.device, size);
    }

    fn write_instance_buffer(&mut self, data: &[u8]) {
        if data.len() as u64 > self.instances.size {
            log::warn!(
                "Instance upload of {} bytes exceeds buffer size {}; skipping",
                data.len(),
                self.instances.size
            );
            return;
        }
        self.context
            .queue
            .write_buffer(&self.instances.buffer, 0, data);
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> ShaderId {
        let module = self
            .context
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.label.as_str()),
                source: wgpu::ShaderSource::Wgsl(desc.source.clone()),
            });
        log::info!("Compiled shader {}", desc.label);

        self.shaders.insert(GpuShader {
            module,
            label: desc.label.clone(),
            texture: desc.texture,
            instanced: desc.instanced,
        })
    }

    fn create_texture(&mut self, image: &TextureImage, label: &str) -> TextureId {
        let device = &self.context.device;
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: image.layer_count(),
        };
        let format = if image.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.bytes_per_row()),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(match image.kind {
                TextureKind::D2 => wgpu::TextureViewDimension::D2,
                TextureKind::Cube => wgpu::TextureViewDimension::Cube,
            }),
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: self.pipelines.texture_layout(image.kind),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.pipelines.sampler),
                },
            ],
        });

        log::debug!("Uploaded {:?} texture {} ({}x{})", image.kind, label, image.width, image.height);
        self.textures.insert(GpuTexture {
            kind: image.kind,
            bind_group,
            _texture: texture,
        })
    }

    fn release_texture(&mut self, texture: TextureId) {
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
        self.textures.remove(texture);
    }

    fn use_shader(&mut self, shader: ShaderId) {
        if self.shaders.get(shader).is_none() {
            log::warn!("Unknown shader {:?}", shader);
        }
        self.active_shader = Some(shader);
        self.bound_texture = None;
        self.uniforms = DrawUniforms::default();
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        if slot == 0 {
            self.bound_texture = Some(texture);
        } else {
            log::debug!("Texture slot {} is not read by the built-in programs", slot);
        }
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if !self.uniforms.set(name, value) {
            log::warn!("Unknown uniform '{}' ({:?}); skipping", name, value);
        }
    }

    fn draw_instanced(&mut self, mesh: MeshBufferId, index_count: u32, instances: Range<u32>) {
        if let Some(draw) = self.record(mesh, index_count, instances) {
            self.draws.push(draw);
        }
    }

    fn finish_frame(&mut self) -> Result<(), BackendError> {
        let draws = std::mem::take(&mut self.draws);
        let clear = std::mem::replace(&mut self.clear, ClearFlags::empty());

        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated; reconfiguring and skipping frame");
                self.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring the next frame; skipping");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        for draw in &draws {
            if let Some(shader) = self.shaders.get(draw.key.shader) {
                self.pipelines.prepare(
                    &self.context.device,
                    draw.key,
                    shader,
                    self.context.config.format,
                );
            }
        }
        self.draw_uniforms.write(
            &self.context.device,
            &self.context.queue,
            &self.pipelines.uniform_layout,
            draws.iter().map(|draw| draw.uniforms),
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.encode(&view, &draws, clear);
        frame.present();
        Ok(())
    }
}
