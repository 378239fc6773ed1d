// renderer/renderer.rs
use crate::error::RenderError;
use crate::renderer::backend::{ClearFlags, GpuBackend, RenderingMode};
use crate::renderer::batch::BatchSet;
use crate::renderer::material::DrawContext;
use crate::renderer::MatrixArena;
use crate::scene::{Scene, SceneObject};

/// What one call to [`Renderer::render`] submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub batches: usize,
    pub draw_calls: usize,
    pub instances: usize,
    pub skybox_drawn: bool,
}

/// Draws a [`Scene`] with one instanced call per distinct mesh shape.
pub struct Renderer<B: GpuBackend> {
    backend: B,
    arena: MatrixArena,
    mode: RenderingMode,
}

impl<B: GpuBackend> Renderer<B> {
    pub fn new(backend: B, mode: RenderingMode) -> Self {
        let mut renderer = Self {
            backend,
            arena: MatrixArena::new(),
            mode,
        };
        renderer.backend.set_rendering_mode(mode);
        renderer
    }

    pub fn configure_mode(&mut self, mode: RenderingMode) {
        if mode != self.mode {
            log::info!("Rendering mode: {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.backend.set_rendering_mode(mode);
    }

    pub fn mode(&self) -> RenderingMode {
        self.mode
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn arena(&self) -> &MatrixArena {
        &self.arena
    }

    /// Frees the mesh buffers of an object removed from its scene. Textures
    /// are kept, so the object may be added again; its meshes are then
    /// realized anew on the next frame.
    pub fn release(&mut self, object: &mut SceneObject) {
        object.kind_mut().release(&mut self.backend);
    }

    /// Frees everything the object owns on the GPU, including textures a
    /// model loaded itself.
    pub fn destroy(&mut self, mut object: SceneObject) {
        self.release(&mut object);
        object.kind_mut().release_textures(&mut self.backend);
    }

    /// Renders one frame. Call [`Scene::process`] first so the camera view
    /// and transforms are current.
    pub fn render(&mut self, scene: &mut Scene) -> Result<FrameStats, RenderError> {
        let scene_id = scene.id();
        if let Some(foreign) = scene.objects().iter().find(|o| o.scene() != Some(scene_id)) {
            return Err(RenderError::ForeignObject {
                object: foreign.id(),
                scene: scene_id,
            });
        }

        self.backend.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        let ctx = DrawContext::from_camera(scene.camera());
        let view_projection = ctx.view_projection();
        let batches = BatchSet::from_objects(scene.objects());
        self.arena.ensure_capacity(batches.instance_count());

        let objects = scene.objects_mut();
        let mut cursor = 0;
        for batch in batches.iter() {
            for &index in &batch.members {
                let object = &mut objects[index];
                if object.is_new() || object.kind().needs_instance_setup() {
                    let (_, kind) = object.parts_mut();
                    kind.first_pass(&mut self.backend);
                    self.backend.bind_instance_buffer();
                    kind.second_pass(&mut self.backend);
                    object.mark_initialized();
                }

                let (transform, _) = object.parts_mut();
                let (mvp, model) = transform.compute_model_view_projection(view_projection);
                self.arena.write(cursor, mvp, model);
                cursor += 1;
            }
        }
        self.arena.upload(&mut self.backend, cursor);

        let mut stats = FrameStats {
            batches: batches.len(),
            instances: cursor,
            ..FrameStats::default()
        };

        for batch in batches.iter() {
            let (_, kind) = objects[batch.representative()].parts_mut();
            stats.draw_calls += kind.render(&mut self.backend, &ctx, batch.instances());
        }

        if let Some(index) = batches.skybox() {
            let skybox = &mut objects[index];
            if skybox.is_new() || skybox.kind().needs_buffers() {
                skybox.kind_mut().first_pass(&mut self.backend);
                skybox.mark_initialized();
            }
            stats.draw_calls += skybox.kind_mut().render(&mut self.backend, &ctx, 0..1);
            stats.skybox_drawn = true;
        }

        self.backend.finish_frame()?;
        Ok(stats)
    }
}
