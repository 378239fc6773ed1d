use std::ops::Range;
use std::rc::Rc;

use crate::renderer::backend::GpuBackend;
use crate::renderer::material::DrawContext;
use crate::renderer::{Material, Mesh, MeshGpuState};
use crate::scene::{Entity, Model, SceneId, Shape, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u32);

/// Whether the renderer has run GPU setup for an object yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    New,
    Initialized,
}

/// The closed set of renderable object kinds.
pub enum ObjectKind {
    Shape(Shape),
    Model(Model),
    Entity(Entity),
}

impl From<Shape> for ObjectKind {
    fn from(shape: Shape) -> Self {
        ObjectKind::Shape(shape)
    }
}

impl From<Model> for ObjectKind {
    fn from(model: Model) -> Self {
        ObjectKind::Model(model)
    }
}

impl From<Entity> for ObjectKind {
    fn from(entity: Entity) -> Self {
        ObjectKind::Entity(entity)
    }
}

impl ObjectKind {
    /// Batch key: the content hash of the object's first mesh.
    pub fn hash(&self) -> u64 {
        match self {
            ObjectKind::Shape(shape) => shape.hash(),
            ObjectKind::Model(model) => model.hash(),
            ObjectKind::Entity(entity) => entity.inner().hash(),
        }
    }

    pub fn is_skybox(&self) -> bool {
        matches!(self, ObjectKind::Entity(entity) if entity.is_skybox())
    }

    pub fn meshes(&self) -> &[Mesh] {
        match self {
            ObjectKind::Shape(shape) => std::slice::from_ref(shape.mesh()),
            ObjectKind::Model(model) => model.meshes(),
            ObjectKind::Entity(entity) => entity.inner().meshes(),
        }
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        match self {
            ObjectKind::Shape(shape) => std::slice::from_mut(shape.mesh_mut()),
            ObjectKind::Model(model) => model.meshes_mut(),
            ObjectKind::Entity(entity) => entity.inner_mut().meshes_mut(),
        }
    }

    /// The material of the first mesh.
    pub fn material(&self) -> Option<&Rc<Material>> {
        self.meshes().first().and_then(Mesh::material)
    }

    pub fn set_material(&mut self, material: Rc<Material>) {
        match self {
            ObjectKind::Shape(shape) => shape.mesh_mut().set_material(material),
            ObjectKind::Model(model) => model.set_material(material),
            ObjectKind::Entity(entity) => entity.inner_mut().set_material(material),
        }
    }

    pub(crate) fn begin_play(&mut self, transform: &mut Transform) {
        if let ObjectKind::Entity(entity) = self {
            entity.begin_play(transform);
        }
    }

    pub(crate) fn tick(&mut self, transform: &mut Transform, dt: f32) {
        if let ObjectKind::Entity(entity) = self {
            entity.tick(transform, dt);
        }
    }

    pub(crate) fn destroy(&mut self) {
        if let ObjectKind::Entity(entity) = self {
            entity.destroy();
        }
    }

    /// Creates buffers and vertex attributes for every mesh.
    pub fn first_pass(&mut self, backend: &mut dyn GpuBackend) {
        for mesh in self.meshes_mut() {
            mesh.first_pass(backend);
        }
    }

    /// Declares instance attributes for every mesh.
    pub fn second_pass(&mut self, backend: &mut dyn GpuBackend) {
        for mesh in self.meshes_mut() {
            mesh.second_pass(backend);
        }
    }

    /// Draws every mesh with `instances` and returns how many draws were
    /// issued.
    pub fn render(
        &mut self,
        backend: &mut dyn GpuBackend,
        ctx: &DrawContext,
        instances: Range<u32>,
    ) -> usize {
        match self {
            ObjectKind::Shape(shape) => shape.mesh().render(backend, ctx, instances),
            ObjectKind::Model(model) => model
                .meshes()
                .iter()
                .map(|mesh| mesh.render(backend, ctx, instances.clone()))
                .sum(),
            ObjectKind::Entity(entity) => {
                entity.prepare_render(backend);
                let draws = entity.inner_mut().render(backend, ctx, instances);
                entity.post_render(backend);
                draws
            }
        }
    }

    pub(crate) fn release(&mut self, backend: &mut dyn GpuBackend) {
        match self {
            ObjectKind::Shape(shape) => shape.mesh_mut().release(backend),
            ObjectKind::Model(model) => model.release(backend),
            ObjectKind::Entity(entity) => entity.inner_mut().release(backend),
        }
    }

    /// Frees textures the object loaded itself (glTF images).
    pub(crate) fn release_textures(&mut self, backend: &mut dyn GpuBackend) {
        match self {
            ObjectKind::Shape(_) => {}
            ObjectKind::Model(model) => model.release_textures(backend),
            ObjectKind::Entity(entity) => entity.inner_mut().release_textures(backend),
        }
    }

    /// Whether some mesh still lacks buffers or its instance layout.
    pub fn needs_instance_setup(&self) -> bool {
        self.meshes()
            .iter()
            .any(|mesh| !matches!(mesh.gpu_state(), MeshGpuState::InstanceLayoutConfigured(_)))
    }

    /// Whether some mesh has no GPU buffers.
    pub fn needs_buffers(&self) -> bool {
        self.meshes()
            .iter()
            .any(|mesh| mesh.gpu_state() == MeshGpuState::Unrealized)
    }
}

/// A placed object: transform, lifecycle state, owning scene and kind.
pub struct SceneObject {
    id: Option<ObjectId>,
    name: String,
    transform: Transform,
    scene: Option<SceneId>,
    lifecycle: Lifecycle,
    kind: ObjectKind,
}

macro_rules! scene_object_from {
    ($($kind:ty),*) => {
        $(impl From<$kind> for SceneObject {
            fn from(kind: $kind) -> Self {
                SceneObject::new(kind)
            }
        })*
    };
}

scene_object_from!(Shape, Model, Entity, ObjectKind);

impl SceneObject {
    pub fn new(kind: impl Into<ObjectKind>) -> Self {
        Self {
            id: None,
            name: String::new(),
            transform: Transform::default(),
            scene: None,
            lifecycle: Lifecycle::New,
            kind: kind.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Rc<Material>) -> Self {
        self.kind.set_material(material);
        self
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scene(&self) -> Option<SceneId> {
        self.scene
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_new(&self) -> bool {
        self.lifecycle == Lifecycle::New
    }

    pub fn is_skybox(&self) -> bool {
        self.kind.is_skybox()
    }

    pub fn hash(&self) -> u64 {
        self.kind.hash()
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.lifecycle = Lifecycle::Initialized;
    }

    pub(crate) fn attach(&mut self, scene: SceneId, id: ObjectId) {
        self.scene = Some(scene);
        self.id = Some(id);
    }

    pub(crate) fn detach(&mut self) {
        self.scene = None;
    }

    pub(crate) fn begin_play(&mut self) {
        self.kind.begin_play(&mut self.transform);
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        self.kind.tick(&mut self.transform, dt);
    }

    pub(crate) fn destroy(&mut self) {
        self.kind.destroy();
    }

    /// Splits the borrow so the renderer can compute matrices and drive the
    /// kind at once.
    pub(crate) fn parts_mut(&mut self) -> (&mut Transform, &mut ObjectKind) {
        (&mut self.transform, &mut self.kind)
    }
}
