// scene/entity.rs
use crate::renderer::backend::{DepthCompare, GpuBackend};
use crate::scene::components::{Component, Components};
use crate::scene::object::ObjectKind;
use crate::scene::Transform;

/// Per-entity lifecycle hooks. They run after the entity's components and
/// its wrapped object.
pub trait EntityBehaviour {
    fn on_begin_play(&mut self, _transform: &mut Transform) {}
    fn on_tick(&mut self, _transform: &mut Transform, _dt: f32) {}
    fn on_destroyed(&mut self) {}
    fn on_prepare_render(&mut self, _backend: &mut dyn GpuBackend) {}
    fn on_post_render(&mut self, _backend: &mut dyn GpuBackend) {}
}

struct NoBehaviour;

impl EntityBehaviour for NoBehaviour {}

/// Wraps another object kind and adds components and hooks.
pub struct Entity {
    inner: Box<ObjectKind>,
    components: Components,
    behaviour: Box<dyn EntityBehaviour>,
    skybox: bool,
}

impl Entity {
    pub fn new(inner: impl Into<ObjectKind>) -> Self {
        Self {
            inner: Box::new(inner.into()),
            components: Components::new(),
            behaviour: Box::new(NoBehaviour),
            skybox: false,
        }
    }

    /// An entity drawn after everything else, with `LessEqual` depth
    /// testing, and never batched.
    pub fn skybox(inner: impl Into<ObjectKind>) -> Self {
        Self {
            skybox: true,
            ..Self::new(inner)
        }
    }

    pub fn with_behaviour(mut self, behaviour: impl EntityBehaviour + 'static) -> Self {
        self.behaviour = Box::new(behaviour);
        self
    }

    pub fn with_component<T: Component>(mut self, component: T) -> Self {
        self.components.add(component);
        self
    }

    pub fn is_skybox(&self) -> bool {
        self.skybox
    }

    pub fn inner(&self) -> &ObjectKind {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut ObjectKind {
        &mut self.inner
    }

    pub fn add_component<T: Component>(&mut self, component: T) -> Option<&mut T> {
        self.components.add(component)
    }

    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.components.get()
    }

    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.get_mut()
    }

    pub fn remove_component<T: Component>(&mut self) -> bool {
        self.components.remove::<T>()
    }

    pub(crate) fn begin_play(&mut self, transform: &mut Transform) {
        self.components.begin_play(transform);
        self.inner.begin_play(transform);
        self.behaviour.on_begin_play(transform);
    }

    pub(crate) fn tick(&mut self, transform: &mut Transform, dt: f32) {
        self.components.tick(transform, dt);
        self.inner.tick(transform, dt);
        self.behaviour.on_tick(transform, dt);
    }

    pub(crate) fn destroy(&mut self) {
        self.components.destroyed();
        self.behaviour.on_destroyed();
        self.inner.destroy();
    }

    pub(crate) fn prepare_render(&mut self, backend: &mut dyn GpuBackend) {
        if self.skybox {
            backend.set_depth_compare(DepthCompare::LessEqual);
        }
        self.behaviour.on_prepare_render(backend);
    }

    pub(crate) fn post_render(&mut self, backend: &mut dyn GpuBackend) {
        self.behaviour.on_post_render(backend);
        if self.skybox {
            backend.set_depth_compare(DepthCompare::Less);
        }
    }
}
