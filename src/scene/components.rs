// scene/components.rs
use std::any::{Any, TypeId};

use crate::scene::Transform;

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour attached to an [`Entity`](super::Entity), at most one per type.
///
/// Hooks receive the owning object's transform.
pub trait Component: AsAny + 'static {
    fn on_begin_play(&mut self, _transform: &mut Transform) {}
    fn on_tick(&mut self, _transform: &mut Transform, _dt: f32) {}
    fn on_destroyed(&mut self) {}
}

/// Type-keyed component list; iteration follows insertion order.
#[derive(Default)]
pub struct Components {
    entries: Vec<(TypeId, Box<dyn Component>)>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `T` unless one is already attached.
    pub fn add<T: Component>(&mut self, component: T) -> Option<&mut T> {
        let type_id = TypeId::of::<T>();
        if self.contains::<T>() {
            log::warn!(
                "Component {} already attached; keeping the existing one",
                std::any::type_name::<T>()
            );
            return None;
        }
        self.entries.push((type_id, Box::new(component)));
        self.entries
            .last_mut()
            .and_then(|(_, component)| (**component).as_any_mut().downcast_mut::<T>())
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        self.entries
            .iter()
            .find(|(id, _)| *id == TypeId::of::<T>())
            .and_then(|(_, component)| (**component).as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(id, _)| *id == TypeId::of::<T>())
            .and_then(|(_, component)| (**component).as_any_mut().downcast_mut::<T>())
    }

    pub fn remove<T: Component>(&mut self) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != TypeId::of::<T>());
        self.entries.len() != before
    }

    pub fn contains<T: Component>(&self) -> bool {
        self.entries.iter().any(|(id, _)| *id == TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn begin_play(&mut self, transform: &mut Transform) {
        for (_, component) in &mut self.entries {
            component.on_begin_play(transform);
        }
    }

    pub(crate) fn tick(&mut self, transform: &mut Transform, dt: f32) {
        for (_, component) in &mut self.entries {
            component.on_tick(transform, dt);
        }
    }

    pub(crate) fn destroyed(&mut self) {
        for (_, component) in &mut self.entries {
            component.on_destroyed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[derive(Default)]
    struct Spin {
        degrees_per_second: f32,
        ticks: u32,
    }

    impl Component for Spin {
        fn on_tick(&mut self, transform: &mut Transform, dt: f32) {
            self.ticks += 1;
            transform.rotate(Vec3::new(0.0, self.degrees_per_second * dt, 0.0));
        }
    }

    struct Tag;
    impl Component for Tag {}

    #[test]
    fn one_component_per_type() {
        let mut components = Components::new();
        assert!(components.add(Tag).is_some());
        assert!(components.add(Tag).is_none());
        assert_eq!(components.len(), 1);
        assert!(components.remove::<Tag>());
        assert!(!components.contains::<Tag>());
    }

    #[test]
    fn lookup_downcasts_to_the_concrete_type() {
        let mut components = Components::new();
        components.add(Tag);
        components.add(Spin {
            degrees_per_second: 90.0,
            ..Default::default()
        });

        let mut transform = Transform::default();
        components.tick(&mut transform, 0.5);

        let spin = components.get::<Spin>().unwrap();
        assert_eq!(spin.ticks, 1);
        assert_eq!(transform.rotation(), Vec3::new(0.0, 45.0, 0.0));

        components.get_mut::<Spin>().unwrap().degrees_per_second = 0.0;
        assert_eq!(components.get::<Spin>().unwrap().degrees_per_second, 0.0);
    }
}
