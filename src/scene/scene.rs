// scene/scene.rs
use std::sync::atomic::{AtomicU32, Ordering};

use crate::scene::{Camera, ObjectId, SceneObject};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u32);

/// Owns the objects and cameras of one world.
///
/// A scene always has an active camera, so every object it owns can compute
/// its matrices.
pub struct Scene {
    id: SceneId,
    objects: Vec<SceneObject>,
    next_object: u32,
    cameras: Vec<Box<dyn Camera>>,
    active_camera: usize,
}

impl Scene {
    pub fn new(camera: impl Camera + 'static) -> Self {
        Self {
            id: SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed)),
            objects: Vec::new(),
            next_object: 0,
            cameras: vec![Box::new(camera)],
            active_camera: 0,
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Takes ownership of `object` and starts it immediately.
    pub fn add_object(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        let mut object = object.into();
        let id = ObjectId(self.next_object);
        self.next_object += 1;

        object.attach(self.id, id);
        object.begin_play();
        self.objects.push(object);
        id
    }

    /// Destroys and hands back an object. Its GPU resources stay alive until
    /// passed to [`Renderer::release`](crate::renderer::Renderer::release).
    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id() == Some(id))?;
        let mut object = self.objects.remove(index);
        object.destroy();
        object.detach();
        Some(object)
    }

    /// Refreshes the active camera's view, then ticks every object.
    ///
    /// Call before rendering the frame so matrices use the updated view.
    pub fn process(&mut self, dt: f32) {
        self.camera_mut().update_view_matrix();
        for object in &mut self.objects {
            object.tick(dt);
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == Some(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == Some(id))
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn camera(&self) -> &dyn Camera {
        self.cameras[self.active_camera].as_ref()
    }

    pub fn camera_mut(&mut self) -> &mut dyn Camera {
        self.cameras[self.active_camera].as_mut()
    }

    pub fn add_camera(&mut self, camera: impl Camera + 'static) -> usize {
        self.cameras.push(Box::new(camera));
        self.cameras.len() - 1
    }

    /// Removes a camera other than the last remaining one.
    pub fn remove_camera(&mut self, index: usize) -> Option<Box<dyn Camera>> {
        if self.cameras.len() <= 1 || index >= self.cameras.len() {
            log::warn!("Cannot remove camera {}; a scene keeps at least one camera", index);
            return None;
        }

        let removed = self.cameras.remove(index);
        if self.active_camera > index || self.active_camera >= self.cameras.len() {
            self.active_camera = self.active_camera.saturating_sub(1);
        }
        Some(removed)
    }

    pub fn set_active_camera(&mut self, index: usize) -> bool {
        if index >= self.cameras.len() {
            log::warn!("No camera at index {}", index);
            return false;
        }
        self.active_camera = index;
        true
    }

    pub fn active_camera_index(&self) -> usize {
        self.active_camera
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Entity, EntityBehaviour, FlyCamera, Shape, Transform};
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Journal(Rc<RefCell<Vec<String>>>);

    impl Journal {
        fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    impl EntityBehaviour for Journal {
        fn on_begin_play(&mut self, _transform: &mut Transform) {
            self.0.borrow_mut().push("begin".into());
        }
        fn on_tick(&mut self, _transform: &mut Transform, dt: f32) {
            self.0.borrow_mut().push(format!("tick {dt}"));
        }
        fn on_destroyed(&mut self) {
            self.0.borrow_mut().push("destroyed".into());
        }
    }

    #[test]
    fn objects_begin_play_when_added() {
        let journal = Journal::default();
        let mut scene = Scene::new(FlyCamera::default());
        let id = scene.add_object(Entity::new(Shape::cube()).with_behaviour(journal.clone()));

        assert_eq!(journal.entries(), vec!["begin"]);
        let object = scene.object(id).unwrap();
        assert_eq!(object.scene(), Some(scene.id()));
        assert!(object.is_new());
    }

    #[test]
    fn process_ticks_every_object() {
        let journal = Journal::default();
        let mut scene = Scene::new(FlyCamera::default());
        scene.add_object(Entity::new(Shape::cube()).with_behaviour(journal.clone()));
        scene.add_object(Shape::cube());

        scene.process(0.5);
        assert_eq!(journal.entries(), vec!["begin", "tick 0.5"]);
    }

    #[test]
    fn removal_destroys_and_detaches() {
        let journal = Journal::default();
        let mut scene = Scene::new(FlyCamera::default());
        let id = scene.add_object(Entity::new(Shape::cube()).with_behaviour(journal.clone()));

        let removed = scene.remove_object(id).unwrap();
        assert_eq!(removed.scene(), None);
        assert!(scene.is_empty());
        assert_eq!(journal.entries(), vec!["begin", "destroyed"]);
        assert!(scene.remove_object(id).is_none());
    }

    #[test]
    fn scenes_get_distinct_ids() {
        let a = Scene::new(FlyCamera::default());
        let b = Scene::new(FlyCamera::default());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn last_camera_cannot_be_removed() {
        let mut scene = Scene::new(FlyCamera::default());
        assert!(scene.remove_camera(0).is_none());

        let second = scene.add_camera(FlyCamera::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y));
        assert!(scene.set_active_camera(second));
        assert_eq!(scene.camera().position(), Vec3::new(0.0, 5.0, 0.0));

        assert!(scene.remove_camera(0).is_some());
        assert_eq!(scene.active_camera_index(), 0);
        assert_eq!(scene.camera().position(), Vec3::new(0.0, 5.0, 0.0));
        assert!(!scene.set_active_camera(3));
    }
}
