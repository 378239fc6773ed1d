// scene/mod.rs
pub mod camera;
pub mod components;
pub mod entity;
pub mod model;
pub mod object;
pub mod scene;
pub mod shape;
pub mod transform;

pub use camera::{Camera, CameraMovement, FlyCamera};
pub use components::Component;
pub use entity::{Entity, EntityBehaviour};
pub use model::Model;
pub use object::{Lifecycle, ObjectId, ObjectKind, SceneObject};
pub use scene::{Scene, SceneId};
pub use shape::Shape;
pub use transform::Transform;
