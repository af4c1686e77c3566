//! Scene model: camera, mesh entities, lights and the exposure camera.

pub mod camera;
pub mod entity;
pub mod light;
pub mod physical_camera;
#[allow(clippy::module_inception)]
pub mod scene;

pub use camera::Camera;
pub use entity::MeshEntity;
pub use light::{DirectionalLight, PointLight, SpotLight};
pub use physical_camera::PhysicallyBasedCamera;
pub use scene::{Scene, Sky, SpecularEnvironment};
