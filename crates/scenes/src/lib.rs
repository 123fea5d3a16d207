//! Built-in ray traced scenes for the progressive renderer.
//!
//! Every scene is a [`World`] viewed through an orthographic camera looking
//! down the negative z axis. Worlds implement
//! [`progressive::ScenePixelSource`] and emit their pixels row by row from
//! the bottom of the image upwards.

mod builders;
mod color;
mod geometry;
mod sampler;
mod world;

pub use builders::SceneKind;
pub use color::Color;
pub use geometry::{Hit, Matte, Object, Ray, Shape, Vec3};
pub use sampler::{Point2, Sampler, RANDOM_SET_COUNT};
pub use world::{PointLight, Tracer, ViewPlane, World};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("unknown scene '{0}'; run `raytrace scenes` for the list")]
    UnknownScene(String),
    #[error("image must be at least 1x1 (got {width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}
