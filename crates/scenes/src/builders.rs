use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use progressive::{BoxedPixelSource, SceneParams};

use crate::color::Color;
use crate::geometry::{Matte, Object, Shape, Vec3};
use crate::world::{PointLight, Tracer, ViewPlane, World};
use crate::SceneError;

/// Built-in scenes selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKind {
    SingleSphere,
    SpheresAndPlane,
    MatteSphere,
    Math,
    Debug,
}

impl SceneKind {
    pub const ALL: [SceneKind; 5] = [
        SceneKind::SingleSphere,
        SceneKind::SpheresAndPlane,
        SceneKind::MatteSphere,
        SceneKind::Math,
        SceneKind::Debug,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::SingleSphere => "3.1",
            SceneKind::SpheresAndPlane => "3.2",
            SceneKind::MatteSphere => "4.4a",
            SceneKind::Math => "math",
            SceneKind::Debug => "debug",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SceneKind::SingleSphere => "single red sphere on black",
            SceneKind::SpheresAndPlane => "two spheres over a green plane",
            SceneKind::MatteSphere => "matte sphere lit by a point light",
            SceneKind::Math => "greyscale sinusoid 0.5(1 + sin(x^2 y^2))",
            SceneKind::Debug => "flat debug colour",
        }
    }

    /// Configures a world for `params`.
    pub fn world(self, params: &SceneParams) -> Result<World, SceneError> {
        if params.width == 0 || params.height == 0 {
            return Err(SceneError::EmptyImage {
                width: params.width,
                height: params.height,
            });
        }

        let view = |pixel_size| ViewPlane {
            hres: params.width,
            vres: params.height,
            pixel_size,
        };

        let world = match self {
            SceneKind::SingleSphere => {
                let mut world = World::new(view(1.0), Tracer::SingleSphere, params.sampler);
                world.add_object(Object::colored(
                    Shape::sphere(Vec3::default(), 100.0),
                    Color::RED,
                ));
                world
            }
            SceneKind::SpheresAndPlane => {
                let mut world = World::new(view(1.0), Tracer::MultipleObjects, params.sampler);
                world.add_object(Object::colored(
                    Shape::sphere(Vec3::new(0.0, -25.0, 0.0), 80.0),
                    Color::RED,
                ));
                world.add_object(Object::colored(
                    Shape::sphere(Vec3::new(0.0, 30.0, 0.0), 60.0),
                    Color::YELLOW,
                ));
                world.add_object(Object::colored(
                    Shape::plane(Vec3::default(), Vec3::new(0.0, 1.0, 1.0)),
                    Color::new(0.0, 0.3, 0.0),
                ));
                world
            }
            SceneKind::MatteSphere => {
                // Frame a 32 unit window whatever the image size.
                let pixel_size = 32.0 / f64::from(params.width.min(params.height));
                let mut world = World::new(view(pixel_size), Tracer::RayCast, params.sampler);
                world.add_light(PointLight {
                    position: Vec3::new(100.0, 100.0, 200.0),
                    radiance: 2.0,
                    color: Color::WHITE,
                });
                let matte = Matte {
                    ka: 0.2,
                    kd: 0.8,
                    cd: Color::YELLOW,
                };
                world.add_object(Object::matte(
                    Shape::sphere(Vec3::default(), 13.0),
                    matte,
                ));
                world
            }
            SceneKind::Math => World::new(view(1.0), Tracer::Math, params.sampler),
            SceneKind::Debug => World::new(
                view(1.0),
                Tracer::Debug(Color::new(1.0, 0.0, 1.0)),
                params.sampler,
            ),
        };
        Ok(world.with_background(Color::BLACK))
    }

    /// Builder closure accepted by `RenderController::start`.
    pub fn builder(self) -> impl Fn(&SceneParams) -> Result<BoxedPixelSource> {
        move |params: &SceneParams| -> Result<BoxedPixelSource> {
            Ok(Box::new(self.world(params)?))
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneKind {
    type Err = SceneError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "3.1" | "3_1" | "single-sphere" => Ok(SceneKind::SingleSphere),
            "3.2" | "3_2" | "spheres" => Ok(SceneKind::SpheresAndPlane),
            "4.4a" | "4_4a" | "matte" => Ok(SceneKind::MatteSphere),
            "math" => Ok(SceneKind::Math),
            "debug" => Ok(SceneKind::Debug),
            _ => Err(SceneError::UnknownScene(value.trim().to_string())),
        }
    }
}
