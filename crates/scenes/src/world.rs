use std::f32::consts::PI;

use anyhow::Result;
use progressive::{PixelEmitter, PixelSample, SamplerConfig, ScenePixelSource};
use tracing::debug;

use crate::color::Color;
use crate::geometry::{Hit, Object, Ray, Shape, Vec3};
use crate::sampler::Sampler;

/// Height of the orthographic eye above the view plane.
const EYE_HEIGHT: f64 = 100.0;

/// How a primary ray is turned into a colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tracer {
    /// First object hit in the object list, flat coloured.
    SingleSphere,
    /// Nearest object hit, flat coloured.
    MultipleObjects,
    /// Nearest object hit, shaded with its matte material.
    RayCast,
    /// Greyscale `0.5 * (1 + sin(x^2 y^2))` over the ray origin in degrees.
    Math,
    /// Every ray returns the same colour.
    Debug(Color),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub radiance: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPlane {
    pub hres: u32,
    pub vres: u32,
    pub pixel_size: f64,
}

/// An orthographic scene that renders one row of pixels at a time.
#[derive(Debug)]
pub struct World {
    view: ViewPlane,
    background: Color,
    tracer: Tracer,
    objects: Vec<Object>,
    ambient: Color,
    lights: Vec<PointLight>,
    sampler: Sampler,
}

impl World {
    pub fn new(view: ViewPlane, tracer: Tracer, sampler: SamplerConfig) -> Self {
        Self {
            view,
            background: Color::BLACK,
            tracer,
            objects: Vec::new(),
            ambient: Color::WHITE,
            lights: Vec::new(),
            sampler: Sampler::new(sampler),
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    pub fn view(&self) -> ViewPlane {
        self.view
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn tracer(&self) -> Tracer {
        self.tracer
    }

    /// Colour seen along a single ray.
    pub fn trace(&self, ray: &Ray) -> Color {
        match self.tracer {
            Tracer::SingleSphere => self
                .objects
                .iter()
                .find_map(|object| object.shape.hit(ray).map(|_| object.color))
                .unwrap_or(self.background),
            Tracer::MultipleObjects => self
                .nearest_hit(ray)
                .map(|(object, _)| object.color)
                .unwrap_or(self.background),
            Tracer::RayCast => match self.nearest_hit(ray) {
                Some((object, hit)) => self.shade(object, &hit),
                None => self.background,
            },
            Tracer::Math => sinusoid(ray),
            Tracer::Debug(color) => color,
        }
    }

    fn nearest_hit(&self, ray: &Ray) -> Option<(&Object, Hit)> {
        self.objects
            .iter()
            .filter_map(|object| object.shape.hit(ray).map(|hit| (object, hit)))
            .min_by(|a, b| a.1.t.total_cmp(&b.1.t))
    }

    fn shade(&self, object: &Object, hit: &Hit) -> Color {
        let Some(matte) = object.material else {
            return object.color;
        };

        let mut radiance = matte.cd * matte.ka * self.ambient;
        let diffuse = matte.cd * (matte.kd / PI);
        for light in &self.lights {
            let towards = (light.position - hit.point).normalized();
            let cosine = hit.normal.dot(towards);
            if cosine > 0.0 {
                radiance += diffuse * (light.color * light.radiance) * cosine as f32;
            }
        }
        radiance
    }

    fn pixel_color(&mut self, column: u32, row: u32) -> Color {
        let view = self.view;
        self.sampler.next_pixel();
        let samples = self.sampler.samples();
        let mut sum = Color::BLACK;
        for sample in samples {
            let x = view.pixel_size * (f64::from(column) - 0.5 * f64::from(view.hres) + sample.x);
            let y = view.pixel_size * (f64::from(row) - 0.5 * f64::from(view.vres) + sample.y);
            let ray = Ray::new(Vec3::new(x, y, EYE_HEIGHT), Vec3::new(0.0, 0.0, -1.0));
            sum += self.trace(&ray);
        }
        sum / samples.len() as f32
    }
}

impl ScenePixelSource for World {
    fn render(&mut self, emitter: &mut PixelEmitter) -> Result<()> {
        let ViewPlane { hres, vres, .. } = self.view;
        debug!(
            hres,
            vres,
            tracer = ?self.tracer,
            sampler = %self.sampler.kind(),
            samples = self.sampler.samples_per_pixel(),
            "rendering world"
        );

        for row in 0..vres {
            for column in 0..hres {
                let color = self.pixel_color(column, row).to_rgb8();
                // World row 0 is the bottom image row.
                let sample = PixelSample::new(column, vres - 1 - row, color);
                if emitter.emit(sample).is_stop() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

fn sinusoid(ray: &Ray) -> Color {
    let x = ray.origin.x.to_radians();
    let y = ray.origin.y.to_radians();
    let value = 0.5 * (1.0 + (x * x * y * y).sin());
    Color::gray(value as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Matte;
    use progressive::SamplerKind;

    fn single_sample() -> SamplerConfig {
        SamplerConfig::new(SamplerKind::Regular, 1)
    }

    fn down(x: f64, y: f64) -> Ray {
        Ray::new(Vec3::new(x, y, EYE_HEIGHT), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn nearest_object_wins() {
        let view = ViewPlane { hres: 4, vres: 4, pixel_size: 1.0 };
        let mut world = World::new(view, Tracer::MultipleObjects, single_sample());
        world.add_object(Object::colored(
            Shape::sphere(Vec3::new(0.0, 0.0, -50.0), 10.0),
            Color::RED,
        ));
        world.add_object(Object::colored(
            Shape::sphere(Vec3::new(0.0, 0.0, 0.0), 10.0),
            Color::YELLOW,
        ));
        assert_eq!(world.trace(&down(0.0, 0.0)), Color::YELLOW);
        assert_eq!(world.trace(&down(50.0, 0.0)), Color::BLACK);
    }

    #[test]
    fn matte_shading_adds_ambient_and_diffuse() {
        let view = ViewPlane { hres: 1, vres: 1, pixel_size: 1.0 };
        let mut world = World::new(view, Tracer::RayCast, single_sample());
        let matte = Matte { ka: 0.2, kd: 0.8, cd: Color::WHITE };
        world.add_object(Object::matte(Shape::sphere(Vec3::default(), 10.0), matte));
        let lit = world.trace(&down(0.0, 0.0));
        assert!((lit.r - 0.2).abs() < 1e-6, "ambient only without lights");

        world.add_light(PointLight {
            position: Vec3::new(0.0, 0.0, 1000.0),
            radiance: 1.0,
            color: Color::WHITE,
        });
        let lit = world.trace(&down(0.0, 0.0));
        assert!((lit.r - (0.2 + 0.8 / PI)).abs() < 1e-4);
    }

    #[test]
    fn sinusoid_is_half_grey_on_the_axes() {
        assert_eq!(sinusoid(&down(0.0, 25.0)), Color::gray(0.5));
    }
}
