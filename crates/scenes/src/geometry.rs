use std::ops::{Add, Mul, Neg, Sub};

use crate::color::Color;

/// Rays closer than this to their origin are ignored.
const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, rhs: Vec3) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn normalized(self) -> Vec3 {
        let length = self.length();
        if length > 0.0 {
            self * (1.0 / length)
        } else {
            self
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest intersection of a ray with an object.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub t: f64,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Lambertian surface with an ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matte {
    pub ka: f32,
    pub kd: f32,
    pub cd: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { center: Vec3, radius: f64 },
    Plane { point: Vec3, normal: Vec3 },
}

impl Shape {
    pub fn sphere(center: Vec3, radius: f64) -> Self {
        Shape::Sphere { center, radius }
    }

    pub fn plane(point: Vec3, normal: Vec3) -> Self {
        Shape::Plane {
            point,
            normal: normal.normalized(),
        }
    }

    pub fn hit(&self, ray: &Ray) -> Option<Hit> {
        match *self {
            Shape::Sphere { center, radius } => {
                let offset = ray.origin - center;
                let a = ray.direction.dot(ray.direction);
                let b = 2.0 * offset.dot(ray.direction);
                let c = offset.dot(offset) - radius * radius;
                let disc = b * b - 4.0 * a * c;
                if disc < 0.0 {
                    return None;
                }
                let root = disc.sqrt();
                let near = (-b - root) / (2.0 * a);
                let far = (-b + root) / (2.0 * a);
                let t = if near > EPSILON {
                    near
                } else if far > EPSILON {
                    far
                } else {
                    return None;
                };
                let point = ray.at(t);
                Some(Hit {
                    t,
                    point,
                    normal: (point - center) * (1.0 / radius),
                })
            }
            Shape::Plane { point, normal } => {
                let denom = ray.direction.dot(normal);
                if denom.abs() < f64::EPSILON {
                    return None;
                }
                let t = (point - ray.origin).dot(normal) / denom;
                (t > EPSILON).then(|| Hit {
                    t,
                    point: ray.at(t),
                    normal,
                })
            }
        }
    }
}

/// A shape with either a flat colour or a matte material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Object {
    pub shape: Shape,
    pub color: Color,
    pub material: Option<Matte>,
}

impl Object {
    pub fn colored(shape: Shape, color: Color) -> Self {
        Self {
            shape,
            color,
            material: None,
        }
    }

    pub fn matte(shape: Shape, material: Matte) -> Self {
        Self {
            shape,
            color: material.cd,
            material: Some(material),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_z(x: f64, y: f64) -> Ray {
        Ray::new(Vec3::new(x, y, 100.0), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn sphere_hit_reports_front_surface() {
        let sphere = Shape::sphere(Vec3::default(), 10.0);
        let hit = sphere.hit(&down_z(0.0, 0.0)).expect("centre ray hits");
        assert!((hit.t - 90.0).abs() < 1e-9);
        assert!((hit.normal.z - 1.0).abs() < 1e-9);
        assert!(sphere.hit(&down_z(11.0, 0.0)).is_none());
    }

    #[test]
    fn plane_parallel_to_ray_is_missed() {
        let plane = Shape::plane(Vec3::default(), Vec3::new(1.0, 0.0, 0.0));
        assert!(plane.hit(&down_z(5.0, 0.0)).is_none());
        let facing = Shape::plane(Vec3::default(), Vec3::new(0.0, 0.0, 1.0));
        assert!((facing.hit(&down_z(5.0, 3.0)).unwrap().t - 100.0).abs() < 1e-9);
    }
}
