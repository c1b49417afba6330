//! Objects
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    materials::{Material, MaterialConfig},
    utils::SerdeVector,
    MaterialRef, Point, Ray, Vec3,
};

pub trait Hittable {
    /// Nearest intersection with the ray inside `[t_min, t_max]`, if any
    ///
    /// `None` is the normal "no intersection" outcome, never a failure.
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord>;
}

/// Represents a hit
pub struct HitRecord {
    /// Point of intersection
    pub p: Point,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Ray parameter of the intersection
    pub t: f64,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
    /// Material of the surface that was hit
    pub material: MaterialRef,
}
impl HitRecord {
    pub fn new(
        p: Point,
        t: f64,
        ray: &Ray,
        outward_normal: &Vec3,
        material: MaterialRef,
    ) -> Self {
        let front_face = ray.dir.dot(outward_normal) < 0.0;
        let normal = if front_face {
            *outward_normal
        } else {
            -outward_normal
        };
        Self {
            p,
            normal,
            t,
            front_face,
            material,
        }
    }
}

pub struct Sphere {
    pub center: Point,
    pub radius: f64,
    pub material: MaterialRef,
}
impl Sphere {
    pub fn new(center: Point, radius: f64, material: MaterialRef) -> Self {
        assert!(radius > 0.0, "sphere radius must be positive, got {radius}");
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn from_config(config: SphereConfig) -> Self {
        Self::new(
            config.center.into(),
            config.radius,
            Arc::new(Material::from_config(config.material)),
        )
    }
}
impl Hittable for Sphere {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let oc = ray.orig - self.center;
        let a = ray.dir.norm_squared();
        let half_b = oc.dot(&ray.dir);
        let c = oc.norm_squared() - self.radius.powi(2);
        let discriminant = half_b.powi(2) - a * c;
        if discriminant < 0.0 {
            return None;
        }

        // Find the nearest root that lies in the acceptable range
        let sqrtd = discriminant.sqrt();
        let mut root = (-half_b - sqrtd) / a;
        if root < t_min || t_max < root {
            root = (-half_b + sqrtd) / a;
            if root < t_min || t_max < root {
                return None;
            }
        }
        let p = ray.at(root);
        let outward_normal = (p - self.center) / self.radius;
        Some(HitRecord::new(
            p,
            root,
            ray,
            &outward_normal,
            Arc::clone(&self.material),
        ))
    }
}

/// Sphere config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereConfig {
    pub center: SerdeVector,
    pub radius: f64,
    pub material: MaterialConfig,
}

/// The scene aggregate: an ordered collection of spheres
///
/// Insertion order does not affect the rendered output, but every query scans
/// the whole collection.
#[derive(Default)]
pub struct World(pub Vec<Sphere>);
impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sphere: Sphere) {
        self.0.push(sphere)
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_config(config: WorldConfig) -> Self {
        let mut world = Self::default();
        for sphere_cfg in config.objects {
            world.add(Sphere::from_config(sphere_cfg));
        }
        world
    }
}
impl Hittable for World {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let mut closest_so_far = t_max;
        let mut hr_final = None;

        for sphere in &self.0 {
            if let Some(hr) = sphere.try_hit(ray, t_min, closest_so_far) {
                closest_so_far = hr.t;
                hr_final = Some(hr)
            }
        }
        hr_final
    }
}

/// World Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub objects: Vec<SphereConfig>,
}
