//! Path Tracing Library
//!
//! Renders scenes of spheres with diffuse, metal, and glass materials into a
//! raster image using stochastic path tracing.

use std::sync::Arc;

use nalgebra::Vector3;

pub mod cameras;
pub mod materials;
pub mod objects;
pub mod ppm;
pub mod render;
pub mod utils;

pub type Vec3 = Vector3<f64>;
pub type Point = Vec3;
pub type Color = Vec3;
/// Materials are immutable and shared by reference between any number of
/// spheres and the hit records that point back at them.
pub type MaterialRef = Arc<materials::Material>;

/// Prelude
pub mod prelude {
    pub use crate::cameras::{Camera, CameraConfig};
    pub use crate::materials::{Material, MaterialConfig};
    pub use crate::objects::{Sphere, World};
    pub use crate::render::{RenderSettings, Renderer};
    pub use crate::{Color, MaterialRef, Point, Ray, Vec3};
}

/// The ray in ray tracing
#[derive(Debug, Clone)]
pub struct Ray {
    pub orig: Point,
    pub dir: Vec3,
}
impl Ray {
    pub fn new(orig: Point, dir: Vec3) -> Self {
        Self { orig, dir }
    }

    /// Point reached after travelling `t` along the direction
    pub fn at(&self, t: f64) -> Point {
        self.orig + t * self.dir
    }

    pub fn unit_direction(&self) -> Vec3 {
        self.dir.normalize()
    }
}
