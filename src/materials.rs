//! Implementation of materials

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    objects::HitRecord,
    utils::{self, SerdeVector},
    Color, Ray,
};

/// Scatter Result
#[derive(Debug)]
pub struct ScatterResult {
    /// Attenuation Color
    pub attenuation: Color,
    /// Resulting Scattered Ray
    pub scattered: Ray,
}

/// Surface behavior of everything in the scene
///
/// A closed set of variants dispatched by exhaustive matching. `try_scatter`
/// returning `None` means the ray was absorbed, not that anything failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Matte surface scattering around the normal
    Lambertian { albedo: Color },
    /// Reflective surface; `fuzz` blurs the reflection
    Metal { albedo: Color, fuzz: f64 },
    /// Refractive surface such as glass; `ir` is the absolute refractive
    /// index of the medium (surrounding air is 1)
    Dielectric { ir: f64 },
}
impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Self::Lambertian { albedo }
    }

    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        Self::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(ir: f64) -> Self {
        assert!(ir > 0.0, "refractive index must be positive, got {ir}");
        Self::Dielectric { ir }
    }

    pub fn from_config(config: MaterialConfig) -> Self {
        match config {
            MaterialConfig::Lambertian(c) => Self::lambertian(c.albedo.into()),
            MaterialConfig::Metal(c) => Self::metal(c.albedo.into(), c.fuzz),
            MaterialConfig::Dielectric(c) => Self::dielectric(c.ir),
        }
    }

    pub fn try_scatter(
        &self,
        ray_in: &Ray,
        hit_record: &HitRecord,
        rng: &mut impl Rng,
    ) -> Option<ScatterResult> {
        match self {
            Self::Lambertian { albedo } => {
                let mut scatter_direction = hit_record.normal + utils::random_unit_vector(rng);

                // The random unit vector can be the exact opposite of the normal
                if utils::near_zero(&scatter_direction) {
                    scatter_direction = hit_record.normal;
                }
                Some(ScatterResult {
                    attenuation: *albedo,
                    scattered: Ray::new(hit_record.p, scatter_direction),
                })
            }
            Self::Metal { albedo, fuzz } => {
                let reflected = utils::reflect(&ray_in.unit_direction(), &hit_record.normal);
                if reflected.dot(&hit_record.normal) > 0.0 {
                    Some(ScatterResult {
                        attenuation: *albedo,
                        scattered: Ray::new(
                            hit_record.p,
                            reflected + *fuzz * utils::random_in_unit_sphere(rng),
                        ),
                    })
                } else {
                    // Grazing or self-occluding reflection, absorb the ray
                    None
                }
            }
            Self::Dielectric { ir } => {
                let refraction_ratio = if hit_record.front_face {
                    1.0 / ir
                } else {
                    *ir
                };

                let unit_direction = ray_in.unit_direction();
                let cos_theta = (-unit_direction).dot(&hit_record.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta.powi(2)).sqrt();

                let cannot_refract = refraction_ratio * sin_theta > 1.0;
                let direction = if cannot_refract
                    || Self::reflectance(cos_theta, refraction_ratio) > rng.gen::<f64>()
                {
                    utils::reflect(&unit_direction, &hit_record.normal)
                } else {
                    utils::refract(&unit_direction, &hit_record.normal, refraction_ratio)
                };

                Some(ScatterResult {
                    // Glass does not absorb color
                    attenuation: Color::new(1.0, 1.0, 1.0),
                    scattered: Ray::new(hit_record.p, direction),
                })
            }
        }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f64, ref_idx: f64) -> f64 {
        let r0 = ((1.0 - ref_idx) / (1.0 + ref_idx)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

/// Config for materials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialConfig {
    Lambertian(LambertianConfig),
    Metal(MetalConfig),
    Dielectric(DielectricConfig),
}

/// Lambertian Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambertianConfig {
    pub albedo: SerdeVector,
}

/// Metal Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetalConfig {
    pub albedo: SerdeVector,
    #[serde(default)]
    pub fuzz: f64,
}

/// Dielectric Config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DielectricConfig {
    pub ir: f64,
}
