//! Utils

use image::Rgb;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Color, Vec3};

/// Attempts before a rejection-sampling loop gives up and falls back to a
/// safe in-range vector. Acceptance is ~0.52 for the sphere and ~0.79 for
/// the disk, so a draw is expected to need about two attempts.
const MAX_REJECTION_ATTEMPTS: usize = 64;

/// Compute a random vector inside the unit sphere
///
/// Randomly generate vectors with components in [-1, 1). If the squared norm
/// is < 1, the vector is inside the unit sphere.
pub fn random_in_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    let mut p = Vec3::zeros();
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        p = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.norm_squared() < 1.0 {
            return p;
        }
    }
    // Every rejected candidate has norm >= 1, so scaling its unit vector
    // keeps the fallback inside the sphere
    p.normalize() * 0.999
}

/// Random vector on the surface of the unit sphere
///
/// Used for Lambertian scatter directions.
pub fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    random_in_unit_sphere(rng).normalize()
}

/// Generate a random vector inside a unit disk
///
/// This simulates defocus blur when sampling the camera lens.
pub fn random_in_unit_disk(rng: &mut impl Rng) -> Vec3 {
    let mut p = Vec3::zeros();
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        p = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
        if p.norm_squared() < 1.0 {
            return p;
        }
    }
    p.normalize() * 0.999
}

/// A uniform scatter direction for all angles away from the hit point
pub fn random_in_hemisphere(rng: &mut impl Rng, normal: &Vec3) -> Vec3 {
    let in_unit_sphere = random_in_unit_sphere(rng);
    if in_unit_sphere.dot(normal) > 0.0 {
        in_unit_sphere
    } else {
        -in_unit_sphere
    }
}

/// Whether every component of the vector is within tolerance of zero
pub fn near_zero(v: &Vec3) -> bool {
    let s = 1e-8;
    v[0].abs() < s && v[1].abs() < s && v[2].abs() < s
}

/// Mirror `v` about the surface normal `n`
pub fn reflect(v: &Vec3, n: &Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Bend `v` through a surface with normal `n` by the ratio of refractive
/// indices `etai_over_etat`
///
/// The caller must check for total internal reflection first; this always
/// produces a transmitted direction.
pub fn refract(v: &Vec3, n: &Vec3, etai_over_etat: f64) -> Vec3 {
    let cos_theta = (-v).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (v + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.norm_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

pub fn get_pixel(color: &Color, samples_per_pixel: usize) -> Rgb<u8> {
    let scale = 1.0 / samples_per_pixel as f64;

    // Divide the color by the number of samples and gamma-correct for gamma = 2.0
    let r = scale_color((scale * color[0]).sqrt());
    let g = scale_color((scale * color[1]).sqrt());
    let b = scale_color((scale * color[2]).sqrt());

    Rgb([r, g, b])
}

/// scale the color to between 0 and 255
pub fn scale_color(val: f64) -> u8 {
    (256.0 * val.min(0.999).max(0.0)) as u8
}

/// Vector representation inside config files
///
/// nalgebra types stay out of the serialized surface; configs hold plain
/// triples and convert on construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SerdeVector(pub [f64; 3]);
impl From<SerdeVector> for Vec3 {
    fn from(v: SerdeVector) -> Self {
        Vec3::new(v.0[0], v.0[1], v.0[2])
    }
}
impl From<Vec3> for SerdeVector {
    fn from(v: Vec3) -> Self {
        Self([v[0], v[1], v[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn vector_arithmetic() {
        let x = Vec3::new(2.0, 1.0, 5.0);
        let y = Vec3::new(4.0, 1.0, 1.0);

        assert_eq!(x + y, Vec3::new(6.0, 2.0, 6.0));
        assert_eq!(x - y, Vec3::new(-2.0, 0.0, 4.0));
        assert_eq!(x.component_mul(&y), Vec3::new(8.0, 1.0, 5.0));
        assert_eq!(x / 2.0, Vec3::new(1.0, 0.5, 2.5));
        assert_eq!(x.dot(&y), 14.0);
        assert_eq!(x.cross(&y), Vec3::new(-4.0, 18.0, -2.0));
        assert_eq!(x.dot(&x), x.norm_squared());
    }

    #[test]
    fn unit_vector_has_unit_length() {
        let v = Vec3::new(2.0, 1.0, 5.0);
        assert!((v.normalize().norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reflect_matches_reference_values() {
        let x = Vec3::new(2.0, 1.0, 5.0);
        let y = Vec3::new(4.0, 1.0, 1.0);
        assert_eq!(reflect(&x, &y), Vec3::new(-110.0, -27.0, -23.0));
    }

    #[test]
    fn reflect_negates_normal_component() {
        let v = Vec3::new(0.3, -0.7, 0.2);
        let n = Vec3::new(1.0, 2.0, -2.0).normalize();
        let r = reflect(&v, &n);
        assert!((r.dot(&n) + v.dot(&n)).abs() < 1e-12);
    }

    #[test]
    fn refract_matches_reference_values() {
        let x = Vec3::new(2.0, 1.0, 5.0);
        let y = Vec3::new(4.0, 1.0, 1.0);
        let refracted = refract(&x, &y, 1.2);
        let expected = Vec3::new(-334.8530318289354, -83.11325795723384, -78.31325795723384);
        assert!((refracted - expected).norm() < 1e-9);
    }

    #[test]
    fn near_zero_is_per_component() {
        assert!(near_zero(&Vec3::new(1e-9, -1e-9, 0.0)));
        assert!(!near_zero(&Vec3::new(1e-9, 1e-7, 0.0)));
    }

    #[test]
    fn unit_sphere_samples_stay_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let p = random_in_unit_sphere(&mut rng);
            assert!(p.norm_squared() < 1.0);
        }
    }

    #[test]
    fn unit_disk_samples_stay_flat_and_inside() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let p = random_in_unit_disk(&mut rng);
            assert_eq!(p[2], 0.0);
            assert!(p.norm_squared() < 1.0);
        }
    }

    #[test]
    fn hemisphere_samples_align_with_normal() {
        let mut rng = StdRng::seed_from_u64(13);
        let normal = Vec3::new(0.0, 1.0, 0.0);
        for _ in 0..1000 {
            let p = random_in_hemisphere(&mut rng, &normal);
            assert!(p.dot(&normal) >= 0.0);
        }
    }

    #[test]
    fn scale_color_clamps_to_byte_range() {
        assert_eq!(scale_color(-0.5), 0);
        assert_eq!(scale_color(0.0), 0);
        assert_eq!(scale_color(0.5), 128);
        assert_eq!(scale_color(1.5), 255);
    }

    #[test]
    fn serde_vector_round_trips() {
        let v = Vec3::new(1.0, -2.5, 3.0);
        let sv: SerdeVector = v.into();
        let back: Vec3 = sv.into();
        assert_eq!(v, back);
    }
}
