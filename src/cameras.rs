//! Cameras and configs for cameras
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::utils::{self, SerdeVector};
use crate::{Point, Ray, Vec3};

/// Camera Config
///
/// `focus_distance` may be omitted, in which case focus falls on the
/// look-at point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub look_from: SerdeVector,
    pub look_at: SerdeVector,
    pub v_up: SerdeVector,
    pub vertical_fov_deg: f64,
    pub aspect_ratio: f64,
    pub aperture: f64,
    pub focus_distance: Option<f64>,
}

/// Camera and related tasks
///
/// The orthonormal basis and viewport vectors are derived once at
/// construction and never change afterwards.
#[derive(Debug)]
pub struct Camera {
    origin: Point,
    lower_left_corner: Point,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    _w: Vec3,
    lens_radius: f64,
}
impl Camera {
    pub fn new(
        look_from: Point,
        look_at: Point,
        v_up: Vec3,
        vertical_fov_deg: f64,
        aspect_ratio: f64,
        aperture: f64,
        focus_dist: f64,
    ) -> Self {
        assert!(
            aspect_ratio > 0.0,
            "aspect ratio must be positive, got {aspect_ratio}"
        );
        assert!(
            focus_dist > 0.0,
            "focus distance must be positive, got {focus_dist}"
        );
        assert!(
            !utils::near_zero(&(look_from - look_at)),
            "look_from and look_at must be distinct points"
        );

        // Establish the viewport
        let theta = vertical_fov_deg.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        // Calculate the viewing vectors
        let w = (look_from - look_at).normalize();
        let u = (v_up.cross(&w)).normalize();
        let v = w.cross(&u);

        let origin = look_from;
        let horizontal = focus_dist * viewport_width * u;
        let vertical = focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - focus_dist * w;

        let lens_radius = aperture / 2.0;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            _w: w,
            lens_radius,
        }
    }

    pub fn from_config(config: CameraConfig) -> Self {
        let look_from: Point = config.look_from.into();
        let look_at: Point = config.look_at.into();
        let focus_distance = config
            .focus_distance
            .unwrap_or_else(|| (look_from - look_at).norm());
        Self::new(
            look_from,
            look_at,
            config.v_up.into(),
            config.vertical_fov_deg,
            config.aspect_ratio,
            config.aperture,
            focus_distance,
        )
    }

    /// Ray through viewport coordinates `(s, t)` in [0, 1]
    ///
    /// `(0, 0)` maps to the lower-left image corner. With a nonzero aperture
    /// the origin jitters over the lens disk, so all rays through the same
    /// `(s, t)` converge at the focus plane.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut impl Rng) -> Ray {
        let rd = self.lens_radius * utils::random_in_unit_disk(rng);
        let offset = self.u * rd[0] + self.v * rd[1];

        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.origin - offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole() -> Camera {
        // vfov 90 with aspect 2 gives a 4x2 viewport at focus distance 1
        Camera::new(
            Point::zeros(),
            Point::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 1.0, 0.0),
            90.0,
            2.0,
            0.0,
            1.0,
        )
    }

    #[test]
    fn corner_ray_points_at_lower_left() {
        let camera = pinhole();
        let mut rng = StdRng::seed_from_u64(1);
        let ray = camera.get_ray(0.0, 0.0, &mut rng);

        assert_eq!(ray.orig, Point::zeros());
        assert!((ray.dir - Vec3::new(-2.0, -1.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn center_ray_points_at_look_at() {
        let look_from = Point::new(13.0, 2.0, 3.0);
        let look_at = Point::new(0.0, 0.0, 0.0);
        let camera = Camera::new(
            look_from,
            look_at,
            Vec3::new(0.0, 1.0, 0.0),
            20.0,
            16.0 / 9.0,
            0.0,
            (look_from - look_at).norm(),
        );
        let mut rng = StdRng::seed_from_u64(1);
        let ray = camera.get_ray(0.5, 0.5, &mut rng);

        let expected = (look_at - look_from).normalize();
        assert!((ray.unit_direction() - expected).norm() < 1e-12);
    }

    #[test]
    fn lens_jitter_stays_within_aperture() {
        let aperture = 0.5;
        let camera = Camera::new(
            Point::zeros(),
            Point::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 1.0, 0.0),
            90.0,
            2.0,
            aperture,
            1.0,
        );
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            assert!(ray.orig.norm() <= aperture / 2.0);
        }
    }

    #[test]
    fn config_defaults_focus_to_look_at_distance() {
        let config = CameraConfig {
            look_from: SerdeVector([3.0, 0.0, 0.0]),
            look_at: SerdeVector([0.0, 0.0, 0.0]),
            v_up: SerdeVector([0.0, 1.0, 0.0]),
            vertical_fov_deg: 90.0,
            aspect_ratio: 1.0,
            aperture: 0.0,
            focus_distance: None,
        };
        let camera = Camera::from_config(config);
        let mut rng = StdRng::seed_from_u64(1);
        // Focus plane sits at the look-at point, 3 units along -x
        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert!((ray.at(1.0) - Point::zeros()).norm() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "aspect ratio must be positive")]
    fn zero_aspect_ratio_is_a_contract_violation() {
        Camera::new(
            Point::zeros(),
            Point::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 1.0, 0.0),
            90.0,
            0.0,
            0.0,
            1.0,
        );
    }
}
