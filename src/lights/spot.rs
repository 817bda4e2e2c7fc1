// Copyright @yucwang 2026

use crate::core::hit::{HitInfo, HitSide};
use crate::core::light::Light;
use crate::core::rng::LcgRng;
use crate::core::sampler::{DirSample, Lobe};
use crate::lights::intersect_light_sphere;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::frame::orthonormal_basis;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Spot light: the point light restricted to a cone. Shading points outside
/// the cone receive nothing, and the emissive sphere is only visible from
/// within it.
pub struct SpotLight {
    position: Vector3f,
    intensity: RGBSpectrum,
    size: Float,
    direction: Vector3f,
    /// Cone half-angle, radians.
    angle: Float,
}

impl SpotLight {
    pub fn new(
        position: Vector3f,
        intensity: RGBSpectrum,
        size: Float,
        direction: Vector3f,
        angle: Float,
    ) -> Self {
        Self { position, intensity, size, direction, angle }
    }

    fn in_cone(&self, p: Vector3f) -> bool {
        let p_dir = (p - self.position).normalize();
        p_dir.dot(&self.direction.normalize()) >= self.angle.cos()
    }
}

impl Light for SpotLight {
    fn intersect_ray(&self, ray: &Ray3f, hit: &mut HitInfo<'_>, side: HitSide) -> bool {
        // Only rays arriving from inside the cone can see the emitter.
        let ray_dir = -ray.dir.normalize();
        let norm_dir = self.direction.normalize();
        if ray_dir.dot(&norm_dir) < 0.0 {
            return false;
        }

        if !intersect_light_sphere(self.position, self.size, ray, hit, side) {
            return false;
        }

        // Angular offset of the hit point from the cone axis.
        let hit_dir = (hit.p - self.position).normalize();
        let hit_radius = (1.0 - hit_dir.dot(&norm_dir).powi(2)).max(0.0).sqrt();
        if hit_radius > self.angle.sin() {
            return false;
        }

        true
    }

    fn generate_sample(&self, p: Vector3f, rng: &mut LcgRng) -> Option<(Vector3f, DirSample)> {
        if !self.in_cone(p) {
            return None;
        }

        let radius = self.angle.sin() * self.size;

        let sample_radius = rng.next_f32().sqrt() * radius;
        let theta = rng.next_f32() * 2.0 * PI;
        let x_offset = sample_radius * theta.cos();
        let y_offset = sample_radius * theta.sin();

        let (u, v) = orthonormal_basis(&(self.position - p).normalize());
        let samp_point = self.position + u * x_offset + v * y_offset;

        let dir = samp_point - p;

        let info = DirSample {
            prob: 1.0 / (radius * radius * PI),
            mult: self.intensity * (1.0 / dir.norm_squared()),
            lobe: Lobe::None,
        };
        Some((dir, info))
    }

    fn sample_info(&self, p: Vector3f, dir: Vector3f) -> DirSample {
        if !self.in_cone(p) {
            return DirSample::void();
        }

        let mut hit = HitInfo::default();
        let ray = Ray3f::new(p, dir);
        if self.intersect_ray(&ray, &mut hit, HitSide::Front) {
            // Unitless angular radius, consistent with the inverse-square
            // form used by the sampler.
            let radius = self.angle.sin();
            let diff = hit.p - p;
            let dist_sq = diff.norm_squared();
            DirSample {
                prob: 2.0 * radius * radius / dist_sq,
                mult: self.intensity * (4.0 * PI * radius * radius / dist_sq),
                lobe: Lobe::None,
            }
        } else {
            DirSample::void()
        }
    }

    fn radiance(&self) -> RGBSpectrum {
        self.intensity
    }
}

/* Tests for SpotLight */

#[cfg(test)]
mod tests {
    use super::*;

    fn downward_spot() -> SpotLight {
        SpotLight::new(
            Vector3f::new(0.0, 0.0, 5.0),
            RGBSpectrum::gray(25.0),
            0.25,
            Vector3f::new(0.0, 0.0, -1.0),
            0.4,
        )
    }

    #[test]
    fn test_point_inside_cone_gets_a_sample() {
        let l = downward_spot();
        let mut rng = LcgRng::new(11);
        let (dir, info) = l
            .generate_sample(Vector3f::zeros(), &mut rng)
            .expect("origin lies on the cone axis");
        assert!(info.prob > 0.0);
        assert!(dir.normalize().dot(&Vector3f::new(0.0, 0.0, 1.0)) > 0.95);
    }

    #[test]
    fn test_point_outside_cone_is_rejected() {
        let l = downward_spot();
        let mut rng = LcgRng::new(11);
        // Far off-axis: the angle from the cone axis exceeds 0.4 rad.
        let p = Vector3f::new(40.0, 0.0, 0.0);
        assert!(l.generate_sample(p, &mut rng).is_none());
        let info = l.sample_info(p, Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(info.prob, 0.0);
    }

    #[test]
    fn test_emitter_visible_only_from_inside_cone() {
        let l = downward_spot();

        // Looking up the axis from below: visible.
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0));
        let mut hit = HitInfo::default();
        assert!(l.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));

        // Looking down from above: the reversed direction points away from
        // the cone axis.
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 10.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();
        assert!(!l.intersect_ray(&ray, &mut hit, HitSide::FrontAndBack));
    }
}
