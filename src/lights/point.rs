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

/// Point light with a finite emissive radius. Next-event samples are drawn
/// uniformly from the disk the light subtends as seen from the shading
/// point, so shadows soften with `size`.
pub struct PointLight {
    position: Vector3f,
    intensity: RGBSpectrum,
    size: Float,
}

impl PointLight {
    pub fn new(position: Vector3f, intensity: RGBSpectrum, size: Float) -> Self {
        Self { position, intensity, size }
    }

    pub fn position(&self) -> Vector3f {
        self.position
    }

    pub fn intensity(&self) -> RGBSpectrum {
        self.intensity
    }

    pub fn size(&self) -> Float {
        self.size
    }

    /// Radius of the apparent disk: the light sphere projected onto the
    /// plane through its center, perpendicular to the view line.
    fn apparent_radius(&self, p: Vector3f) -> Float {
        let disk_norm = self.position - p;
        let len_sq = disk_norm.norm_squared();
        (len_sq - self.size * self.size).max(0.0).sqrt() * self.size / len_sq.sqrt()
    }
}

impl Light for PointLight {
    fn intersect_ray(&self, ray: &Ray3f, hit: &mut HitInfo<'_>, side: HitSide) -> bool {
        intersect_light_sphere(self.position, self.size, ray, hit, side)
    }

    fn generate_sample(&self, p: Vector3f, rng: &mut LcgRng) -> Option<(Vector3f, DirSample)> {
        let radius = self.apparent_radius(p);

        let sample_radius = rng.next_f32().sqrt() * self.size;
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
        let mut hit = HitInfo::default();
        let ray = Ray3f::new(p, dir);
        if intersect_light_sphere(self.position, self.size, &ray, &mut hit, HitSide::Front) {
            let radius = self.apparent_radius(p);
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

/* Tests for PointLight */
