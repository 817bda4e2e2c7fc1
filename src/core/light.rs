// Copyright @yucwang 2026

use crate::core::hit::{HitInfo, HitSide};
use crate::core::rng::LcgRng;
use crate::core::sampler::DirSample;
use crate::math::constants::Vector3f;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

pub trait Light: Send + Sync {
    /// Test the light's emissive body against a world-space ray.
    fn intersect_ray(&self, ray: &Ray3f, hit: &mut HitInfo<'_>, side: HitSide) -> bool;

    /// Draw a direction from the shading point `p` towards the light. The
    /// returned direction is unnormalized: it spans from `p` to the sampled
    /// point, so a shadow ray along it uses `t_max = 1`. `None` when `p`
    /// cannot receive light (e.g. outside a spot cone).
    fn generate_sample(&self, p: Vector3f, rng: &mut LcgRng) -> Option<(Vector3f, DirSample)>;

    /// PDF and throughput this light would have assigned to an externally
    /// chosen direction out of `p`; void when the direction misses the light.
    fn sample_info(&self, p: Vector3f, dir: Vector3f) -> DirSample;

    /// Radiance when the light body is seen directly by a primary ray.
    fn radiance(&self) -> RGBSpectrum;

    fn is_renderable(&self) -> bool {
        true
    }

    fn is_photon_source(&self) -> bool {
        true
    }
}

/// Identity comparison for the "did the shadow ray reach the light it was
/// aimed at" test.
pub fn same_light(a: &dyn Light, b: &dyn Light) -> bool {
    std::ptr::eq(a as *const dyn Light as *const (), b as *const dyn Light as *const ())
}
