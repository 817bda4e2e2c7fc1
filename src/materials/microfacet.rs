// Copyright @yucwang 2026

use crate::core::material::{Material, MaterialSample};
use crate::core::rng::LcgRng;
use crate::core::sampler::{DirSample, ShadingPoint};
use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::textures::constant::ConstantTexture;
use std::sync::Arc;

/// Microfacet material variant. Distribution sampling is not implemented;
/// the sampler reports no sample, so paths treat the surface as absorbing.
/// Only the Blinn layered material produces directions.
pub struct MtlMicrofacet {
    albedo: Arc<dyn Texture>,
    roughness: Float,
    ior: Float,
}

impl Default for MtlMicrofacet {
    fn default() -> Self {
        Self::new()
    }
}

impl MtlMicrofacet {
    pub fn new() -> Self {
        Self {
            albedo: Arc::new(ConstantTexture::new(RGBSpectrum::gray(0.5))),
            roughness: 0.5,
            ior: 1.5,
        }
    }

    pub fn with_albedo(mut self, tex: Arc<dyn Texture>) -> Self {
        self.albedo = tex;
        self
    }

    pub fn with_roughness(mut self, roughness: Float) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_ior(mut self, ior: Float) -> Self {
        self.ior = ior;
        self
    }
}

impl Material for MtlMicrofacet {
    fn generate_sample(&self, _sp: &ShadingPoint, _rng: &mut LcgRng) -> MaterialSample {
        MaterialSample::none()
    }

    fn sample_info(&self, _sp: &ShadingPoint, _dir: Vector3f) -> DirSample {
        DirSample::void()
    }
}
