// Copyright @yucwang 2026

use crate::core::material::{Material, MaterialSample};
use crate::core::rng::LcgRng;
use crate::core::sampler::{DirSample, ShadingPoint};
use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::textures::constant::ConstantTexture;
use std::sync::Arc;

/// Phong material variant. Direction sampling for the Phong lobe is not
/// implemented; the sampler reports no sample, so paths treat the surface
/// as absorbing. Only the Blinn layered material produces directions.
pub struct MtlPhong {
    diffuse: Arc<dyn Texture>,
    specular: Arc<dyn Texture>,
    glossiness: Arc<dyn Texture>,
}

impl Default for MtlPhong {
    fn default() -> Self {
        Self::new()
    }
}

impl MtlPhong {
    pub fn new() -> Self {
        Self {
            diffuse: Arc::new(ConstantTexture::new(RGBSpectrum::gray(0.5))),
            specular: Arc::new(ConstantTexture::new(RGBSpectrum::black())),
            glossiness: Arc::new(ConstantTexture::new(RGBSpectrum::gray(20.0))),
        }
    }

    pub fn with_diffuse(mut self, tex: Arc<dyn Texture>) -> Self {
        self.diffuse = tex;
        self
    }

    pub fn with_specular(mut self, tex: Arc<dyn Texture>) -> Self {
        self.specular = tex;
        self
    }

    pub fn with_glossiness(mut self, tex: Arc<dyn Texture>) -> Self {
        self.glossiness = tex;
        self
    }

    pub fn glossiness_at(&self, uvw: Vector3f) -> Float {
        self.glossiness.eval_scalar(uvw)
    }
}

impl Material for MtlPhong {
    fn generate_sample(&self, _sp: &ShadingPoint, _rng: &mut LcgRng) -> MaterialSample {
        MaterialSample::none()
    }

    fn sample_info(&self, _sp: &ShadingPoint, _dir: Vector3f) -> DirSample {
        DirSample::void()
    }
}
