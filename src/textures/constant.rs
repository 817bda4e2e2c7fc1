// Copyright @yucwang 2026

use crate::core::texture::Texture;
use crate::math::constants::Vector3f;
use crate::math::spectrum::RGBSpectrum;

pub struct ConstantTexture {
    value: RGBSpectrum,
}

impl ConstantTexture {
    pub fn new(value: RGBSpectrum) -> Self {
        Self { value }
    }
}

impl Texture for ConstantTexture {
    fn eval(&self, _uvw: Vector3f) -> RGBSpectrum {
        self.value
    }
}
