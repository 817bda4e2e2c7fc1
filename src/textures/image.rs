// Copyright @yucwang 2026

use crate::core::texture::Texture;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use image::io::Reader as ImageReader;
use image::GenericImageView;

pub struct ImageTexture {
    width: usize,
    height: usize,
    data: Vec<(Float, Float, Float)>,
}

impl ImageTexture {
    /// Load any format the `image` crate decodes (png/jpg/hdr/...) into a
    /// linear f32 pixel array.
    pub fn from_file(path: &str) -> std::result::Result<Self, String> {
        let img = ImageReader::open(path)
            .map_err(|e| format!("failed to open image {}: {}", path, e))?
            .decode()
            .map_err(|e| format!("failed to decode image {}: {}", path, e))?;

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(format!("texture has invalid resolution: {}x{}", width, height));
        }

        let rgb = img.to_rgb32f();
        let mut data = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let p = rgb.get_pixel(x, y);
                data.push((p[0], p[1], p[2]));
            }
        }

        log::info!("loaded texture {} ({}x{})", path, width, height);

        Ok(Self {
            width: width as usize,
            height: height as usize,
            data,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn sample_nearest(&self, u: Float, v: Float) -> RGBSpectrum {
        let mut u = u.fract();
        let mut v = v.fract();
        if u < 0.0 {
            u += 1.0;
        }
        if v < 0.0 {
            v += 1.0;
        }

        let x = (u * (self.width as Float - 1.0)).round() as usize;
        let y = ((1.0 - v) * (self.height as Float - 1.0)).round() as usize;
        let idx = y * self.width + x;
        let (r, g, b) = self.data[idx];
        RGBSpectrum::new(r, g, b)
    }
}

impl Texture for ImageTexture {
    fn eval(&self, uvw: Vector3f) -> RGBSpectrum {
        self.sample_nearest(uvw.x, uvw.y)
    }
}
