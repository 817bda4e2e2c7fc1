// Copyright @yucwang 2026

use crate::core::halton::SampleTable;
use crate::core::hit::HitInfo;
use crate::core::render_image::RenderImage;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::integrators::volpath::VolPathIntegrator;
use crate::math::constants::{Float, UInt, BIG_FLOAT};
use crate::math::spectrum::RGBSpectrum;
use crate::sensors::perspective::PerspectiveCamera;

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

// The integrator recurses up to its bounce cap, so workers get roomy stacks.
const WORKER_STACK_SIZE: usize = 32 * 1024 * 1024;

/// The render engine: owns the scene, the sample table, the camera-ray
/// generator and the output buffers, and schedules pixels across a pool of
/// detached workers through a single shared atomic counter. One work unit
/// is one pixel; per-pixel RNG seeding keeps the output independent of the
/// worker count.
pub struct RenderEngine {
    scene: Scene,
    image: RenderImage,
    samples: SampleTable,
    camera: PerspectiveCamera,
    sample_max: usize,
    next_pixel: AtomicUsize,
}

impl RenderEngine {
    pub fn new(scene: Scene, sample_max: usize) -> Self {
        let camera = PerspectiveCamera::new(scene.camera());
        let image = RenderImage::new(scene.camera().img_width, scene.camera().img_height);
        Self {
            scene,
            image,
            samples: SampleTable::new(sample_max.max(1)),
            camera,
            sample_max: sample_max.max(1),
            next_pixel: AtomicUsize::new(0),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn image(&self) -> &RenderImage {
        &self.image
    }

    pub fn sample_max(&self) -> usize {
        self.sample_max
    }

    pub fn is_rendering(&self) -> bool {
        self.image.is_rendering()
    }

    /// Cancellation hook; rendering currently always drains the pixel queue.
    pub fn stop_render(&self) {}

    /// Half the hardware threads, at least one; a single worker in debug
    /// builds keeps traces readable.
    pub fn worker_count() -> usize {
        if cfg!(debug_assertions) {
            return 1;
        }
        let n = thread::available_parallelism().map(|n| n.get()).unwrap_or(2) / 2;
        n.max(1)
    }

    /// Launch the worker pool and return immediately; completion is
    /// observed by polling `is_rendering`.
    pub fn begin_render(self: Arc<Self>) {
        let num_pixels = self.image.num_pixels();
        if num_pixels == 0 {
            self.image.set_rendering(false);
            return;
        }

        let n = Self::worker_count();
        log::info!(
            "rendering {}x{} at {} spp with {} threads",
            self.image.width(),
            self.image.height(),
            self.sample_max,
            n
        );

        self.image.set_rendering(true);

        let progress = ProgressBar::new(num_pixels as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} pixels")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for _ in 0..n {
            let engine = Arc::clone(&self);
            let progress = progress.clone();
            thread::Builder::new()
                .stack_size(WORKER_STACK_SIZE)
                .spawn(move || {
                    engine.render_pixels(&progress);
                })
                .expect("failed to spawn render worker");
        }
    }

    /// Worker loop: claim a pixel index, render `sample_max` paths through
    /// it, write the averaged color, the nearest hit distance and the
    /// sample count, then claim the next index. The worker that observes
    /// the final rendered-pixel count clears the rendering flag.
    fn render_pixels(&self, progress: &ProgressBar) {
        let width = self.image.width();
        let height = self.image.height();
        let num_pixels = self.image.num_pixels();
        let srgb = self.scene.camera().srgb;

        let integrator = VolPathIntegrator::new(&self.scene, width, height);

        let mut index = self.next_pixel.fetch_add(1, Ordering::Relaxed);
        while index < num_pixels {
            let i = index % width;
            let j = index / width;

            let mut rng = LcgRng::new(index as u64);
            let pix_offset = rng.next_f32();
            let dof_offset = rng.next_f32();

            let mut accum = RGBSpectrum::black();
            let mut z_min = BIG_FLOAT;
            let mut hit = HitInfo::default();

            for n in 0..self.sample_max {
                let ray = self.camera.camera_ray(&self.samples, i, j, n, pix_offset, dof_offset);
                let sample = integrator.trace_path(ray, (i, j), &mut hit, &mut rng, 0);
                if hit.z < z_min {
                    z_min = hit.z;
                }
                accum += sample;
            }

            let mut color = accum / self.sample_max as Float;
            if srgb {
                color = color.linear_to_srgb();
            }

            self.image.set_pixel(index, color.to_rgb24());
            self.image.set_z(index, z_min);
            self.image.set_sample_count(index, self.sample_max as UInt);
            progress.inc(1);

            if self.image.increment_rendered(1) == num_pixels {
                // Only the worker finishing the last pixel gets here.
                progress.finish_and_clear();
                self.image.set_rendering(false);
                return;
            }

            index = self.next_pixel.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/* Tests for the render engine */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::Camera;
    use crate::lights::point::PointLight;
    use crate::math::constants::Vector3f;
    use crate::media::homogeneous::HomogeneousMedium;
    use crate::textures::constant::ConstantTexture;
    use std::time::{Duration, Instant};

    fn wait_for(engine: &RenderEngine) {
        let deadline = Instant::now() + Duration::from_secs(60);
        while engine.is_rendering() {
            assert!(Instant::now() < deadline, "render did not finish in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn tiny_camera(width: usize, height: usize) -> Camera {
        Camera {
            pos: Vector3f::zeros(),
            dir: Vector3f::new(0.0, 0.0, -1.0),
            up: Vector3f::new(0.0, 1.0, 0.0),
            fov: 60.0,
            focal_dist: 1.0,
            dof: 0.0,
            srgb: false,
            img_width: width,
            img_height: height,
        }
    }

    #[test]
    fn test_empty_scene_renders_background_exactly() {
        let mut scene = Scene::new();
        scene.set_camera(tiny_camera(2, 2));
        scene.set_medium(HomogeneousMedium::vacuum());
        scene.set_background(std::sync::Arc::new(ConstantTexture::new(RGBSpectrum::gray(0.5))));

        let engine = Arc::new(RenderEngine::new(scene, 1));
        Arc::clone(&engine).begin_render();
        wait_for(&engine);

        for idx in 0..engine.image().num_pixels() {
            assert_eq!(engine.image().pixel(idx), [128, 128, 128]);
            assert_eq!(engine.image().z(idx), BIG_FLOAT);
            assert_eq!(engine.image().sample_count(idx), 1);
        }
    }

    #[test]
    fn test_renders_are_deterministic_across_runs() {
        let build = || {
            let mut scene = Scene::new();
            scene.set_camera(tiny_camera(8, 6));
            scene.set_medium(HomogeneousMedium::new(0.15, 0.06));
            scene.add_light(Box::new(PointLight::new(
                Vector3f::new(0.0, 0.0, -5.0),
                RGBSpectrum::gray(25.0),
                0.5,
            )));
            scene
        };

        let engine_a = Arc::new(RenderEngine::new(build(), 8));
        Arc::clone(&engine_a).begin_render();
        wait_for(&engine_a);

        let engine_b = Arc::new(RenderEngine::new(build(), 8));
        Arc::clone(&engine_b).begin_render();
        wait_for(&engine_b);

        assert_eq!(engine_a.image().rgb_bytes(), engine_b.image().rgb_bytes());
        assert_eq!(engine_a.image().zbuffer_copy(), engine_b.image().zbuffer_copy());
    }

    #[test]
    fn test_light_facing_camera_saturates_center() {
        let mut scene = Scene::new();
        scene.set_camera(tiny_camera(3, 3));
        scene.set_medium(HomogeneousMedium::vacuum());
        scene.add_light(Box::new(PointLight::new(
            Vector3f::new(0.0, 0.0, -5.0),
            RGBSpectrum::gray(2.0),
            1.0,
        )));

        let engine = Arc::new(RenderEngine::new(scene, 4));
        Arc::clone(&engine).begin_render();
        wait_for(&engine);

        // Center pixel looks straight at the emissive sphere.
        let center = engine.image().pixel(4);
        assert_eq!(center, [255, 255, 255]);
        // Its depth is roughly the distance to the light sphere's near face.
        assert!((engine.image().z(4) - 4.0).abs() < 0.5);
    }
}
