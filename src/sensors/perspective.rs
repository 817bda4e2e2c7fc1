// Copyright @yucwang 2026

use crate::core::halton::SampleTable;
use crate::core::scene::Camera;
use crate::math::constants::{Float, Matrix3f, Vector3f, PI};
use crate::math::ray::Ray3f;

/// Camera-ray generator: image-plane extents, orientation basis and the
/// lens disk, precomputed from the scene camera. Rays carry unnormalized
/// directions spanning from the lens point to the image-plane destination.
pub struct PerspectiveCamera {
    pos: Vector3f,
    x_hat: Vector3f,
    y_hat: Vector3f,
    cam_to_world: Matrix3f,
    cam_w: Float,
    cam_h: Float,
    focal_dist: Float,
    dof: Float,
    width: usize,
    height: usize,
}

impl PerspectiveCamera {
    pub fn new(camera: &Camera) -> Self {
        let width = camera.img_width;
        let height = camera.img_height;

        // Image plane sits at the focal distance so the lens disk focuses
        // exactly onto it.
        let cam_h = 2.0 * camera.focal_dist * (camera.fov * PI / 360.0).tan();
        let cam_w = cam_h * width as Float / height.max(1) as Float;

        let y_hat = camera.up.normalize();
        let z_hat = -camera.dir.normalize();
        let x_hat = y_hat.cross(&z_hat).normalize();

        let cam_to_world = Matrix3f::from_columns(&[x_hat, y_hat, z_hat]);

        Self {
            pos: camera.pos,
            x_hat,
            y_hat,
            cam_to_world,
            cam_w,
            cam_h,
            focal_dist: camera.focal_dist,
            dof: camera.dof,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Camera-space destination on the image plane for sample `n` of pixel
    /// (i, j), jittered by the pixel's Halton phase.
    fn ray_dest(&self, table: &SampleTable, i: usize, j: usize, n: usize, pix_offset: Float) -> Vector3f {
        let (sx, sy) = table.get_sample(n, pix_offset);
        let x = -(self.cam_w / 2.0) + (self.cam_w / self.width as Float) * (i as Float + sx);
        let y = (self.cam_h / 2.0) - (self.cam_h / self.height as Float) * (j as Float + sy);
        Vector3f::new(x, y, -self.focal_dist)
    }

    /// Primary ray for sample `n` of pixel (i, j): the origin is offset on
    /// the lens disk (radius = dof) and the direction spans to the
    /// world-space destination, unnormalized.
    pub fn camera_ray(
        &self,
        table: &SampleTable,
        i: usize,
        j: usize,
        n: usize,
        pix_offset: Float,
        dof_offset: Float,
    ) -> Ray3f {
        let (du, dv) = table.get_disk_sample(n, dof_offset, self.dof);
        let origin = self.pos + self.x_hat * du + self.y_hat * dv;

        let dest = self.cam_to_world * self.ray_dest(table, i, j, n, pix_offset) + self.pos;

        Ray3f::new(origin, dest - origin)
    }
}

/* Tests for PerspectiveCamera */
