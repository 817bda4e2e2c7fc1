// Copyright @yucwang 2026

use crate::math::constants::{Float, UInt, BIG_FLOAT};

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A flat pixel-indexed buffer shared by the render workers without a lock.
/// The scheduler's atomic counter hands each index to exactly one worker, so
/// every slot is written by at most one thread; callers must uphold that
/// claim when writing.
struct PixelBuffer<T> {
    data: UnsafeCell<Vec<T>>,
}

unsafe impl<T: Send> Sync for PixelBuffer<T> {}

impl<T: Copy> PixelBuffer<T> {
    fn new(len: usize, fill: T) -> Self {
        Self {
            data: UnsafeCell::new(vec![fill; len]),
        }
    }

    fn write(&self, index: usize, value: T) {
        unsafe {
            (&mut *self.data.get())[index] = value;
        }
    }

    fn read(&self, index: usize) -> T {
        unsafe { (&*self.data.get())[index] }
    }

    fn to_vec(&self) -> Vec<T> {
        unsafe { (*self.data.get()).clone() }
    }
}

/// Output buffers of a render: 8-bit RGB color, a float Z-buffer and the
/// per-pixel sample counts, plus the counters the workers coordinate on.
pub struct RenderImage {
    width: usize,
    height: usize,
    pixels: PixelBuffer<[u8; 3]>,
    zbuffer: PixelBuffer<Float>,
    sample_counts: PixelBuffer<UInt>,
    rendered_pixels: AtomicUsize,
    is_rendering: AtomicBool,
}

impl RenderImage {
    pub fn new(width: usize, height: usize) -> Self {
        let n = width * height;
        Self {
            width,
            height,
            pixels: PixelBuffer::new(n, [0, 0, 0]),
            zbuffer: PixelBuffer::new(n, BIG_FLOAT),
            sample_counts: PixelBuffer::new(n, 0),
            rendered_pixels: AtomicUsize::new(0),
            is_rendering: AtomicBool::new(false),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    pub fn set_pixel(&self, index: usize, rgb: [u8; 3]) {
        self.pixels.write(index, rgb);
    }

    pub fn set_z(&self, index: usize, z: Float) {
        self.zbuffer.write(index, z);
    }

    pub fn set_sample_count(&self, index: usize, count: UInt) {
        self.sample_counts.write(index, count);
    }

    pub fn pixel(&self, index: usize) -> [u8; 3] {
        self.pixels.read(index)
    }

    pub fn z(&self, index: usize) -> Float {
        self.zbuffer.read(index)
    }

    pub fn sample_count(&self, index: usize) -> UInt {
        self.sample_counts.read(index)
    }

    /// Row-major RGB24 bytes, top-left origin, for PNG encoding.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.num_pixels() * 3);
        for px in self.pixels.to_vec() {
            bytes.extend_from_slice(&px);
        }
        bytes
    }

    pub fn zbuffer_copy(&self) -> Vec<Float> {
        self.zbuffer.to_vec()
    }

    /// Bump the rendered-pixel counter and return the new total.
    pub fn increment_rendered(&self, n: usize) -> usize {
        self.rendered_pixels.fetch_add(n, Ordering::AcqRel) + n
    }

    pub fn rendered_pixels(&self) -> usize {
        self.rendered_pixels.load(Ordering::Acquire)
    }

    pub fn render_done(&self) -> bool {
        self.rendered_pixels() >= self.num_pixels()
    }

    /// Release/acquire pair so an external poller observes completed buffer
    /// writes once the flag drops.
    pub fn set_rendering(&self, value: bool) {
        self.is_rendering.store(value, Ordering::Release);
    }

    pub fn is_rendering(&self) -> bool {
        self.is_rendering.load(Ordering::Acquire)
    }
}
