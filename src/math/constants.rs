/* Copyright @yucwang 2026 */

use nalgebra as na;

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = na::Vector2<Float>;
pub type Vector3f = na::Vector3<Float>;
pub type Matrix3f = na::Matrix3<Float>;
pub type Matrix4f = na::Matrix4<Float>;

pub const PI: Float = std::f32::consts::PI;
pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;

pub const FLOAT_MAX: Float = std::f32::MAX;
pub const FLOAT_MIN: Float = std::f32::MIN;

// Effectively infinite hit distance, used for rays that escape the scene.
pub const BIG_FLOAT: Float = std::f32::MAX;

// Intersection bias used by spheres, planes and light spheres.
pub const HIT_BIAS: Float = 2e-3;
// Tighter bias for the triangle parallel test.
pub const TRI_BIAS: Float = 2e-5;
