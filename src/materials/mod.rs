// Copyright @yucwang 2026

pub mod blinn;
pub mod microfacet;
pub mod phong;
