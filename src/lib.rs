//! Flattened BVH construction for a hybrid rasterized / ray traced renderer.

pub mod raytracer;
