//! Bounding volume hierarchy over scene entities, flattened into an index-addressed array
//! the ray tracing compute shader walks without recursion.

pub mod aabb;
pub mod bound_box;
pub mod builder;
pub mod node;
pub mod split;

pub use aabb::*;
pub use bound_box::*;
pub use builder::{build, BvhBuilder, MAX_LEAF_SIZE};
pub use node::*;
