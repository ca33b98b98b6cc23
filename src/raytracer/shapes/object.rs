use glam::{Quat, Vec3};

use super::Primitive;
use crate::raytracer::bvh::{self, BoundBox, BvhNode};
use crate::raytracer::error::Result;

/// Translation, rotation and (possibly non-uniform) scale, applied as
/// `rotation * (scale * point) + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn apply(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }
}

/// A mesh placed in the world through a transform. Its primitives stay in local space.
#[derive(Debug, Clone)]
pub struct Object {
    pub id: u32,
    pub transform: Transform,
    pub primitives: Vec<Primitive>,
}

impl Object {
    pub fn new(id: u32, transform: Transform, primitives: Vec<Primitive>) -> Self {
        Self {
            id,
            transform,
            primitives,
        }
    }

    /// Local-space BVH over this object's primitives, indexed by position in `primitives`.
    pub fn build_primitive_bvh(&self) -> Result<Vec<BvhNode>> {
        let boxes: Vec<BoundBox> = self
            .primitives
            .iter()
            .enumerate()
            .map(|(index, primitive)| BoundBox::primitive(index as i32, primitive))
            .collect();

        bvh::build(&boxes)
    }
}
