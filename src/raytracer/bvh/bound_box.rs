use glam::Vec3;

use super::Aabb;
use crate::raytracer::shapes::{Light, Object, PointLight, Primitive, Sphere, Triangle};

/// Padding applied to every entity box so flat or point-like geometry never yields a
/// zero-thickness slab.
pub const BOUND_EPSILON: f32 = 0.001;

/// The scene entity a [`BoundBox`] reads its bounds from.
#[derive(Debug, Clone, Copy)]
pub enum BoundKind<'a> {
    Triangle(&'a Triangle),
    Sphere(&'a Sphere),
    Primitive(&'a Primitive),
    Object(&'a Object),
    Light(&'a Light),
    PointLight(&'a PointLight),
}

/// Read-only view of one entity the BVH builder partitions.
///
/// `index` is the entity's position in the caller's own flat array and is the value that
/// ends up in leaf nodes.
#[derive(Debug, Clone, Copy)]
pub struct BoundBox<'a> {
    pub index: i32,
    pub kind: BoundKind<'a>,
}

impl<'a> BoundBox<'a> {
    pub fn new(index: i32, kind: BoundKind<'a>) -> Self {
        Self { index, kind }
    }

    pub fn triangle(index: i32, triangle: &'a Triangle) -> Self {
        Self::new(index, BoundKind::Triangle(triangle))
    }

    pub fn sphere(index: i32, sphere: &'a Sphere) -> Self {
        Self::new(index, BoundKind::Sphere(sphere))
    }

    pub fn primitive(index: i32, primitive: &'a Primitive) -> Self {
        Self::new(index, BoundKind::Primitive(primitive))
    }

    pub fn object(index: i32, object: &'a Object) -> Self {
        Self::new(index, BoundKind::Object(object))
    }

    pub fn light(index: i32, light: &'a Light) -> Self {
        Self::new(index, BoundKind::Light(light))
    }

    pub fn point_light(index: i32, point_light: &'a PointLight) -> Self {
        Self::new(index, BoundKind::PointLight(point_light))
    }

    /// World-space bounds, padded by [`BOUND_EPSILON`].
    pub fn bounding_box(&self) -> Aabb {
        match self.kind {
            BoundKind::Triangle(triangle) => {
                Aabb::from_points(triangle.corners).padded(BOUND_EPSILON)
            }
            BoundKind::Primitive(primitive) => {
                Aabb::from_points(primitive.corners).padded(BOUND_EPSILON)
            }
            BoundKind::Light(light) => Aabb::from_points(light.corners).padded(BOUND_EPSILON),
            BoundKind::Sphere(sphere) => Aabb::new(
                sphere.center - Vec3::splat(sphere.radius),
                sphere.center + Vec3::splat(sphere.radius),
            )
            .padded(BOUND_EPSILON),
            BoundKind::PointLight(point_light) => {
                Aabb::new(point_light.position, point_light.position).padded(BOUND_EPSILON)
            }
            BoundKind::Object(object) => object_bounding_box(object),
        }
    }
}

// Approximate: only the two extreme corners of the local box are transformed, so
// arbitrarily rotated objects can poke out of the result.
fn object_bounding_box(object: &Object) -> Aabb {
    let local = Aabb::from_points(
        object
            .primitives
            .iter()
            .flat_map(|primitive| primitive.corners),
    );
    if !local.is_finite() {
        return local;
    }

    let local = local.padded(BOUND_EPSILON);
    Aabb::from_points([
        object.transform.apply(local.min),
        object.transform.apply(local.max),
    ])
}
