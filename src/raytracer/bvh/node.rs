use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::Aabb;

/// Marks an unused child or object slot. 0 is a valid index, so it can't be used.
pub const SENTINEL: i32 = -1;

/// Flattened BVH node as the traversal shader reads it.
///
/// Laid out for std430: the four indices fill the first 16 bytes and each `vec3` is
/// followed by 4 bytes of padding, 48 bytes in total.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    pub left_node: i32,
    pub right_node: i32,
    pub left_obj_index: i32,
    pub right_obj_index: i32,
    pub minimum: Vec3,
    _pad0: u32,
    pub maximum: Vec3,
    _pad1: u32,
}

impl Default for BvhNode {
    fn default() -> Self {
        Self {
            left_node: SENTINEL,
            right_node: SENTINEL,
            left_obj_index: SENTINEL,
            right_obj_index: SENTINEL,
            // Use very large/small numbers to indicate an "empty" bounding volume
            minimum: Aabb::EMPTY.min,
            _pad0: 0,
            maximum: Aabb::EMPTY.max,
            _pad1: 0,
        }
    }
}

impl BvhNode {
    pub fn internal(bounds: Aabb, left_node: i32, right_node: i32) -> Self {
        Self {
            left_node,
            right_node,
            minimum: bounds.min,
            maximum: bounds.max,
            ..Self::default()
        }
    }

    /// Leaf referencing one or two entities by their index in the caller's array.
    pub fn leaf(bounds: Aabb, left_obj_index: i32, right_obj_index: Option<i32>) -> Self {
        Self {
            left_obj_index,
            right_obj_index: right_obj_index.unwrap_or(SENTINEL),
            minimum: bounds.min,
            maximum: bounds.max,
            ..Self::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left_node == SENTINEL && self.right_node == SENTINEL
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.minimum, self.maximum)
    }

    /// Entity indices stored in a leaf; empty for internal nodes.
    pub fn object_indices(&self) -> impl Iterator<Item = i32> {
        [self.left_obj_index, self.right_obj_index]
            .into_iter()
            .filter(|&index| index != SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<BvhNode>(), 48);
        assert_eq!(std::mem::offset_of!(BvhNode, minimum), 16);
        assert_eq!(std::mem::offset_of!(BvhNode, maximum), 32);
    }

    #[test]
    fn default_node_uses_sentinels() {
        let node = BvhNode::default();
        assert!(node.is_leaf());
        assert_eq!(node.left_obj_index, -1);
        assert_eq!(node.right_obj_index, -1);
        assert_eq!(node.object_indices().count(), 0);
    }

    #[test]
    fn leaf_and_internal_encoding() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::ONE);

        let leaf = BvhNode::leaf(bounds, 0, None);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.object_indices().collect::<Vec<_>>(), vec![0]);

        let pair = BvhNode::leaf(bounds, 3, Some(7));
        assert_eq!(pair.object_indices().collect::<Vec<_>>(), vec![3, 7]);

        let internal = BvhNode::internal(bounds, 1, 2);
        assert!(!internal.is_leaf());
        assert_eq!(internal.left_obj_index, SENTINEL);
        assert_eq!(internal.right_obj_index, SENTINEL);
        assert_eq!(internal.bounds(), bounds);
    }
}
