use glam::Vec3;
use log::debug;

use super::node::SENTINEL;
use super::split::{self, Split};
use super::{Aabb, BoundBox, BvhNode};
use crate::raytracer::error::{BvhError, Result};

/// Nodes holding this many entities or fewer become leaves.
pub const MAX_LEAF_SIZE: usize = 2;

/// A node under construction. Its position in the builder's arena is the position it
/// will have in the flattened output.
#[derive(Debug)]
struct BuildItem {
    bounds: Aabb,
    left_node: i32,
    right_node: i32,
    /// Positions into the builder's input slice.
    members: Vec<usize>,
}

impl BuildItem {
    fn new(members: Vec<usize>) -> Self {
        Self {
            bounds: Aabb::EMPTY,
            left_node: SENTINEL,
            right_node: SENTINEL,
            members,
        }
    }
}

/// Top-down BVH builder over a borrowed set of entity boxes.
///
/// Construction is iterative: an explicit stack of arena positions replaces recursion, and
/// children are appended to the arena as soon as their parent is split, so the arena is
/// already in flattened order when the stack drains.
pub struct BvhBuilder<'s, 'a> {
    boxes: &'s [BoundBox<'a>],
    bounds: Vec<Aabb>,
    centers: Vec<Vec3>,
    items: Vec<BuildItem>,
}

impl<'s, 'a> BvhBuilder<'s, 'a> {
    /// Computes every entity box up front and rejects input the builder can't partition.
    pub fn new(boxes: &'s [BoundBox<'a>]) -> Result<Self> {
        if boxes.is_empty() {
            return Err(BvhError::InvalidInput(
                "cannot build a BVH over zero entities".to_string(),
            ));
        }
        // Every node index must fit the shader's i32 fields.
        if boxes.len() > i32::MAX as usize / 2 {
            return Err(BvhError::InvalidInput(format!(
                "{} entities exceed the addressable node range",
                boxes.len()
            )));
        }

        let bounds: Vec<Aabb> = boxes.iter().map(BoundBox::bounding_box).collect();
        if let Some(position) = bounds.iter().position(|aabb| !aabb.is_finite()) {
            return Err(BvhError::InvalidInput(format!(
                "entity {} reported a non-finite bounding box",
                boxes[position].index
            )));
        }
        let centers = bounds.iter().map(Aabb::center).collect();

        Ok(Self {
            boxes,
            bounds,
            centers,
            items: Vec::with_capacity(2 * boxes.len() - 1),
        })
    }

    pub fn build(mut self) -> Vec<BvhNode> {
        self.items.push(BuildItem::new((0..self.boxes.len()).collect()));
        let mut stack = vec![0];
        let mut fallbacks = 0;

        while let Some(item_index) = stack.pop() {
            if let Some(split) = self.subdivide(item_index, &mut stack) {
                fallbacks += usize::from(split.median_fallback);
            }
        }

        debug!(
            "Built BVH over {} entities: {} nodes, {} median fallbacks",
            self.boxes.len(),
            self.items.len(),
            fallbacks
        );

        self.flatten()
    }

    fn update_bounds(&mut self, item_index: usize, members: &[usize]) -> Aabb {
        let bounds = members[1..]
            .iter()
            .fold(self.bounds[members[0]], |aabb, &member| {
                aabb.union(&self.bounds[member])
            });
        self.items[item_index].bounds = bounds;
        bounds
    }

    /// Splits one item in two, pushing both children onto `stack`. Returns `None` when the
    /// item is small enough to be a leaf.
    fn subdivide(&mut self, item_index: usize, stack: &mut Vec<usize>) -> Option<Split> {
        let mut members = std::mem::take(&mut self.items[item_index].members);
        let bounds = self.update_bounds(item_index, &members);
        let axis = bounds.longest_axis();

        // Stable, so members with equal midpoints keep their input order.
        let centers = &self.centers;
        members.sort_by(|&a, &b| centers[a][axis].total_cmp(&centers[b][axis]));

        if members.len() <= MAX_LEAF_SIZE {
            self.items[item_index].members = members;
            return None;
        }

        let midpoints: Vec<f32> = members
            .iter()
            .map(|&member| self.centers[member][axis])
            .collect();
        let split = split::choose_split(&midpoints, bounds.min[axis], bounds.extent()[axis]);

        let right_members = members.split_off(split.at);
        let left_child = self.items.len();
        self.items.push(BuildItem::new(members));
        let right_child = self.items.len();
        self.items.push(BuildItem::new(right_members));

        stack.push(left_child);
        stack.push(right_child);

        let item = &mut self.items[item_index];
        item.left_node = left_child as i32;
        item.right_node = right_child as i32;

        Some(split)
    }

    fn flatten(self) -> Vec<BvhNode> {
        let boxes = self.boxes;

        self.items
            .into_iter()
            .map(|item| {
                if item.left_node == SENTINEL && item.right_node == SENTINEL {
                    BvhNode::leaf(
                        item.bounds,
                        boxes[item.members[0]].index,
                        item.members.get(1).map(|&member| boxes[member].index),
                    )
                } else {
                    BvhNode::internal(item.bounds, item.left_node, item.right_node)
                }
            })
            .collect()
    }
}

/// Builds and flattens a BVH over `boxes`. Index 0 of the result is the root.
pub fn build(boxes: &[BoundBox<'_>]) -> Result<Vec<BvhNode>> {
    Ok(BvhBuilder::new(boxes)?.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raytracer::shapes::{Sphere, Square, Triangle};

    fn spheres(centers: &[Vec3]) -> Vec<Sphere> {
        centers
            .iter()
            .map(|&center| Sphere::new(center, Vec3::ONE, 0.25))
            .collect()
    }

    fn sphere_boxes(spheres: &[Sphere]) -> Vec<BoundBox<'_>> {
        spheres
            .iter()
            .enumerate()
            .map(|(index, sphere)| BoundBox::sphere(index as i32, sphere))
            .collect()
    }

    /// Checks the structural guarantees every flattened BVH must hold and returns the
    /// number of leaves.
    fn assert_well_formed(nodes: &[BvhNode], entity_count: usize) -> usize {
        let mut seen = vec![0; entity_count];
        let mut leaves = 0;

        for (position, node) in nodes.iter().enumerate() {
            if node.is_leaf() {
                leaves += 1;
                assert_ne!(node.left_obj_index, SENTINEL, "leaf {position} holds nothing");
                for index in node.object_indices() {
                    seen[index as usize] += 1;
                }
            } else {
                assert!(node.left_node > position as i32);
                assert!(node.right_node > position as i32);
                assert_eq!(node.left_obj_index, SENTINEL);
                assert_eq!(node.right_obj_index, SENTINEL);

                let bounds = node.bounds();
                assert!(bounds.contains(&nodes[node.left_node as usize].bounds()));
                assert!(bounds.contains(&nodes[node.right_node as usize].bounds()));
            }
        }

        assert!(seen.iter().all(|&count| count == 1), "coverage: {seen:?}");
        assert_eq!(nodes.len(), 2 * leaves - 1);
        assert!(nodes.len() <= 2 * entity_count - 1);
        leaves
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(build(&[]), Err(BvhError::InvalidInput(_))));
    }

    #[test]
    fn non_finite_bounds_are_rejected() {
        let spheres = vec![
            Sphere::new(Vec3::ZERO, Vec3::ONE, 1.0),
            Sphere::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ONE, 1.0),
        ];
        let result = build(&sphere_boxes(&spheres));

        match result {
            Err(BvhError::InvalidInput(message)) => assert!(message.contains("entity 1")),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn single_entity_is_a_single_leaf() {
        let spheres = spheres(&[Vec3::new(1.0, 2.0, 3.0)]);
        let nodes = build(&sphere_boxes(&spheres)).unwrap();

        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_leaf());
        assert_eq!(nodes[0].left_obj_index, 0);
        assert_eq!(nodes[0].right_obj_index, SENTINEL);
    }

    #[test]
    fn two_entities_share_one_leaf() {
        let spheres = spheres(&[Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)]);
        let nodes = build(&sphere_boxes(&spheres)).unwrap();

        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_leaf());
        assert_eq!(nodes[0].left_obj_index, 0);
        assert_eq!(nodes[0].right_obj_index, 1);
    }

    #[test]
    fn leaf_stores_caller_index_not_build_position() {
        let spheres = spheres(&[Vec3::ZERO]);
        let boxes = vec![BoundBox::sphere(41, &spheres[0])];
        let nodes = build(&boxes).unwrap();

        assert_eq!(nodes[0].left_obj_index, 41);
    }

    #[test]
    fn coincident_entities_fall_back_to_median_split() {
        let spheres = spheres(&[Vec3::ONE; 3]);
        let nodes = build(&sphere_boxes(&spheres)).unwrap();

        assert_eq!(nodes.len(), 3);
        assert_eq!((nodes[0].left_node, nodes[0].right_node), (1, 2));
        // Stable order is kept: the first two entities go left.
        assert_eq!(nodes[1].object_indices().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(nodes[2].object_indices().collect::<Vec<_>>(), vec![2]);
        assert_well_formed(&nodes, 3);
    }

    #[test]
    fn closed_box_of_quads() {
        let triangles: Vec<Triangle> = Square::box_faces(Vec3::ZERO, Vec3::ONE, Vec3::ONE)
            .iter()
            .flat_map(|face| face.triangles)
            .collect();
        assert_eq!(triangles.len(), 12);

        let boxes: Vec<BoundBox> = triangles
            .iter()
            .enumerate()
            .map(|(index, triangle)| BoundBox::triangle(index as i32, triangle))
            .collect();
        let nodes = build(&boxes).unwrap();

        assert_well_formed(&nodes, 12);
        assert!(nodes.len() <= 23);
        let root = nodes[0].bounds();
        assert!(root.contains(&Aabb::new(Vec3::splat(-1.0), Vec3::ONE)));
    }

    #[test]
    fn root_bounds_whole_scene() {
        let centers: Vec<Vec3> = (0..40)
            .map(|i| {
                let t = i as f32;
                Vec3::new(t.sin() * 10.0, (t * 0.3).cos() * 4.0, t * 0.5)
            })
            .collect();
        let spheres = spheres(&centers);
        let boxes = sphere_boxes(&spheres);
        let nodes = build(&boxes).unwrap();

        assert_well_formed(&nodes, boxes.len());
        let root = nodes[0].bounds();
        for bound_box in &boxes {
            assert!(root.contains(&bound_box.bounding_box()));
        }
        for leaf in nodes.iter().filter(|node| node.is_leaf()) {
            assert!(root.contains(&leaf.bounds()));
        }
    }

    #[test]
    fn builds_are_deterministic() {
        let centers: Vec<Vec3> = (0..25)
            .map(|i| Vec3::new((i % 5) as f32, (i / 5) as f32, ((i * 7) % 3) as f32))
            .collect();
        let spheres = spheres(&centers);
        let boxes = sphere_boxes(&spheres);

        let first = build(&boxes).unwrap();
        let second = build(&boxes).unwrap();
        assert_eq!(
            bytemuck::cast_slice::<BvhNode, u8>(&first),
            bytemuck::cast_slice::<BvhNode, u8>(&second)
        );
    }
}
