use std::ops::Range;

use glam::{Mat4, Vec3};
use log::debug;
use rand::Rng;

use super::bvh::{self, BoundBox, BvhNode};
use super::error::Result;
use super::shapes::{Light, Object, PointLight, Primitive, Sphere, Square, Transform, Triangle};

/// Free-standing world-space geometry, addressed by its position in [`Scene::shapes`].
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    Triangle(Triangle),
    Primitive(Primitive),
}

/// Hands out entity IDs. Owned by the scene so separate scenes never share a counter.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// One flattened BVH per entity array. Arrays with no entities get no nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneBvh {
    pub shapes: Vec<BvhNode>,
    pub objects: Vec<BvhNode>,
    /// Local-space BVH of each object's primitives, in object order.
    pub object_primitives: Vec<Vec<BvhNode>>,
    pub lights: Vec<BvhNode>,
    pub point_lights: Vec<BvhNode>,
}

impl SceneBvh {
    pub fn node_count(&self) -> usize {
        self.shapes.len()
            + self.objects.len()
            + self.object_primitives.iter().map(Vec::len).sum::<usize>()
            + self.lights.len()
            + self.point_lights.len()
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    pub shapes: Vec<Shape>,
    pub objects: Vec<Object>,
    pub lights: Vec<Light>,
    pub point_lights: Vec<PointLight>,
    ids: IdAllocator,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scatters `count` spheres over a spiral on a sphere of radius 50.
    pub fn with_random_spheres<R: Rng>(count: usize, rng: &mut R) -> Self {
        let mut scene = Self::new();

        let golden_angle = std::f32::consts::PI * (3.0 - (5.0_f32).sqrt());
        let radius = 50.0;

        for i in 0..count {
            let theta = golden_angle * i as f32;
            // Z-coordinate varies linearly from 1 to -1
            let z = if count > 1 {
                1.0 - (i as f32) / (count as f32 - 1.0) * 2.0
            } else {
                0.0
            };
            let ring = (1.0 - z * z).sqrt();
            let center = Vec3::new(theta.cos() * ring, theta.sin() * ring, z) * radius;

            let color = Vec3::new(
                0.3 + 0.7 * rng.gen::<f32>(),
                0.3 + 0.7 * rng.gen::<f32>(),
                0.3 + 0.7 * rng.gen::<f32>(),
            );
            let sphere_radius = 0.1 + 1.9 * rng.gen::<f32>();

            scene.add_sphere(center, color, sphere_radius);
        }

        scene
    }

    pub fn add_sphere(&mut self, center: Vec3, color: Vec3, radius: f32) -> usize {
        self.push_shape(Shape::Sphere(Sphere::new(center, color, radius)))
    }

    pub fn add_triangle(&mut self, triangle: Triangle) -> usize {
        self.push_shape(Shape::Triangle(triangle))
    }

    pub fn add_primitive(&mut self, primitive: Primitive) -> usize {
        self.push_shape(Shape::Primitive(primitive))
    }

    /// Adds both triangles of `square`, returning their shape indices.
    pub fn add_square(&mut self, square: &Square) -> Range<usize> {
        let start = self.shapes.len();
        for triangle in square.triangles {
            self.add_triangle(triangle);
        }
        start..self.shapes.len()
    }

    /// Adds a closed axis-aligned box: six quads, twelve triangles.
    pub fn add_box(&mut self, center: Vec3, half_extent: Vec3, color: Vec3) -> Range<usize> {
        let start = self.shapes.len();
        for face in Square::box_faces(center, half_extent, color) {
            self.add_square(&face);
        }
        start..self.shapes.len()
    }

    pub fn add_object(&mut self, transform: Transform, primitives: Vec<Primitive>) -> usize {
        let id = self.ids.allocate();
        self.objects.push(Object::new(id, transform, primitives));
        self.objects.len() - 1
    }

    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn add_point_light(&mut self, point_light: PointLight) -> usize {
        self.point_lights.push(point_light);
        self.point_lights.len() - 1
    }

    fn push_shape(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    pub fn shape_bound_boxes(&self) -> Vec<BoundBox<'_>> {
        self.shapes
            .iter()
            .enumerate()
            .map(|(index, shape)| {
                let index = index as i32;
                match shape {
                    Shape::Sphere(sphere) => BoundBox::sphere(index, sphere),
                    Shape::Triangle(triangle) => BoundBox::triangle(index, triangle),
                    Shape::Primitive(primitive) => BoundBox::primitive(index, primitive),
                }
            })
            .collect()
    }

    pub fn object_bound_boxes(&self) -> Vec<BoundBox<'_>> {
        enumerate_boxes(&self.objects, BoundBox::object)
    }

    pub fn light_bound_boxes(&self) -> Vec<BoundBox<'_>> {
        enumerate_boxes(&self.lights, BoundBox::light)
    }

    pub fn point_light_bound_boxes(&self) -> Vec<BoundBox<'_>> {
        enumerate_boxes(&self.point_lights, BoundBox::point_light)
    }

    /// Rebuilds every BVH from scratch.
    pub fn build_bvh(&self) -> Result<SceneBvh> {
        let scene_bvh = SceneBvh {
            shapes: build_or_empty(&self.shape_bound_boxes())?,
            objects: build_or_empty(&self.object_bound_boxes())?,
            object_primitives: self
                .objects
                .iter()
                .map(Object::build_primitive_bvh)
                .collect::<Result<_>>()?,
            lights: build_or_empty(&self.light_bound_boxes())?,
            point_lights: build_or_empty(&self.point_light_bound_boxes())?,
        };

        debug!(
            "Scene BVH rebuilt: {} shape, {} object, {} light, {} point light nodes",
            scene_bvh.shapes.len(),
            scene_bvh.objects.len(),
            scene_bvh.lights.len(),
            scene_bvh.point_lights.len()
        );

        Ok(scene_bvh)
    }

    /// 17 floats per shape: kind tag, sphere center and radius, color, triangle corners.
    pub fn flatten_shape_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.shapes.len() * 17 * 4);

        for shape in &self.shapes {
            let attributes: [f32; 17] = match shape {
                Shape::Sphere(sphere) => [
                    0.0, sphere.center.x, sphere.center.y, sphere.center.z, sphere.radius,
                    sphere.color.x, sphere.color.y, sphere.color.z,
                    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
                ],
                Shape::Triangle(triangle) => {
                    let [a, b, c] = triangle.corners;
                    [
                        1.0, 0.0, 0.0, 0.0, 0.0,
                        triangle.color.x, triangle.color.y, triangle.color.z,
                        a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z,
                    ]
                }
                Shape::Primitive(primitive) => {
                    let [a, b, c] = primitive.corners;
                    [
                        2.0, 0.0, 0.0, 0.0, primitive.material_index as f32,
                        0.0, 0.0, 0.0,
                        a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z,
                    ]
                }
            };
            data.extend_from_slice(bytemuck::cast_slice(&attributes));
        }

        data
    }

    /// Object-to-world matrix per object, column major.
    pub fn flatten_object_data(&self) -> Vec<u8> {
        let matrices: Vec<Mat4> = self
            .objects
            .iter()
            .map(|object| {
                let transform = object.transform;
                Mat4::from_scale_rotation_translation(
                    transform.scale,
                    transform.rotation,
                    transform.translation,
                )
            })
            .collect();

        bytemuck::cast_slice(&matrices).to_vec()
    }

    pub fn flatten_light_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.lights.len() * 12 * 4);

        for light in &self.lights {
            let [a, b, c] = light.corners;
            let attributes: [f32; 12] = [
                a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z,
                light.color.x, light.color.y, light.color.z,
            ];
            data.extend_from_slice(bytemuck::cast_slice(&attributes));
        }

        data
    }

    pub fn flatten_point_light_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.point_lights.len() * 8 * 4);

        for point_light in &self.point_lights {
            let (p, color) = (point_light.position, point_light.color);
            let attributes: [f32; 8] = [
                p.x, p.y, p.z, 0.0, // Padding for alignment
                color.x, color.y, color.z, 0.0,
            ];
            data.extend_from_slice(bytemuck::cast_slice(&attributes));
        }

        data
    }
}

/// Byte image of a node array exactly as the shader reads it.
pub fn flatten_node_data(nodes: &[BvhNode]) -> Vec<u8> {
    bytemuck::cast_slice(nodes).to_vec()
}

fn enumerate_boxes<'a, T>(
    items: &'a [T],
    make: impl Fn(i32, &'a T) -> BoundBox<'a>,
) -> Vec<BoundBox<'a>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| make(index as i32, item))
        .collect()
}

fn build_or_empty(boxes: &[BoundBox<'_>]) -> Result<Vec<BvhNode>> {
    if boxes.is_empty() {
        return Ok(Vec::new());
    }
    bvh::build(boxes)
}
