use log::info;
use wgpu::{util::DeviceExt, BufferUsages};

use super::bvh::BvhNode;
use super::error::{BvhError, RenderError, Result};
use super::scene::{Scene, SceneBvh};

/// Smallest storage buffer handed out for an empty entity array.
const MIN_STORAGE_BYTES: usize = 16;

/// Headless device and queue used to upload scene data.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    pub async fn new() -> std::result::Result<Self, RenderError> {
        let instance_descriptor = wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        };
        let instance = wgpu::Instance::new(instance_descriptor);

        let adapter_descriptor = wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        };
        let adapter = instance
            .request_adapter(&adapter_descriptor)
            .await
            .ok_or(RenderError::NoAdapter)?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let device_descriptor = wgpu::DeviceDescriptor {
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            label: Some("Device"),
        };
        let (device, queue) = adapter.request_device(&device_descriptor, None).await?;

        Ok(Self { device, queue })
    }
}

/// Fails when `required` node records don't fit in a buffer of `capacity` records.
pub fn check_capacity(required: usize, capacity: usize) -> Result<()> {
    if required > capacity {
        return Err(BvhError::CapacityExceeded { required, capacity });
    }
    Ok(())
}

/// Storage buffer with room for a fixed number of [`BvhNode`] records.
pub struct NodeBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    len: usize,
}

impl NodeBuffer {
    pub fn new(device: &wgpu::Device, label: &str, capacity: usize) -> Self {
        let node_buffer_descriptor = wgpu::BufferDescriptor {
            label: Some(label),
            // Zero-sized storage bindings are invalid, keep at least one record.
            size: (std::mem::size_of::<BvhNode>() * capacity.max(1)) as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        };

        Self {
            buffer: device.create_buffer(&node_buffer_descriptor),
            capacity,
            len: 0,
        }
    }

    /// Replaces the buffer contents with `nodes`. Nothing is written when they don't fit.
    pub fn write(&mut self, queue: &wgpu::Queue, nodes: &[BvhNode]) -> Result<()> {
        check_capacity(nodes.len(), self.capacity)?;

        if !nodes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(nodes));
        }
        self.len = nodes.len();
        Ok(())
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records written by the last successful [`write`](Self::write).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bytes for a storage buffer holding `data`. Empty arrays still get a zeroed buffer, since
/// storage bindings can't be zero-sized.
pub fn storage_contents(data: Vec<u8>) -> Vec<u8> {
    if data.is_empty() {
        return vec![0; MIN_STORAGE_BYTES];
    }
    data
}

fn create_storage_buffer(device: &wgpu::Device, label: &str, data: Vec<u8>) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: &storage_contents(data),
        usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
    })
}

/// GPU copies of a scene's entity arrays and of every BVH built over them.
pub struct SceneBuffers {
    pub shape_data: wgpu::Buffer,
    pub object_data: wgpu::Buffer,
    pub light_data: wgpu::Buffer,
    pub point_light_data: wgpu::Buffer,
    pub shapes: NodeBuffer,
    pub objects: NodeBuffer,
    pub object_primitives: Vec<NodeBuffer>,
    pub lights: NodeBuffer,
    pub point_lights: NodeBuffer,
}

impl SceneBuffers {
    /// Fails on the first BVH in `bvh` with more than `capacity` nodes.
    pub fn check_capacity(
        bvh: &SceneBvh,
        capacity: usize,
    ) -> std::result::Result<(), RenderError> {
        for nodes in [&bvh.shapes, &bvh.objects, &bvh.lights, &bvh.point_lights]
            .into_iter()
            .chain(&bvh.object_primitives)
        {
            check_capacity(nodes.len(), capacity)?;
        }
        Ok(())
    }

    /// Uploads the entity arrays of `scene` and allocates one buffer of `capacity` records per
    /// BVH. Every BVH is checked before any buffer is created, so an oversized scene
    /// allocates nothing.
    pub fn upload(
        context: &GpuContext,
        scene: &Scene,
        bvh: &SceneBvh,
        capacity: usize,
    ) -> std::result::Result<Self, RenderError> {
        Self::check_capacity(bvh, capacity)?;

        let device = &context.device;
        let upload = |label: &str, nodes: &[BvhNode]| -> Result<NodeBuffer> {
            let mut buffer = NodeBuffer::new(device, label, capacity);
            buffer.write(&context.queue, nodes)?;
            Ok(buffer)
        };

        let buffers = Self {
            shape_data: create_storage_buffer(device, "Shape Buffer", scene.flatten_shape_data()),
            object_data: create_storage_buffer(
                device,
                "Object Buffer",
                scene.flatten_object_data(),
            ),
            light_data: create_storage_buffer(device, "Light Buffer", scene.flatten_light_data()),
            point_light_data: create_storage_buffer(
                device,
                "Point Light Buffer",
                scene.flatten_point_light_data(),
            ),
            shapes: upload("Shape Node Buffer", &bvh.shapes[..])?,
            objects: upload("Object Node Buffer", &bvh.objects[..])?,
            object_primitives: bvh
                .object_primitives
                .iter()
                .map(|nodes| upload("Object Primitive Node Buffer", &nodes[..]))
                .collect::<Result<_>>()?,
            lights: upload("Light Node Buffer", &bvh.lights[..])?,
            point_lights: upload("Point Light Node Buffer", &bvh.point_lights[..])?,
        };

        let entity_count = scene.shapes.len()
            + scene.objects.len()
            + scene.lights.len()
            + scene.point_lights.len();
        info!(
            "Uploaded {} entities and {} BVH nodes into {} node buffers of {} records",
            entity_count,
            bvh.node_count(),
            4 + buffers.object_primitives.len(),
            capacity
        );

        Ok(buffers)
    }
}
