use thiserror::Error;

/// Errors raised while building or uploading a BVH.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BvhError {
    /// The entity collection was empty or an entity reported unusable bounds.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The flattened node array does not fit in the destination buffer.
    #[error("Node buffer capacity exceeded: {required} nodes required, capacity is {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },
}

/// Errors raised by the GPU side of the renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error(transparent)]
    Bvh(#[from] BvhError),
}

pub type Result<T> = std::result::Result<T, BvhError>;
