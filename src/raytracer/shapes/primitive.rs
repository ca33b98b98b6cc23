use glam::Vec3;

/// A material-indexed triangle, either free-standing in world space or owned
/// by an [`Object`](super::Object) in its local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub corners: [Vec3; 3],
    pub material_index: u32,
}

impl Primitive {
    pub fn new(corners: [Vec3; 3], material_index: u32) -> Self {
        Self {
            corners,
            material_index,
        }
    }
}
