use glam::Vec3;

/// Emissive triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub corners: [Vec3; 3],
    pub color: Vec3,
}

impl Light {
    pub fn new(corners: [Vec3; 3], color: Vec3) -> Self {
        Self { corners, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}
