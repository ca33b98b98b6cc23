use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub color: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, color: Vec3, radius: f32) -> Self {
        Self { center, color, radius }
    }
}
