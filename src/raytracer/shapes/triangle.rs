use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub corners: [Vec3; 3],
    pub color: Vec3,
}

impl Triangle {
    pub fn new(corners: [Vec3; 3], color: Vec3) -> Self {
        Self { corners, color }
    }

    pub fn build_from_center_and_offsets(center: Vec3, offsets: [Vec3; 3], color: Vec3) -> Self {
        Self::new(offsets.map(|offset| center + offset), color)
    }
}
