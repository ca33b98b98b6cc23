use glam::Vec3;

use super::Triangle;

/// A planar quad, stored as the two triangles that cover it.
#[derive(Debug, Clone)]
pub struct Square {
    pub triangles: [Triangle; 2],
}

impl Square {
    /// Quad spanned by the half-edge vectors `half_u` and `half_v` around `center`.
    pub fn new(center: Vec3, half_u: Vec3, half_v: Vec3, color: Vec3) -> Self {
        let corners = [
            center - half_u + half_v, // Top left
            center + half_u + half_v, // Top right
            center - half_u - half_v, // Bottom left
            center + half_u - half_v, // Bottom right
        ];

        let triangles = [
            Triangle::new([corners[0], corners[2], corners[1]], color),
            Triangle::new([corners[2], corners[3], corners[1]], color),
        ];

        Self { triangles }
    }

    /// The six outward faces of an axis-aligned box.
    pub fn box_faces(center: Vec3, half_extent: Vec3, color: Vec3) -> [Square; 6] {
        let (x, y, z) = (
            Vec3::X * half_extent.x,
            Vec3::Y * half_extent.y,
            Vec3::Z * half_extent.z,
        );

        [
            Square::new(center + x, z, y, color),
            Square::new(center - x, -z, y, color),
            Square::new(center + y, x, z, color),
            Square::new(center - y, x, -z, color),
            Square::new(center + z, -x, y, color),
            Square::new(center - z, x, y, color),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_triangles_cover_its_corners() {
        let square = Square::new(Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::Y);
        let corners: Vec<Vec3> = square
            .triangles
            .iter()
            .flat_map(|triangle| triangle.corners)
            .collect();

        for expected in [
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
        ] {
            assert!(corners.contains(&expected), "missing corner {expected}");
        }
        assert!(square.triangles.iter().all(|triangle| triangle.color == Vec3::Y));
    }

    #[test]
    fn box_faces_stay_on_the_box_surface() {
        let faces = Square::box_faces(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(1.0, 2.0, 0.5),
            Vec3::ONE,
        );

        for face in &faces {
            for triangle in &face.triangles {
                for corner in triangle.corners {
                    let local = (corner - Vec3::new(1.0, 2.0, 3.0)).abs();
                    assert!(local.cmple(Vec3::new(1.0, 2.0, 0.5)).all());
                    assert!(
                        local.x == 1.0 || local.y == 2.0 || local.z == 0.5,
                        "{corner} is inside the box"
                    );
                }
            }
        }
    }
}
