pub mod light;
pub mod object;
pub mod primitive;
pub mod sphere;
pub mod square;
pub mod triangle;

pub use light::*;
pub use object::*;
pub use primitive::*;
pub use sphere::*;
pub use square::*;
pub use triangle::*;
