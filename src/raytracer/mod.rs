pub mod bvh;
pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod shapes;

pub use bvh::*;
pub use error::*;
pub use renderer::*;
pub use scene::*;
pub use settings::*;
pub use shapes::*;
