//! Resource definitions
//!
//! CPU-side meshes and materials. The renderer uploads them on first use.

mod material;
mod mesh;

pub use material::*;
pub use mesh::*;
