//! Resource definitions
//!
//! Geometry and materials referenced by scene objects.

mod material;
mod mesh;

pub use material::*;
pub use mesh::*;
