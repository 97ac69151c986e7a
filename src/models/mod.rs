//! Data models for flies, materials and inventory

mod fly;
mod inventory;
mod material;

pub use fly::*;
pub use inventory::*;
pub use material::*;
