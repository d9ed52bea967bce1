//! Image preprocessing and compositing utilities

pub mod compositing;
pub mod preprocessing;

pub use compositing::compose_tiles;
pub use preprocessing::{image_to_tensor, normalize_to_tile, CANVAS_WHITE};
