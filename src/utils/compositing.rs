//! 2×2 tile compositor

use crate::error::{FaceSegError, Result};
use crate::utils::preprocessing::CANVAS_WHITE;
use image::{ImageBuffer, RgbImage};

/// Composite four S×S tiles into one (2S)×(2S) grid
///
/// Tile 0 lands top-left, 1 top-right, 2 bottom-left, 3 bottom-right. Tiles
/// are non-overlapping by construction, so there is no blending; the output
/// is a pure, byte-for-byte deterministic function of its inputs.
///
/// # Errors
/// Returns `FaceSegError::Processing` when a tile is not exactly `side`×`side`.
pub fn compose_tiles(tiles: &[RgbImage; 4], side: u32) -> Result<RgbImage> {
    for (i, tile) in tiles.iter().enumerate() {
        if tile.dimensions() != (side, side) {
            return Err(FaceSegError::processing(format!(
                "tile {} is {}x{}, expected {}x{}",
                i,
                tile.width(),
                tile.height(),
                side,
                side
            )));
        }
    }

    let mut canvas = ImageBuffer::from_pixel(side * 2, side * 2, CANVAS_WHITE);
    let offsets = [(0, 0), (side, 0), (0, side), (side, side)];

    for (tile, (dx, dy)) in tiles.iter().zip(offsets) {
        image::imageops::replace(&mut canvas, tile, i64::from(dx), i64::from(dy));
    }

    Ok(canvas)
}
