// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::tiff::{Ifd, TiffTag};
use crate::{Result, TiffError};

/// Strip or tile grid of one image.
///
/// Stripped images have full-width blocks of `RowsPerStrip` scanlines,
/// tiled images carry explicit tile dimensions. Counts use ceiling
/// division, so the rightmost column and bottom row may map to blocks
/// that extend past the image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockGeometry {
  pub image_width: usize,
  pub image_height: usize,
  pub block_width: usize,
  pub block_height: usize,
  pub blocks_across: usize,
  pub blocks_down: usize,
  pub tiled: bool,
}

impl BlockGeometry {
  pub fn from_ifd(ifd: &Ifd) -> Result<Self> {
    let image_width = ifd.usize_value(TiffTag::ImageWidth)?;
    let image_height = ifd.usize_value(TiffTag::ImageLength)?;

    // Presence of the tile width tag is what discriminates tiled from
    // stripped images.
    let tiled = ifd.has_entry(TiffTag::TileWidth);
    let (block_width, block_height) = if tiled {
      (ifd.usize_value(TiffTag::TileWidth)?, ifd.usize_value(TiffTag::TileLength)?)
    } else {
      // A missing RowsPerStrip means the image is one single strip
      (image_width, ifd.usize_value_or(TiffTag::RowsPerStrip, image_height)?)
    };
    if block_width == 0 || block_height == 0 {
      return Err(TiffError::MalformedDirectory {
        offset: ifd.offset,
        reason: format!("invalid block dimensions {}x{}", block_width, block_height),
      });
    }

    Ok(Self {
      image_width,
      image_height,
      block_width,
      block_height,
      blocks_across: image_width.div_ceil(block_width),
      blocks_down: image_height.div_ceil(block_height),
      tiled,
    })
  }

  pub fn block_count(&self) -> usize {
    self.blocks_across * self.blocks_down
  }

  /// Row-major linear index, `None` for out-of-grid coordinates
  pub fn block_index(&self, col: usize, row: usize) -> Option<usize> {
    if col < self.blocks_across && row < self.blocks_down {
      Some(row * self.blocks_across + col)
    } else {
      None
    }
  }

  /// Pixel height of the blocks in `row`; the bottom row is clipped to
  /// the declared image height.
  pub fn clipped_height(&self, row: usize) -> usize {
    self.block_height.min(self.image_height - (row * self.block_height).min(self.image_height))
  }
}

/// Resolve a linear block index to the byte range of its compressed
/// data. The offset and byte-count arrays must both match the computed
/// block count.
pub fn block_range(ifd: &Ifd, geometry: &BlockGeometry, index: usize) -> Result<(u64, u64)> {
  let ranges = block_ranges(ifd, geometry)?;
  Ok(ranges[index])
}

/// Byte ranges of all blocks in row-major order
pub fn block_ranges(ifd: &Ifd, geometry: &BlockGeometry) -> Result<Vec<(u64, u64)>> {
  let (offsets_tag, counts_tag) = if geometry.tiled {
    (TiffTag::TileOffsets, TiffTag::TileByteCounts)
  } else {
    (TiffTag::StripOffsets, TiffTag::StripByteCounts)
  };
  let offsets = ifd.u64_array(offsets_tag)?;
  let counts = ifd.u64_array(counts_tag)?;

  let expected = geometry.block_count();
  if offsets.len() != expected || counts.len() != expected {
    return Err(TiffError::InconsistentTagArrays {
      expected,
      offsets: offsets.len(),
      counts: counts.len(),
    });
  }
  Ok(offsets.into_iter().zip(counts).collect())
}
