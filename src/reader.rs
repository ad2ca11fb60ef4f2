// SPDX-License-Identifier: MIT

use log::warn;
use rayon::prelude::*;

use crate::blocks::{self, BlockGeometry};
use crate::decompressors::decompress;
use crate::source::TiffSource;
use crate::tiff::file::{OpenParams, TiffFile};
use crate::tiff::{Compression, Ifd, TiffHeader, TiffTag};
use crate::{Result, TiffError};

/// Reader over one TIFF file: the parsed catalog plus the byte source
/// blocks are pulled from on demand.
///
/// The catalog is built once by [`TiffReader::open`] and is read-only
/// afterwards, so a reader can be shared between threads.
pub struct TiffReader {
  source: TiffSource,
  file: TiffFile,
}

impl TiffReader {
  /// Open a file with default parameters
  pub fn open(source: TiffSource) -> Result<Self> {
    Self::open_with_params(source, OpenParams::default())
  }

  pub fn open_with_params(source: TiffSource, params: OpenParams) -> Result<Self> {
    let mut reader = source.reader();
    let file = TiffFile::parse(&mut reader, &params)?;
    Ok(Self { source, file })
  }

  pub fn header(&self) -> &TiffHeader {
    &self.file.header
  }

  pub fn source(&self) -> &TiffSource {
    &self.source
  }

  pub fn page_count(&self) -> usize {
    self.file.page_count()
  }

  /// Number of subimages of a page, including the page's own image.
  ///
  /// # Panics
  /// Panics if `page` is out of range, see [`TiffReader::page_count`].
  pub fn subimage_count(&self, page: usize) -> usize {
    self.file.pages[page].subimage_count()
  }

  /// Directory of one subimage, for tag inspection
  pub fn ifd(&self, page: usize, subimage: usize) -> Option<&Ifd> {
    self.file.page(page).and_then(|p| p.subimage(subimage))
  }

  /// Strip or tile grid of one subimage
  pub fn block_geometry(&self, page: usize, subimage: usize) -> Result<BlockGeometry> {
    let ifd = self.checked_ifd(page, subimage, 0, 0)?;
    BlockGeometry::from_ifd(ifd)
  }

  /// Decode a single block addressed by grid coordinates.
  ///
  /// Returns the block's pixel buffer. Group 4 blocks decode to one
  /// byte per pixel of `block_width * clipped_height`; byte-oriented
  /// codecs return their decompressed payload. A failed block leaves
  /// every other block decodable.
  pub fn decode_block(&self, page: usize, subimage: usize, col: usize, row: usize) -> Result<Vec<u8>> {
    let ifd = self.checked_ifd(page, subimage, col, row)?;
    let geometry = BlockGeometry::from_ifd(ifd)?;
    let index = geometry.block_index(col, row).ok_or(TiffError::BlockIndexOutOfRange {
      page,
      subimage,
      col,
      row,
    })?;
    let compression = Self::compression(ifd)?;
    let (offset, len) = blocks::block_range(ifd, &geometry, index)?;
    let src = self.source.subview(offset, len)?;
    decompress(compression, src, geometry.block_width, geometry.clipped_height(row)).inspect_err(|err| {
      warn!("Block ({}, {}) of page {}, subimage {} failed: {}", col, row, page, subimage, err);
    })
  }

  /// Decode every block of a subimage across worker threads.
  ///
  /// Block bytes are extracted up front so the workers never touch the
  /// shared read position. Results come back in row-major block order,
  /// one per block, bad blocks reported individually.
  pub fn decode_blocks(&self, page: usize, subimage: usize) -> Result<Vec<Result<Vec<u8>>>> {
    let ifd = self.checked_ifd(page, subimage, 0, 0)?;
    let geometry = BlockGeometry::from_ifd(ifd)?;
    let compression = Self::compression(ifd)?;

    let mut jobs = Vec::with_capacity(geometry.block_count());
    for (index, (offset, len)) in blocks::block_ranges(ifd, &geometry)?.into_iter().enumerate() {
      let row = index / geometry.blocks_across;
      jobs.push((self.source.subview(offset, len)?, geometry.clipped_height(row)));
    }

    Ok(
      jobs
        .into_par_iter()
        .map(|(src, height)| decompress(compression, src, geometry.block_width, height))
        .collect(),
    )
  }

  fn compression(ifd: &Ifd) -> Result<Compression> {
    let code = ifd.usize_value_or(TiffTag::Compression, u16::from(Compression::None) as usize)?;
    let code = u16::try_from(code).unwrap_or(u16::MAX);
    Compression::try_from(code).map_err(|_| TiffError::UnsupportedCompression(code))
  }

  fn checked_ifd(&self, page: usize, subimage: usize, col: usize, row: usize) -> Result<&Ifd> {
    self.ifd(page, subimage).ok_or(TiffError::BlockIndexOutOfRange {
      page,
      subimage,
      col,
      row,
    })
  }
}
