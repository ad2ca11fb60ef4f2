// SPDX-License-Identifier: MIT

//! Library to read TIFF and BigTIFF raster files block by block.
//!
//! A file is opened once into an immutable image catalog (pages and their
//! nested sub-images), after that individual strips or tiles are located
//! and decompressed on demand. CCITT Group 4 (T.6) compressed pages are
//! decoded by the built-in fax decoder; LZW, Deflate and PackBits blocks
//! are handed to byte-oriented codecs.
//!
//! # Example
//! ```rust,no_run
//! use tiffblock::{TiffReader, TiffSource};
//!
//! fn main() -> tiffblock::Result<()> {
//!   let source = TiffSource::new(std::path::Path::new("scan.tif"))?;
//!   let reader = TiffReader::open(source)?;
//!   for page in 0..reader.page_count() {
//!     for sub in 0..reader.subimage_count(page) {
//!       let geometry = reader.block_geometry(page, sub)?;
//!       let pixels = reader.decode_block(page, sub, 0, 0)?;
//!       println!("({}, {}): first block has {} pixels, grid {}x{}",
//!         page, sub, pixels.len(), geometry.blocks_across, geometry.blocks_down);
//!     }
//!   }
//!   Ok(())
//! }
//! ```

use thiserror::Error;

pub mod bits;
pub mod blocks;
pub mod decompressors;
pub mod pumps;
pub mod reader;
pub mod source;
pub mod tiff;

pub use blocks::BlockGeometry;
pub use reader::TiffReader;
pub use source::TiffSource;
pub use tiff::file::{OpenParams, PagePolicy};
pub use tiff::{Compression, TiffHeader, TiffVariant};

/// Error variants for the reader and the block decoders.
///
/// Errors raised while building the catalog make the whole file unusable,
/// errors raised while decoding a block are local to that block.
#[derive(Error, Debug)]
pub enum TiffError {
  /// File is not a TIFF or the header is unusable
  #[error("Open failed: {}", _0)]
  Open(String),

  /// Buffering a non-seekable input exceeded the configured limit
  #[error("Input exceeds buffer limit of {} bytes", limit)]
  BufferLimit { limit: usize },

  #[error("Malformed directory at offset {:#x}: {}", offset, reason)]
  MalformedDirectory { offset: u64, reason: String },

  #[error("Directory at offset {:#x} is missing required tag {:#06x}", offset, tag)]
  MissingTag { offset: u64, tag: u16 },

  #[error("Tag {:#06x} has type {}, expected {}", tag, found, expected)]
  TypeMismatch {
    tag: u16,
    expected: &'static str,
    found: &'static str,
  },

  /// A next-IFD or SubIFD offset points at an already parsed directory
  #[error("Directory offset {:#x} was already visited, file contains a cycle", offset)]
  DirectoryCycle { offset: u64 },

  #[error("File contains more than {} directories", limit)]
  TooManyDirectories { limit: usize },

  #[error("Block ({}, {}) of page {}, subimage {} is outside the block grid", col, row, page, subimage)]
  BlockIndexOutOfRange {
    page: usize,
    subimage: usize,
    col: usize,
    row: usize,
  },

  #[error("Expected {} block entries but offsets has {} and byte counts {}", expected, offsets, counts)]
  InconsistentTagArrays {
    expected: usize,
    offsets: usize,
    counts: usize,
  },

  #[error("Compression scheme {} is not supported", _0)]
  UnsupportedCompression(u16),

  /// The bitstream contains a code word outside the mode or run tables
  #[error("Invalid code near bit {} of scanline {}", bit, row)]
  InvalidModeCode { row: usize, bit: usize },

  /// The decoder lost sync with the scanline structure
  #[error("Block decoder desynchronized: {}", _0)]
  DecodeDesync(String),

  #[error("I/O error: {:?}", _0)]
  Io(#[from] std::io::Error),
}

/// Result type for all reader and decoder operations
pub type Result<T> = std::result::Result<T, TiffError>;
