// SPDX-License-Identifier: MIT

use std::io::{Read, Seek};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::bits::Endian;
use crate::{Result, TiffError};

pub mod entry;
pub mod file;
pub mod ifd;
pub mod reader;
pub mod value;

pub use entry::Entry;
pub use file::TiffFile;
pub use ifd::Ifd;
pub use reader::{EndianReader, ReadByteOrder};
pub use value::{Rational, SRational, Value};

const TIFF_MAGIC: u16 = 42;
const BIGTIFF_MAGIC: u16 = 43;
const BIGTIFF_OFFSET_SIZE: u16 = 8;

/// Tags required to locate and decompress pixel data
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
#[repr(u16)]
pub enum TiffTag {
  ImageWidth = 256,
  ImageLength = 257,
  BitsPerSample = 258,
  Compression = 259,
  PhotometricInt = 262,
  StripOffsets = 273,
  SamplesPerPixel = 277,
  RowsPerStrip = 278,
  StripByteCounts = 279,
  TileWidth = 322,
  TileLength = 323,
  TileOffsets = 324,
  TileByteCounts = 325,
  SubIFDs = 330,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize)]
#[repr(u16)]
pub enum Compression {
  None = 1,
  Huffman = 2,
  Fax3 = 3,
  Fax4 = 4,
  LZW = 5,
  JPEG = 6,
  // "Extended JPEG" or "new JPEG" style
  ModernJPEG = 7,
  Deflate = 8,
  PackBits = 0x8005,
  OldDeflate = 0x80B2,
}

/// Classic TIFF with 32-bit offsets or the 64-bit "Big" variant.
///
/// The variant fixes the width of the first-IFD pointer, the entry
/// count, the per-entry count/offset fields and the inline value
/// capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TiffVariant {
  #[default]
  Classic,
  Big,
}

impl TiffVariant {
  /// Bytes available for values embedded in the entry itself
  pub fn inline_size(self) -> usize {
    match self {
      Self::Classic => 4,
      Self::Big => 8,
    }
  }

  /// Total size of one directory entry
  pub fn entry_size(self) -> u64 {
    match self {
      Self::Classic => 12,
      Self::Big => 20,
    }
  }

  /// Read a count or offset field of this variant's width
  pub(crate) fn read_offset<R: Read + Seek>(self, reader: &mut EndianReader<'_, R>) -> Result<u64> {
    match self {
      Self::Classic => Ok(reader.read_u32()? as u64),
      Self::Big => Ok(reader.read_u64()?),
    }
  }
}

/// Parsed TIFF header: byte order, format variant and first IFD offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TiffHeader {
  pub endian: Endian,
  pub variant: TiffVariant,
  pub first_ifd: u64,
}

impl TiffHeader {
  pub fn parse<R: Read + Seek>(file: &mut R) -> Result<Self> {
    use byteorder::{LittleEndian, ReadBytesExt};
    let endian = match file.read_u16::<LittleEndian>()? {
      0x4949 => Endian::Little,
      0x4d4d => Endian::Big,
      x => {
        return Err(TiffError::Open(format!("TIFF: don't know byte order marker 0x{:x}", x)));
      }
    };
    let mut reader = EndianReader::new(file, endian);
    let variant = match reader.read_u16()? {
      TIFF_MAGIC => TiffVariant::Classic,
      BIGTIFF_MAGIC => {
        let offset_size = reader.read_u16()?;
        let pad = reader.read_u16()?;
        if offset_size != BIGTIFF_OFFSET_SIZE || pad != 0 {
          return Err(TiffError::Open(format!(
            "BigTIFF: unexpected offset size {} (pad {})",
            offset_size, pad
          )));
        }
        TiffVariant::Big
      }
      x => {
        return Err(TiffError::Open(format!("Invalid magic marker for TIFF: {}", x)));
      }
    };
    let first_ifd = variant.read_offset(&mut reader)?;
    if first_ifd == 0 {
      return Err(TiffError::Open("Invalid TIFF header, contains no root IFD".to_string()));
    }
    Ok(Self { endian, variant, first_ifd })
  }
}
