// SPDX-License-Identifier: MIT

//! Per-block decompression. Every codec shares the same contract: the
//! compressed bytes of one block plus its pixel dimensions in, a flat
//! pixel buffer out. Group 4 output is one byte per pixel; the byte
//! oriented codecs return the decompressed bytes unchanged.

use std::io::Read;

use crate::tiff::Compression;
use crate::{Result, TiffError};

pub mod fax;
pub mod packbits;

/// Route one block to its codec based on the compression tag value
pub fn decompress(compression: Compression, src: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
  match compression {
    Compression::None => Ok(src.to_vec()),
    Compression::Fax4 => fax::decode_g4(src, width, height),
    Compression::LZW => decode_lzw(src),
    Compression::Deflate | Compression::OldDeflate => decode_deflate(src),
    Compression::PackBits => Ok(packbits::decode(src)),
    other => Err(TiffError::UnsupportedCompression(other.into())),
  }
}

fn decode_lzw(src: &[u8]) -> Result<Vec<u8>> {
  let mut out = Vec::new();
  let mut decoder = weezl::decode::Decoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8);
  decoder
    .into_stream(&mut out)
    .decode_all(src)
    .status
    .map_err(|err| TiffError::DecodeDesync(format!("lzw: {}", err)))?;
  Ok(out)
}

fn decode_deflate(src: &[u8]) -> Result<Vec<u8>> {
  let mut decoder = libflate::zlib::Decoder::new(src).map_err(|err| TiffError::DecodeDesync(format!("zlib: {}", err)))?;
  let mut out = Vec::new();
  decoder
    .read_to_end(&mut out)
    .map_err(|err| TiffError::DecodeDesync(format!("zlib: {}", err)))?;
  Ok(out)
}
