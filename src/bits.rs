// SPDX-License-Identifier: MIT

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endian {
  Big,
  Little,
}

impl Default for Endian {
  fn default() -> Self {
    Self::Little
  }
}

impl Endian {
  #[inline]
  pub fn big(&self) -> bool {
    matches!(*self, Self::Big)
  }

  #[inline]
  pub fn little(&self) -> bool {
    matches!(*self, Self::Little)
  }

  #[inline]
  pub fn read_u16(&self, buf: &[u8], offset: usize) -> u16 {
    match *self {
      Self::Big => BigEndian::read_u16(&buf[offset..]),
      Self::Little => LittleEndian::read_u16(&buf[offset..]),
    }
  }

  #[inline]
  pub fn read_u32(&self, buf: &[u8], offset: usize) -> u32 {
    match *self {
      Self::Big => BigEndian::read_u32(&buf[offset..]),
      Self::Little => LittleEndian::read_u32(&buf[offset..]),
    }
  }

  #[inline]
  pub fn read_u64(&self, buf: &[u8], offset: usize) -> u64 {
    match *self {
      Self::Big => BigEndian::read_u64(&buf[offset..]),
      Self::Little => LittleEndian::read_u64(&buf[offset..]),
    }
  }
}

/// Read a big-endian u32 at `pos`, substituting zero for bytes past the
/// end of the buffer. Bitstreams end at an arbitrary bit, so the bit pump
/// may fetch beyond the last byte.
#[inline(always)]
pub fn beu32_padded(buf: &[u8], pos: usize) -> u32 {
  let mut bytes = [0_u8; 4];
  for (i, b) in bytes.iter_mut().enumerate() {
    if let Some(v) = buf.get(pos + i) {
      *b = *v;
    }
  }
  u32::from_be_bytes(bytes)
}
