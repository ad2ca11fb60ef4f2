// SPDX-License-Identifier: MIT

//! Builder for synthetic little-endian TIFF and BigTIFF buffers used by
//! the integration tests.

/// Entry value as written into the file
pub enum Val {
  Bytes(Vec<u8>),
  Ascii(String),
  Short(Vec<u16>),
  Long(Vec<u32>),
  Long8(Vec<u64>),
  /// Arbitrary type code with opaque payload
  Unknown(u16, Vec<u8>),
}

impl Val {
  fn type_code(&self) -> u16 {
    match self {
      Val::Bytes(_) => 1,
      Val::Ascii(_) => 2,
      Val::Short(_) => 3,
      Val::Long(_) => 4,
      Val::Long8(_) => 16,
      Val::Unknown(code, _) => *code,
    }
  }

  fn count(&self) -> u64 {
    match self {
      Val::Bytes(v) => v.len() as u64,
      Val::Ascii(v) => v.len() as u64 + 1,
      Val::Short(v) => v.len() as u64,
      Val::Long(v) => v.len() as u64,
      Val::Long8(v) => v.len() as u64,
      Val::Unknown(_, v) => v.len() as u64,
    }
  }

  fn payload(&self) -> Vec<u8> {
    match self {
      Val::Bytes(v) => v.clone(),
      Val::Ascii(v) => {
        let mut out = v.as_bytes().to_vec();
        out.push(0);
        out
      }
      Val::Short(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
      Val::Long(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
      Val::Long8(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
      Val::Unknown(_, v) => v.clone(),
    }
  }
}

/// Incrementally builds a little-endian TIFF buffer. Directories are
/// written in call order; chain and SubIFD links are patched afterwards
/// through the returned positions.
pub struct TiffBuilder {
  pub big: bool,
  pub bytes: Vec<u8>,
}

impl TiffBuilder {
  pub fn new(big: bool) -> Self {
    let mut bytes = vec![0x49, 0x49];
    if big {
      bytes.extend_from_slice(&43_u16.to_le_bytes());
      bytes.extend_from_slice(&8_u16.to_le_bytes());
      bytes.extend_from_slice(&0_u16.to_le_bytes());
      bytes.extend_from_slice(&0_u64.to_le_bytes());
    } else {
      bytes.extend_from_slice(&42_u16.to_le_bytes());
      bytes.extend_from_slice(&0_u32.to_le_bytes());
    }
    Self { big, bytes }
  }

  fn inline_size(&self) -> usize {
    if self.big { 8 } else { 4 }
  }

  fn align(&mut self, n: usize) {
    while self.bytes.len() % n != 0 {
      self.bytes.push(0);
    }
  }

  fn push_offset(&mut self, value: u64) {
    if self.big {
      self.bytes.extend_from_slice(&value.to_le_bytes());
    } else {
      self.bytes.extend_from_slice(&(value as u32).to_le_bytes());
    }
  }

  /// Overwrite an offset-sized field at `pos`
  pub fn patch_offset(&mut self, pos: u64, value: u64) {
    let pos = pos as usize;
    if self.big {
      self.bytes[pos..pos + 8].copy_from_slice(&value.to_le_bytes());
    } else {
      self.bytes[pos..pos + 4].copy_from_slice(&(value as u32).to_le_bytes());
    }
  }

  /// Append raw data (strip or tile contents), returns its offset
  pub fn add_blob(&mut self, data: &[u8]) -> u64 {
    self.align(2);
    let offset = self.bytes.len() as u64;
    self.bytes.extend_from_slice(data);
    offset
  }

  /// Write one directory with the entries in the given order.
  /// Returns the directory offset and the position of its next-IFD
  /// pointer field.
  pub fn add_dir(&mut self, entries: &[(u16, Val)]) -> (u64, u64) {
    // External payloads land in front of the directory
    let inline = self.inline_size();
    let mut resolved = Vec::new();
    for (tag, val) in entries {
      let payload = val.payload();
      let external = if payload.len() > inline { Some(self.add_blob(&payload)) } else { None };
      resolved.push((*tag, val.type_code(), val.count(), payload, external));
    }

    self.align(2);
    let dir_offset = self.bytes.len() as u64;
    if self.big {
      self.bytes.extend_from_slice(&(entries.len() as u64).to_le_bytes());
    } else {
      self.bytes.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    }
    for (tag, typ, count, payload, external) in resolved {
      self.bytes.extend_from_slice(&tag.to_le_bytes());
      self.bytes.extend_from_slice(&typ.to_le_bytes());
      self.push_offset(count);
      match external {
        Some(offset) => self.push_offset(offset),
        None => {
          let mut inline_bytes = payload;
          inline_bytes.resize(inline, 0);
          self.bytes.extend_from_slice(&inline_bytes);
        }
      }
    }
    let next_field = self.bytes.len() as u64;
    self.push_offset(0);
    (dir_offset, next_field)
  }

  /// Point the header at the first directory
  pub fn link_first(&mut self, dir_offset: u64) {
    let pos = if self.big { 8 } else { 4 };
    self.patch_offset(pos, dir_offset);
  }

  /// Chain a directory behind another one's next-IFD field
  pub fn link_next(&mut self, next_field: u64, dir_offset: u64) {
    self.patch_offset(next_field, dir_offset);
  }

  pub fn finish(self) -> Vec<u8> {
    self.bytes
  }
}

/// Entry set for a stripped image, with the strip data appended to the
/// builder. `bits` and photometric interpretation follow the
/// compression scheme: bilevel for Group 4, 8-bit grayscale otherwise.
pub fn strip_entries(builder: &mut TiffBuilder, width: u32, height: u32, rows_per_strip: u32, compression: u16, strips: &[Vec<u8>]) -> Vec<(u16, Val)> {
  let mut offsets = Vec::new();
  let mut counts = Vec::new();
  for strip in strips {
    offsets.push(builder.add_blob(strip) as u32);
    counts.push(strip.len() as u32);
  }
  let fax = compression == 4;
  vec![
    (256, Val::Long(vec![width])),
    (257, Val::Long(vec![height])),
    (258, Val::Short(vec![if fax { 1 } else { 8 }])),
    (259, Val::Short(vec![compression])),
    (262, Val::Short(vec![if fax { 0 } else { 1 }])),
    (273, Val::Long(offsets)),
    (277, Val::Short(vec![1])),
    (278, Val::Long(vec![rows_per_strip])),
    (279, Val::Long(counts)),
  ]
}

/// Entry set for a tiled 8-bit grayscale image
pub fn tile_entries(builder: &mut TiffBuilder, width: u32, height: u32, tile_width: u32, tile_height: u32, tiles: &[Vec<u8>]) -> Vec<(u16, Val)> {
  let mut offsets = Vec::new();
  let mut counts = Vec::new();
  for tile in tiles {
    offsets.push(builder.add_blob(tile) as u32);
    counts.push(tile.len() as u32);
  }
  vec![
    (256, Val::Long(vec![width])),
    (257, Val::Long(vec![height])),
    (258, Val::Short(vec![8])),
    (259, Val::Short(vec![1])),
    (262, Val::Short(vec![1])),
    (277, Val::Short(vec![1])),
    (322, Val::Long(vec![tile_width])),
    (323, Val::Long(vec![tile_height])),
    (324, Val::Long(offsets)),
    (325, Val::Long(counts)),
  ]
}
