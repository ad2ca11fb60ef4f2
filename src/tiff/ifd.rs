// SPDX-License-Identifier: MIT

use std::{
  collections::BTreeMap,
  io::{Read, Seek},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bits::Endian;
use crate::tiff::{Entry, TiffHeader, TiffTag, TiffVariant, Value};
use crate::{Result, TiffError};

use super::reader::{EndianReader, ReadByteOrder};

/// One image file directory: the validated tag/entry mapping, the offset
/// of the next directory in the page chain and any SubIFD offsets found
/// in the entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ifd {
  pub offset: u64,
  pub next_ifd: u64,
  pub entries: BTreeMap<u16, Entry>,
  pub endian: Endian,
  /// SubIFD offsets in the order the pointer tag lists them
  pub sub_offsets: Vec<u64>,
}

impl Ifd {
  pub fn parse<R: Read + Seek>(file: &mut R, offset: u64, header: &TiffHeader) -> Result<Ifd> {
    let mut reader = EndianReader::new(file, header.endian);
    let stream_len = reader.stream_len()?;
    if offset >= stream_len {
      return Err(TiffError::MalformedDirectory {
        offset,
        reason: format!("directory offset exceeds stream length {}", stream_len),
      });
    }
    reader.goto(offset)?;

    let entry_count = match header.variant {
      TiffVariant::Classic => reader.read_u16()? as u64,
      TiffVariant::Big => reader.read_u64()?,
    };
    debug!("Parsing {} entries of IFD at offset {:#x}", entry_count, offset);
    if entry_count == 0 {
      return Err(TiffError::MalformedDirectory {
        offset,
        reason: "directory contains no entries".to_string(),
      });
    }
    // Directory size itself must fit into the stream before any entry read
    let count_field = match header.variant {
      TiffVariant::Classic => 2,
      TiffVariant::Big => 8,
    };
    let in_bounds = entry_count
      .checked_mul(header.variant.entry_size())
      .and_then(|bytes| bytes.checked_add(count_field))
      .and_then(|bytes| offset.checked_add(bytes))
      .map(|end| end <= stream_len)
      .unwrap_or(false);
    if !in_bounds {
      return Err(TiffError::MalformedDirectory {
        offset,
        reason: format!("{} entries exceed stream bounds", entry_count),
      });
    }

    let mut entries = BTreeMap::new();
    let mut sub_offsets = Vec::new();
    let mut last_tag: Option<u16> = None;
    let mut next_pos = reader.position()?;
    for _ in 0..entry_count {
      reader.goto(next_pos)?;
      next_pos += header.variant.entry_size();
      let tag = reader.read_u16()?;

      // Tag ids must be strictly increasing, repeated or shuffled
      // directories are rejected rather than reordered.
      if last_tag.map(|last| tag <= last).unwrap_or(false) {
        return Err(TiffError::MalformedDirectory {
          offset,
          reason: format!("tag {:#06x} out of order after {:#06x}", tag, last_tag.unwrap_or_default()),
        });
      }
      last_tag = Some(tag);

      let entry = Entry::parse(&mut reader, header.variant, stream_len, tag)?;
      if tag == TiffTag::SubIFDs.into() {
        match &entry.value {
          Value::Long(_) | Value::Long8(_) | Value::Ifd(_) | Value::Ifd8(_) => {
            sub_offsets.extend(entry.value.get_u64_vec().unwrap_or_default());
          }
          val => {
            log::warn!("SubIFD pointer tag has type {}, ignoring it", val.value_type_name());
          }
        }
      }
      entries.insert(tag, entry);
    }

    reader.goto(next_pos)?;
    // Some TIFF writers omit the next ifd pointer. If the read fails we
    // fall back to 0, signaling the end of the page chain.
    let next_ifd = match header.variant.read_offset(&mut reader) {
      Ok(ptr) => ptr,
      Err(err) => {
        debug!("No next-IFD pointer after directory at {:#x}, ending chain: {}", offset, err);
        0
      }
    };

    Ok(Ifd {
      offset,
      next_ifd,
      entries,
      endian: header.endian,
      sub_offsets,
    })
  }

  pub fn entry_count(&self) -> usize {
    self.entries.len()
  }

  pub fn next_ifd(&self) -> u64 {
    self.next_ifd
  }

  pub fn entries(&self) -> &BTreeMap<u16, Entry> {
    &self.entries
  }

  pub fn get_entry(&self, tag: impl Into<u16>) -> Option<&Entry> {
    self.entries.get(&tag.into())
  }

  pub fn has_entry(&self, tag: impl Into<u16>) -> bool {
    self.get_entry(tag).is_some()
  }

  /// Single unsigned integer value of a required tag
  pub fn usize_value(&self, tag: impl Into<u16>) -> Result<usize> {
    let tag = tag.into();
    let entry = self.get_entry(tag).ok_or(TiffError::MissingTag { offset: self.offset, tag })?;
    entry.value.get_usize(0).ok_or(TiffError::TypeMismatch {
      tag,
      expected: "integer",
      found: entry.type_name(),
    })
  }

  /// Like [`Ifd::usize_value`] but with a default for an absent tag
  pub fn usize_value_or(&self, tag: impl Into<u16>, default: usize) -> Result<usize> {
    let tag = tag.into();
    match self.get_entry(tag) {
      Some(entry) => entry.value.get_usize(0).ok_or(TiffError::TypeMismatch {
        tag,
        expected: "integer",
        found: entry.type_name(),
      }),
      None => Ok(default),
    }
  }

  /// Full unsigned integer array of a required tag
  pub fn u64_array(&self, tag: impl Into<u16>) -> Result<Vec<u64>> {
    let tag = tag.into();
    let entry = self.get_entry(tag).ok_or(TiffError::MissingTag { offset: self.offset, tag })?;
    entry.value.get_u64_vec().ok_or(TiffError::TypeMismatch {
      tag,
      expected: "integer array",
      found: entry.type_name(),
    })
  }

  /// Tabular representation of all entries for inspection tooling
  pub fn dump(&self, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    out.push(format!("IFD entries: {}\n", self.entries.len()));
    out.push(format!("{0:<10} | {1:<10} | {2:<6} | {3}\n", "Tag", "Type", "Count", "Data"));
    for (tag, entry) in &self.entries {
      out.push(format!(
        "{0:#06x} {0:<6} | {1:<10} | {2:<6} | {3}",
        tag,
        entry.type_name(),
        entry.count(),
        entry.value.visual_rep(limit)
      ));
    }
    out
  }
}
