// SPDX-License-Identifier: MIT

use std::io::{Read, Seek};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::tiff::{Rational, SRational, TiffVariant, Value};
use crate::{Result, TiffError};

use super::reader::{EndianReader, ReadByteOrder};

const TYPE_BYTE: u16 = 1;
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;
const TYPE_SBYTE: u16 = 6;
const TYPE_UNDEFINED: u16 = 7;
const TYPE_SSHORT: u16 = 8;
const TYPE_SLONG: u16 = 9;
const TYPE_SRATIONAL: u16 = 10;
const TYPE_FLOAT: u16 = 11;
const TYPE_DOUBLE: u16 = 12;
const TYPE_IFD: u16 = 13;
const TYPE_LONG8: u16 = 16;
const TYPE_SLONG8: u16 = 17;
const TYPE_IFD8: u16 = 18;

// Shift from element count to byte size, indexed by type code
const DATASHIFTS: [u8; 19] = [0, 0, 0, 1, 2, 3, 0, 0, 1, 2, 3, 2, 3, 2, 0, 0, 3, 3, 3];

/// One parsed directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub tag: u16,
  pub value: Value,
  /// Offset of the value data, the entry position itself for inline values
  pub offset: Option<u64>,
}

impl Entry {
  pub fn count(&self) -> usize {
    self.value.count()
  }

  pub fn type_name(&self) -> &'static str {
    self.value.value_type_name()
  }

  /// Parse one entry. The tag id has already been consumed by the
  /// caller; the reader is left at the start of the next entry.
  pub fn parse<R: Read + Seek>(reader: &mut EndianReader<'_, R>, variant: TiffVariant, stream_len: u64, tag: u16) -> Result<Entry> {
    let pos = reader.position()? - 2;

    let typ = reader.read_u16()?;
    let count = variant.read_offset(reader)?;

    debug!("Tag: {:#x}, Typ: {:#x}, count: {}", tag, typ, count);

    // If we don't know the type assume byte data (undefined)
    let compat_typ = if typ == 0 || typ as usize >= DATASHIFTS.len() { TYPE_UNDEFINED } else { typ };

    let bytesize = count << DATASHIFTS[compat_typ as usize];
    let offset = if bytesize <= variant.inline_size() as u64 {
      reader.position()?
    } else {
      variant.read_offset(reader)?
    };

    if offset.checked_add(bytesize).map(|end| end > stream_len).unwrap_or(true) {
      return Err(TiffError::MalformedDirectory {
        offset: pos,
        reason: format!("value of tag {:#06x} ({}+{} bytes) exceeds stream bounds", tag, offset, bytesize),
      });
    }
    let count = count as usize;

    reader.goto(offset)?;
    let value = match typ {
      TYPE_BYTE => {
        let mut v = vec![0; count];
        reader.read_u8_into(&mut v)?;
        Value::Byte(v)
      }
      TYPE_ASCII => {
        let mut v = vec![0; count];
        reader.read_u8_into(&mut v)?;
        let end = v.iter().position(|b| *b == 0).unwrap_or(v.len());
        Value::Ascii(String::from_utf8_lossy(&v[..end]).into_owned())
      }
      TYPE_SHORT => {
        let mut v = vec![0; count];
        reader.read_u16_into(&mut v)?;
        Value::Short(v)
      }
      TYPE_LONG => {
        let mut v = vec![0; count];
        reader.read_u32_into(&mut v)?;
        Value::Long(v)
      }
      TYPE_RATIONAL => {
        let mut tmp = vec![0; count * 2]; // Rational is 2x u32
        reader.read_u32_into(&mut tmp)?;
        Value::Rational(tmp.chunks_exact(2).map(|c| Rational::new(c[0], c[1])).collect())
      }
      TYPE_SBYTE => {
        let mut v = vec![0; count];
        reader.read_i8_into(&mut v)?;
        Value::SByte(v)
      }
      TYPE_UNDEFINED => {
        let mut v = vec![0; count];
        reader.read_u8_into(&mut v)?;
        Value::Undefined(v)
      }
      TYPE_SSHORT => {
        let mut v = vec![0; count];
        reader.read_i16_into(&mut v)?;
        Value::SShort(v)
      }
      TYPE_SLONG => {
        let mut v = vec![0; count];
        reader.read_i32_into(&mut v)?;
        Value::SLong(v)
      }
      TYPE_SRATIONAL => {
        let mut tmp = vec![0; count * 2]; // SRational is 2x i32
        reader.read_i32_into(&mut tmp)?;
        Value::SRational(tmp.chunks_exact(2).map(|c| SRational::new(c[0], c[1])).collect())
      }
      TYPE_FLOAT => {
        let mut v = vec![0.0; count];
        reader.read_f32_into(&mut v)?;
        Value::Float(v)
      }
      TYPE_DOUBLE => {
        let mut v = vec![0.0; count];
        reader.read_f64_into(&mut v)?;
        Value::Double(v)
      }
      TYPE_IFD => {
        let mut v = vec![0; count];
        reader.read_u32_into(&mut v)?;
        Value::Ifd(v)
      }
      TYPE_LONG8 => {
        let mut v = vec![0; count];
        reader.read_u64_into(&mut v)?;
        Value::Long8(v)
      }
      TYPE_SLONG8 => {
        let mut v = vec![0; count];
        reader.read_i64_into(&mut v)?;
        Value::SLong8(v)
      }
      TYPE_IFD8 => {
        let mut v = vec![0; count];
        reader.read_u64_into(&mut v)?;
        Value::Ifd8(v)
      }
      x => {
        let mut v = vec![0; count];
        reader.read_u8_into(&mut v)?;
        Value::Unknown(x, v)
      }
    };
    reader.goto(pos + variant.entry_size())?;
    Ok(Entry {
      tag,
      value,
      offset: Some(offset),
    })
  }
}
