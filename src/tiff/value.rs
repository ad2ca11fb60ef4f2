// SPDX-License-Identifier: MIT

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Type to represent tiff values of type `RATIONAL`
#[derive(Clone, Debug, Default, PartialEq, Copy, Serialize, Deserialize)]
pub struct Rational {
  pub n: u32,
  pub d: u32,
}

impl Rational {
  pub fn new(n: u32, d: u32) -> Self {
    Self { n, d }
  }
}

impl Display for Rational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

/// Type to represent tiff values of type `SRATIONAL`
#[derive(Clone, Debug, Default, PartialEq, Copy, Serialize, Deserialize)]
pub struct SRational {
  pub n: i32,
  pub d: i32,
}

impl SRational {
  pub fn new(n: i32, d: i32) -> Self {
    Self { n, d }
  }
}

impl Display for SRational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
  /// 8-bit unsigned integer
  Byte(Vec<u8>),
  /// 7-bit ASCII string, NUL terminated in the file
  Ascii(String),
  /// 16-bit unsigned integer
  Short(Vec<u16>),
  /// 32-bit unsigned integer
  Long(Vec<u32>),
  /// Fraction stored as two 32-bit unsigned integers
  Rational(Vec<Rational>),
  /// 8-bit signed integer
  SByte(Vec<i8>),
  /// 8-bit byte that may contain anything, depending on the field
  Undefined(Vec<u8>),
  /// 16-bit signed integer
  SShort(Vec<i16>),
  /// 32-bit signed integer
  SLong(Vec<i32>),
  /// Fraction stored as two 32-bit signed integers
  SRational(Vec<SRational>),
  /// 32-bit IEEE floating point
  Float(Vec<f32>),
  /// 64-bit IEEE floating point
  Double(Vec<f64>),
  /// 32-bit IFD offset
  Ifd(Vec<u32>),
  /// 64-bit unsigned integer (BigTIFF)
  Long8(Vec<u64>),
  /// 64-bit signed integer (BigTIFF)
  SLong8(Vec<i64>),
  /// 64-bit IFD offset (BigTIFF)
  Ifd8(Vec<u64>),
  /// Unknown type, preserved as raw bytes
  Unknown(u16, Vec<u8>),
}

impl Value {
  pub fn count(&self) -> usize {
    match self {
      Self::Byte(v) => v.len(),
      Self::Ascii(v) => v.len() + 1,
      Self::Short(v) => v.len(),
      Self::Long(v) => v.len(),
      Self::Rational(v) => v.len(),
      Self::SByte(v) => v.len(),
      Self::Undefined(v) => v.len(),
      Self::SShort(v) => v.len(),
      Self::SLong(v) => v.len(),
      Self::SRational(v) => v.len(),
      Self::Float(v) => v.len(),
      Self::Double(v) => v.len(),
      Self::Ifd(v) => v.len(),
      Self::Long8(v) => v.len(),
      Self::SLong8(v) => v.len(),
      Self::Ifd8(v) => v.len(),
      Self::Unknown(_, v) => v.len(),
    }
  }

  pub fn value_type_name(&self) -> &'static str {
    match self {
      Self::Byte(_) => "BYTE",
      Self::Ascii(_) => "ASCII",
      Self::Short(_) => "SHORT",
      Self::Long(_) => "LONG",
      Self::Rational(_) => "RATIONAL",
      Self::SByte(_) => "SBYTE",
      Self::Undefined(_) => "UNDEFINED",
      Self::SShort(_) => "SSHORT",
      Self::SLong(_) => "SLONG",
      Self::SRational(_) => "SRATIONAL",
      Self::Float(_) => "FLOAT",
      Self::Double(_) => "DOUBLE",
      Self::Ifd(_) => "IFD",
      Self::Long8(_) => "LONG8",
      Self::SLong8(_) => "SLONG8",
      Self::Ifd8(_) => "IFD8",
      Self::Unknown(_, _) => "UNKNOWN",
    }
  }

  /// Unsigned integer at `idx`, `None` for non-integer types or a
  /// missing index.
  pub fn get_u64(&self, idx: usize) -> Option<u64> {
    match self {
      Self::Byte(v) => v.get(idx).map(|v| *v as u64),
      Self::Short(v) => v.get(idx).map(|v| *v as u64),
      Self::Long(v) => v.get(idx).map(|v| *v as u64),
      Self::Ifd(v) => v.get(idx).map(|v| *v as u64),
      Self::Long8(v) => v.get(idx).copied(),
      Self::Ifd8(v) => v.get(idx).copied(),
      _ => None,
    }
  }

  pub fn get_usize(&self, idx: usize) -> Option<usize> {
    self.get_u64(idx).map(|v| v as usize)
  }

  /// All elements as u64, `None` for non-integer types.
  /// Strip and tile offset/byte-count arrays are read this way.
  pub fn get_u64_vec(&self) -> Option<Vec<u64>> {
    match self {
      Self::Byte(v) => Some(v.iter().map(|v| *v as u64).collect()),
      Self::Short(v) => Some(v.iter().map(|v| *v as u64).collect()),
      Self::Long(v) => Some(v.iter().map(|v| *v as u64).collect()),
      Self::Ifd(v) => Some(v.iter().map(|v| *v as u64).collect()),
      Self::Long8(v) => Some(v.clone()),
      Self::Ifd8(v) => Some(v.clone()),
      _ => None,
    }
  }

  pub fn as_string(&self) -> Option<&str> {
    match self {
      Self::Ascii(v) => Some(v),
      _ => None,
    }
  }

  pub fn visual_rep(&self, limit: usize) -> String {
    fn join<T: Display>(v: &[T], limit: usize) -> String {
      v.iter().take(limit).map(|a| format!("{}", a)).collect::<Vec<String>>().join(" ")
    }
    fn join_hex(v: &[u8], limit: usize) -> String {
      v.iter().take(limit).map(|a| format!("{:X}", a)).collect::<Vec<String>>().join(" ")
    }
    match self {
      Self::Byte(v) => join_hex(v, limit),
      Self::Ascii(v) => v.clone(),
      Self::Short(v) => join(v, limit),
      Self::Long(v) => join(v, limit),
      Self::Rational(v) => join(v, limit),
      Self::SByte(v) => join(v, limit),
      Self::Undefined(v) => join_hex(v, limit),
      Self::SShort(v) => join(v, limit),
      Self::SLong(v) => join(v, limit),
      Self::SRational(v) => join(v, limit),
      Self::Float(v) => join(v, limit),
      Self::Double(v) => join(v, limit),
      Self::Ifd(v) => join(v, limit),
      Self::Long8(v) => join(v, limit),
      Self::SLong8(v) => join(v, limit),
      Self::Ifd8(v) => join(v, limit),
      Self::Unknown(_t, v) => join_hex(v, limit),
    }
  }
}
