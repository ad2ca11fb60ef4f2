// SPDX-License-Identifier: MIT

//! PackBits, the byte-oriented run-length scheme of TIFF 6.0.

/// Expand a PackBits stream. A control byte n in 0..=127 is followed by
/// n+1 literal bytes, n in -127..=-1 repeats the next byte 1-n times and
/// -128 is a no-op.
pub fn decode(src: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(src.len() * 2);
  let mut pos = 0;
  while pos < src.len() {
    let ctrl = src[pos] as i8;
    pos += 1;
    if ctrl >= 0 {
      let count = ctrl as usize + 1;
      let end = (pos + count).min(src.len());
      out.extend_from_slice(&src[pos..end]);
      pos = end;
    } else if ctrl != -128 {
      if let Some(byte) = src.get(pos) {
        let count = (1 - ctrl as isize) as usize;
        out.extend(std::iter::repeat_n(*byte, count));
        pos += 1;
      }
    }
  }
  out
}
