// SPDX-License-Identifier: MIT

//! CCITT Group 4 (T.6) decoder.
//!
//! The stream is fully two-dimensionally coded: every scanline is
//! expressed relative to the changing elements of the previous one. The
//! decoder therefore threads a reference line through the scanline loop
//! as an explicit value, which keeps a block decode free of shared
//! state and safe to run in parallel with other blocks.

use log::debug;

use crate::pumps::{BitPump, BitPumpMSB};
use crate::{Result, TiffError};

mod tables;

use self::tables::{
  BLACK_STATES, CodeState, EOFB, EOFB_BITS, INVALID, MODE_HORIZONTAL, MODE_PASS, MODE_STATES, MODE_V0, MODE_VL1, MODE_VL2, MODE_VL3, MODE_VR1,
  MODE_VR2, MODE_VR3, VALUE_FLAG, VALUE_MASK, WHITE_STATES,
};

/// Pixel value for white in the decoded buffer
pub const WHITE: u8 = 0;
/// Pixel value for black in the decoded buffer
pub const BLACK: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
  Pass,
  Horizontal,
  Vertical(i8),
}

/// Decode a Group 4 compressed block of `width` x `height` pixels.
///
/// Returns one byte per pixel in row-major order, [`WHITE`] or
/// [`BLACK`]. Decoding stops after `height` scanlines; the stream
/// carries no end marker that the decoder relies on.
pub fn decode_g4(src: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
  let mut out = vec![WHITE; width * height];
  if width == 0 || height == 0 {
    return Ok(out);
  }
  let mut pump = BitPumpMSB::new(src);

  // The reference line for the first scanline is an imaginary all-white
  // line, represented by the absence of changing elements.
  let mut reference: Vec<u32> = Vec::new();
  let mut current: Vec<u32> = Vec::new();

  for row in 0..height {
    let line = &mut out[row * width..(row + 1) * width];
    decode_scanline(&mut pump, width, row, &reference, &mut current, line)?;
    std::mem::swap(&mut reference, &mut current);
  }
  debug!("group 4 block decoded after {} bits", pump.bit_position());
  Ok(out)
}

fn decode_scanline(pump: &mut BitPumpMSB<'_>, width: usize, row: usize, reference: &[u32], current: &mut Vec<u32>, line: &mut [u8]) -> Result<()> {
  current.clear();
  let mut a0: i64 = -1;
  let mut white = true;

  while a0 < width as i64 {
    if pump.peek_bits(EOFB_BITS) == EOFB {
      return Err(TiffError::DecodeDesync(format!(
        "end-of-block marker inside scanline {}, declared height not reached",
        row
      )));
    }
    match read_mode(pump, row)? {
      Mode::Pass => {
        // The run continues beyond the reference line's next transition
        // pair; no changing element is recorded and the color is kept.
        let (_b1, b2) = locate_b(reference, a0, white, width);
        fill_run(line, a0, b2 as i64, white);
        a0 = b2 as i64;
      }
      Mode::Horizontal => {
        let first = read_run(pump, white, row)? as i64;
        let second = read_run(pump, !white, row)? as i64;
        let start = a0.max(0);
        let a1 = start + first;
        let a2 = a1 + second;
        if a2 > width as i64 {
          return Err(TiffError::DecodeDesync(format!(
            "run pair {}+{} overruns width {} in scanline {}",
            first, second, width, row
          )));
        }
        if a2 <= a0 {
          return Err(TiffError::DecodeDesync(format!("scanline {} stopped advancing at column {}", row, a0)));
        }
        fill_run(line, start, a1, white);
        fill_run(line, a1, a2, !white);
        current.push(a1 as u32);
        current.push(a2 as u32);
        a0 = a2;
      }
      Mode::Vertical(delta) => {
        let (b1, _b2) = locate_b(reference, a0, white, width);
        let a1 = b1 as i64 + delta as i64;
        if a1 < 0 || a1 <= a0 || a1 > width as i64 {
          return Err(TiffError::DecodeDesync(format!(
            "vertical mode moves to column {} from {} in scanline {}",
            a1, a0, row
          )));
        }
        fill_run(line, a0, a1, white);
        current.push(a1 as u32);
        a0 = a1;
        white = !white;
      }
    }
  }
  Ok(())
}

/// Changing elements alternate colors starting with white-to-black, so
/// b1 candidates for a white run sit at even indices and at odd indices
/// for a black run. Past the last changing element both b1 and b2 are
/// the imaginary transition at the scanline width.
fn locate_b(reference: &[u32], a0: i64, white: bool, width: usize) -> (usize, usize) {
  let mut i = if white { 0 } else { 1 };
  while i < reference.len() && reference[i] as i64 <= a0 {
    i += 2;
  }
  let b1 = reference.get(i).map(|v| *v as usize).unwrap_or(width);
  let b2 = reference.get(i + 1).map(|v| *v as usize).unwrap_or(width);
  (b1, b2)
}

fn fill_run(line: &mut [u8], from: i64, to: i64, white: bool) {
  if !white {
    let from = (from.max(0) as usize).min(line.len());
    let to = (to.max(0) as usize).min(line.len());
    line[from..to].fill(BLACK);
  }
}

fn read_mode(pump: &mut BitPumpMSB<'_>, row: usize) -> Result<Mode> {
  let mut state = 0_usize;
  loop {
    if pump.exhausted() {
      return Err(TiffError::InvalidModeCode {
        row,
        bit: pump.bit_position(),
      });
    }
    let transition = step(&MODE_STATES, state, pump.get_bits(1));
    if transition == INVALID {
      return Err(TiffError::InvalidModeCode {
        row,
        bit: pump.bit_position(),
      });
    } else if transition & VALUE_FLAG != 0 {
      return Ok(match transition & VALUE_MASK {
        MODE_PASS => Mode::Pass,
        MODE_HORIZONTAL => Mode::Horizontal,
        MODE_V0 => Mode::Vertical(0),
        MODE_VR1 => Mode::Vertical(1),
        MODE_VR2 => Mode::Vertical(2),
        MODE_VR3 => Mode::Vertical(3),
        MODE_VL1 => Mode::Vertical(-1),
        MODE_VL2 => Mode::Vertical(-2),
        _ => Mode::Vertical(-3),
      });
    }
    state = transition as usize;
  }
}

/// One run length of the given color, chaining make-up codes (multiples
/// of 64 up to 2560) until a terminating code below 64 arrives.
fn read_run(pump: &mut BitPumpMSB<'_>, white: bool, row: usize) -> Result<usize> {
  let states: &[CodeState] = if white { &WHITE_STATES } else { &BLACK_STATES };
  let mut total = 0_usize;
  let mut state = 0_usize;
  loop {
    if pump.exhausted() {
      return Err(TiffError::InvalidModeCode {
        row,
        bit: pump.bit_position(),
      });
    }
    let transition = step(states, state, pump.get_bits(1));
    if transition == INVALID {
      return Err(TiffError::InvalidModeCode {
        row,
        bit: pump.bit_position(),
      });
    } else if transition & VALUE_FLAG != 0 {
      let len = (transition & VALUE_MASK) as usize;
      total += len;
      if len < 64 {
        return Ok(total);
      }
      state = 0;
    } else {
      state = transition as usize;
    }
  }
}

#[inline(always)]
fn step(states: &[CodeState], state: usize, bit: u32) -> u16 {
  if bit == 0 { states[state].on_zero } else { states[state].on_one }
}
