// SPDX-License-Identifier: MIT

use std::{
  fs::File,
  io::{Cursor, Read},
  ops::Deref,
  path::{Path, PathBuf},
  sync::Arc,
};

use md5::Digest;
use memmap2::MmapOptions;

use crate::{Result, TiffError};

/// Byte source for a TIFF file.
///
/// Backed either by a memory map of the file or by an owned buffer.
/// All block reads go through [`TiffSource::subview`], so the source is
/// shared freely between threads during parallel block decode.
pub struct TiffSource {
  path: PathBuf,
  inner: SourceImpl,
}

enum SourceImpl {
  Memmap(memmap2::Mmap),
  Memory(Arc<Vec<u8>>),
}

impl TiffSource {
  pub fn new(path: &Path) -> std::io::Result<Self> {
    let file = File::open(path)?;
    let mmap = unsafe { MmapOptions::new().populate().map(&file)? };
    #[cfg(unix)]
    {
      mmap.advise(memmap2::Advice::WillNeed)?;
    }
    Ok(Self {
      path: path.canonicalize().unwrap_or_else(|_| path.to_owned()),
      inner: SourceImpl::Memmap(mmap),
    })
  }

  pub fn new_from_shared_vec(buf: Arc<Vec<u8>>) -> Self {
    Self {
      path: PathBuf::default(),
      inner: SourceImpl::Memory(buf),
    }
  }

  pub fn new_from_slice(buf: &[u8]) -> Self {
    Self::new_from_shared_vec(Arc::new(Vec::from(buf)))
  }

  /// Drain a non-seekable reader into memory, up to `limit` bytes.
  ///
  /// The catalog needs random access, so plain readers are buffered in
  /// full. Inputs larger than `limit` fail with [`TiffError::BufferLimit`]
  /// instead of growing without bound.
  pub fn from_reader<R: Read>(mut reader: R, limit: usize) -> Result<Self> {
    let mut buf = Vec::new();
    reader.by_ref().take(limit as u64 + 1).read_to_end(&mut buf)?;
    if buf.len() > limit {
      return Err(TiffError::BufferLimit { limit });
    }
    Ok(Self::new_from_shared_vec(Arc::new(buf)))
  }

  pub fn with_path(self, path: impl AsRef<Path>) -> Self {
    Self {
      path: path.as_ref().to_owned(),
      inner: self.inner,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Calculate digest for the full source
  pub fn digest(&self) -> Digest {
    md5::compute(self.buf())
  }

  pub fn buf(&self) -> &[u8] {
    self.deref()
  }

  pub fn len(&self) -> usize {
    self.buf().len()
  }

  pub fn is_empty(&self) -> bool {
    self.buf().is_empty()
  }

  pub fn subview(&self, offset: u64, size: u64) -> std::io::Result<&[u8]> {
    let end = offset.checked_add(size).ok_or_else(|| {
      std::io::Error::new(std::io::ErrorKind::UnexpectedEof, format!("subview(): offset {}+{} overflows", offset, size))
    })?;
    self.buf().get(offset as usize..end as usize).ok_or(std::io::Error::new(
      std::io::ErrorKind::UnexpectedEof,
      format!("subview(): Offset {}+{} is behind EOF", offset, size),
    ))
  }

  pub fn reader(&self) -> Cursor<&[u8]> {
    Cursor::new(self.buf())
  }
}

impl Deref for TiffSource {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    match &self.inner {
      SourceImpl::Memmap(map) => map,
      SourceImpl::Memory(buf) => buf,
    }
  }
}
