// SPDX-License-Identifier: MIT

use std::{
  collections::HashSet,
  io::{Read, Seek},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::tiff::{Ifd, TiffHeader};
use crate::{Result, TiffError};

/// What to do when a chained page or a SubIFD fails to parse.
///
/// The chain pointer of a broken page is unreadable, so `Skip` ends the
/// page chain there; a broken SubIFD only drops that subimage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PagePolicy {
  /// Fail the whole open call
  #[default]
  Abort,
  /// Log and keep whatever parsed cleanly
  Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenParams {
  /// Upper bound on parsed directories, pages and SubIFDs combined
  pub max_directories: usize,
  pub page_policy: PagePolicy,
}

impl Default for OpenParams {
  fn default() -> Self {
    Self {
      max_directories: 128,
      page_policy: PagePolicy::default(),
    }
  }
}

/// One page of the image catalog: the page's own directory plus its
/// nested sub-images. Subimage 0 is the page itself, 1..n the SubIFDs
/// in pointer-tag order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
  pub main: Ifd,
  pub subs: Vec<Ifd>,
}

impl Page {
  pub fn subimage_count(&self) -> usize {
    1 + self.subs.len()
  }

  pub fn subimage(&self, index: usize) -> Option<&Ifd> {
    if index == 0 { Some(&self.main) } else { self.subs.get(index - 1) }
  }
}

/// The parsed file structure: header plus the full two-level image
/// catalog. Built once at open, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TiffFile {
  pub header: TiffHeader,
  pub pages: Vec<Page>,
}

impl TiffFile {
  pub fn parse<R: Read + Seek>(file: &mut R, params: &OpenParams) -> Result<TiffFile> {
    let header = TiffHeader::parse(file)?;

    // Offsets form a graph that may contain cycles despite looking like
    // a list; every parsed directory is remembered and an offset may
    // only be visited once.
    let mut visited: HashSet<u64> = HashSet::new();
    let mut pages = Vec::new();

    let mut next_ifd = header.first_ifd;
    while next_ifd != 0 {
      Self::check_visit(&mut visited, next_ifd, params)?;
      let main = match Ifd::parse(file, next_ifd, &header) {
        Ok(ifd) => ifd,
        Err(err) => match params.page_policy {
          PagePolicy::Abort => return Err(err),
          PagePolicy::Skip => {
            warn!("Dropping unreadable page {} and the rest of the chain: {}", pages.len(), err);
            break;
          }
        },
      };
      next_ifd = main.next_ifd;

      let mut subs = Vec::new();
      for &sub_offset in &main.sub_offsets {
        Self::check_visit(&mut visited, sub_offset, params)?;
        match Ifd::parse(file, sub_offset, &header) {
          Ok(ifd) => subs.push(ifd),
          Err(err) => match params.page_policy {
            PagePolicy::Abort => return Err(err),
            PagePolicy::Skip => warn!("Dropping unreadable SubIFD at {:#x}: {}", sub_offset, err),
          },
        }
      }
      debug!("Page {} has {} subimages", pages.len(), 1 + subs.len());
      pages.push(Page { main, subs });
    }

    if pages.is_empty() {
      return Err(TiffError::Open("TIFF is invalid, must contain at least one IFD".to_string()));
    }
    Ok(TiffFile { header, pages })
  }

  // Cycle and runaway defense is never subject to the page policy
  fn check_visit(visited: &mut HashSet<u64>, offset: u64, params: &OpenParams) -> Result<()> {
    if !visited.insert(offset) {
      return Err(TiffError::DirectoryCycle { offset });
    }
    if visited.len() > params.max_directories {
      return Err(TiffError::TooManyDirectories {
        limit: params.max_directories,
      });
    }
    Ok(())
  }

  pub fn page_count(&self) -> usize {
    self.pages.len()
  }

  pub fn page(&self, index: usize) -> Option<&Page> {
    self.pages.get(index)
  }
}
