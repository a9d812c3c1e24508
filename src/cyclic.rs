//! Reconstruction of logical records from cyclic card files.
//!
//! Cards keep their history in ring areas. Most rings hold fixed-width slots
//! and are cut with [`split_fixed`]; the daily activity ring holds
//! variable-width records chained by their lengths and is walked by
//! [`ring::split`].

pub mod ring;

use std::borrow::Cow;

use crate::error::{Error, Result};

/// How the value of a cyclic file is cut into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Consecutive `width`-byte slots following a `skip`-byte header.
    Fixed { width: usize, skip: usize },
    /// The variable-width daily activity ring.
    ActivityRing,
}

impl SplitPolicy {
    pub fn split(self, r: &[u8]) -> Result<Split<'_>> {
        match self {
            Self::Fixed { width, skip } => Ok(Split {
                records: split_fixed(r, width, skip)?
                    .into_iter()
                    .map(Cow::Borrowed)
                    .collect(),
                recovered: Vec::new(),
            }),
            Self::ActivityRing => ring::split(r),
        }
    }
}

/// Records recovered from a cyclic file, oldest first.
#[derive(Debug, Default)]
pub struct Split<'a> {
    /// Record payloads. A record wrapping around the end of a ring is joined
    /// into an owned buffer; all others borrow from the file.
    pub records: Vec<Cow<'a, [u8]>>,
    /// Integrity failures that ended a walk early.
    pub recovered: Vec<Error>,
}

/// Cut fixed-width slots following a header.
///
/// The bytes after the header must be a whole number of slots.
pub fn split_fixed(r: &[u8], width: usize, skip: usize) -> Result<Vec<&[u8]>> {
    if width == 0 {
        Err(Error::MalformedLength {
            offset: skip,
            detail: "zero record width",
        })?;
    }

    let body = r.get(skip..).ok_or(Error::Truncated {
        offset: 0,
        needed: skip,
        available: r.len(),
    })?;

    let slots = body.chunks_exact(width);
    let remainder = slots.remainder();
    if !remainder.is_empty() {
        Err(Error::Truncated {
            offset: r.len() - remainder.len(),
            needed: width,
            available: remainder.len(),
        })?;
    }

    Ok(slots.collect())
}
