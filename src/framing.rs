//! Tag/length/value framing of a card export.
//!
//! An export is a flat sequence of blocks, each a [`header`] followed by its
//! value. [`RawTagMap::extract`] walks the blocks once, keeping file contents
//! keyed by tag and skipping signature blocks, which carry opaque
//! cryptographic data. [`Export`] performs the reverse.

pub mod header;
pub mod write;

use std::collections::BTreeMap;

use either::Either::{Left, Right};
use log::{debug, trace, warn};

use crate::{
    error::{Error, Result, window},
    schema::{Tag, TagSource},
};

pub use write::Export;

/// Raw value bytes of every file in an export, keyed by tag.
///
/// Values borrow from the export. When a tag occurs more than once, the later
/// occurrence replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTagMap<'a> {
    values: BTreeMap<Tag, &'a [u8]>,
}

impl<'a> RawTagMap<'a> {
    /// Extract the file values of a whole export.
    pub fn extract(r: &'a [u8]) -> Result<Self> {
        let mut values = BTreeMap::new();
        let i = &mut 0; // Offset of the next unread byte.

        while *i < r.len() {
            let start = *i;
            let block = take::<3>(r, i).ok_or(Error::MalformedLength {
                offset: start,
                detail: "incomplete block header",
            })?;

            let at = *i;
            let length = take::<2>(r, i).ok_or(Error::MalformedLength {
                offset: at,
                detail: "incomplete length field",
            })?;

            match header::advance(block) {
                Left(state) => {
                    let (tag, scheme, len) = state.advance(length);
                    window(r, *i, len)?;
                    debug!("Skipped {scheme:?} signature of {tag} ({len} bytes).");
                    *i += len;
                }
                Right(state) => {
                    let (tag, len) = state.advance(length);
                    let value = window(r, *i, len)?;
                    trace!("Extracted {tag} ({len} bytes) at offset {start}.");
                    if values.insert(tag, value).is_some() {
                        warn!("Section {tag} occurs more than once; keeping the last.");
                    }
                    *i += len;
                }
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, tag: Tag) -> Option<&'a [u8]> {
        self.values.get(&tag).copied()
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.values.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over tags and values in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &'a [u8])> + '_ {
        self.values.iter().map(|(tag, value)| (*tag, *value))
    }
}

impl TagSource for RawTagMap<'_> {
    fn get(&self, tag: Tag) -> Option<&[u8]> {
        self.values.get(&tag).copied()
    }
}

/// Take an exact number of bytes from an offset in a slice, advancing the offset.
fn take<const N: usize>(r: &[u8], i: &mut usize) -> Option<[u8; N]> {
    let s = *i;
    *i += N;

    r.get(s..*i)?.try_into().ok()
}
