//! The variable-width daily activity ring.
//!
//! The file opens with two big-endian pointers, the offsets of the oldest and
//! the newest record relative to the data area that follows them. Each record
//! in the data area starts with a four-byte prefix: the length of the record
//! before it, then its own length (both counting the prefix). The oldest
//! record claims a previous length of zero.
//!
//! The forward pass reads from the oldest record to the end of the data area,
//! joining a record that runs past the end with bytes from the start of the
//! area. Once the ring has wrapped (the newest pointer sits below the oldest),
//! the remaining records lie below the newest one and are reached by walking
//! backward along the previous-length chain.
//!
//! The forward pass also ends where the rest of the data area is blank. A
//! broken chain ends the affected pass but keeps what it already read.

use std::borrow::Cow;

use zerocopy::FromBytes;

use crate::error::{Error, Result};

use super::Split;

const PREFIX: usize = 4;

#[repr(C, packed)]
#[derive(Debug, FromBytes)]
struct Pointers {
    oldest: [u8; 2],
    newest: [u8; 2],
}

#[repr(C, packed)]
#[derive(Debug, FromBytes)]
struct RecordPrefix {
    previous: [u8; 2],
    current: [u8; 2],
}

/// Recover the daily records of an activity ring, oldest first.
pub fn split(r: &[u8]) -> Result<Split<'_>> {
    let pointers = array::<PREFIX>(r, 0).ok_or(Error::Truncated {
        offset: 0,
        needed: PREFIX,
        available: r.len(),
    })?;

    let Pointers { oldest, newest } = zerocopy::transmute!(pointers);
    let oldest = usize::from(u16::from_be_bytes(oldest));
    let newest = usize::from(u16::from_be_bytes(newest));

    let area = &r[PREFIX..];

    let mut split = Split::default();

    let (records, stop) = forward(area, oldest);
    split.records = records;
    split.recovered.extend(stop);

    if newest < oldest {
        let (mut records, stop) = backward(area, newest);
        records.reverse();
        split.records.append(&mut records);
        split.recovered.extend(stop);
    }

    Ok(split)
}

fn forward(area: &[u8], start: usize) -> (Vec<Cow<'_, [u8]>>, Option<Error>) {
    let mut records = Vec::new();
    let mut i = start;
    let mut expected = 0; // Length of the record read before this one.

    while i < area.len() {
        if area[i..].iter().all(|&b| b == 0) {
            break; // Never written.
        }

        let (previous, current) = match prefix(area, i) {
            Ok(lengths) => lengths,
            Err(err) => return (records, Some(err)),
        };

        if previous != expected {
            let err = Error::RingMismatch {
                offset: i,
                expected,
                found: previous,
            };
            return (records, Some(err));
        }

        let begin = i + PREFIX;
        let end = i + current;

        let record = if end > area.len() {
            // The record wraps around to the start of the data area.
            let Some(head) = area.get(..end - area.len()) else {
                let err = Error::RingMismatch {
                    offset: i + 2,
                    expected: area.len(),
                    found: current,
                };
                return (records, Some(err));
            };
            Cow::Owned([&area[begin..], head].concat())
        } else {
            Cow::Borrowed(&area[begin..end])
        };

        records.push(record);
        i = end;
        expected = current;
    }

    (records, None)
}

fn backward(area: &[u8], start: usize) -> (Vec<Cow<'_, [u8]>>, Option<Error>) {
    let mut records = Vec::new();
    let mut i = start;

    loop {
        let (previous, current) = match prefix(area, i) {
            Ok(lengths) => lengths,
            Err(err) => return (records, Some(err)),
        };

        let Some(payload) = area.get(i + PREFIX..i + current) else {
            let err = Error::RingMismatch {
                offset: i + 2,
                expected: area.len() - i,
                found: current,
            };
            return (records, Some(err));
        };
        records.push(Cow::Borrowed(payload));

        // The oldest record, or one whose predecessor would start before the
        // data area, ends the walk.
        let Some(j) = i.checked_sub(previous).filter(|_| previous != 0) else {
            break;
        };

        let (_, length) = match prefix(area, j) {
            Ok(lengths) => lengths,
            Err(err) => return (records, Some(err)),
        };

        if length != previous {
            let err = Error::RingMismatch {
                offset: j + 2,
                expected: previous,
                found: length,
            };
            return (records, Some(err));
        }

        i = j;
    }

    (records, None)
}

/// Read the previous and current record lengths at `i`.
fn prefix(area: &[u8], i: usize) -> Result<(usize, usize)> {
    let r = array::<PREFIX>(area, i).ok_or(Error::RingMismatch {
        offset: i,
        expected: PREFIX,
        found: area.len().saturating_sub(i),
    })?;

    let RecordPrefix { previous, current } = zerocopy::transmute!(r);
    let previous = usize::from(u16::from_be_bytes(previous));
    let current = usize::from(u16::from_be_bytes(current));

    if current < PREFIX {
        Err(Error::RingMismatch {
            offset: i + 2,
            expected: PREFIX,
            found: current,
        })?;
    }

    Ok((previous, current))
}

fn array<const N: usize>(r: &[u8], i: usize) -> Option<[u8; N]> {
    r.get(i..i.checked_add(N)?)?.try_into().ok()
}
