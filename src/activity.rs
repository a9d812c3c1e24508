//! Activity changes packed into a daily activity record.
//!
//! A day's record ends with a run of two-byte units, each marking the moment
//! the driver's activity changed. Units are kept as lowercase hex text (four
//! characters per unit) on [`DailyActivity`](crate::records::DailyActivity)
//! and decoded here.

use core::iter::FusedIterator;

use chrono::{DateTime, TimeDelta, Utc};
use tartan_bitfield::bitfield;

use crate::error::{Error, Result};

const UNIT_CHARS: usize = 4;

bitfield! {
    struct ChangeInfo(u16) {
        [0..11] minutes: u16,
        [11..13] activity: u8,
        [13] card_status,
        [14] driving_status,
        [15] slot,
    }
}

/// A single change of driver activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActivityChange {
    /// Card reader slot: 0 driver, 1 co-driver.
    #[cfg_attr(feature = "serde", serde(rename = "tachograph_card_reader_id"))]
    pub reader_slot: u8,
    /// Driving status: 0 single, 1 crew.
    #[cfg_attr(feature = "serde", serde(rename = "state_driving_id"))]
    pub driving_status: u8,
    /// Card status: 0 inserted, 1 not inserted.
    #[cfg_attr(feature = "serde", serde(rename = "card_position_id"))]
    pub card_status: u8,
    /// Activity: 0 break/rest, 1 availability, 2 work, 3 driving.
    #[cfg_attr(feature = "serde", serde(rename = "activity_kind_id"))]
    pub activity: u8,
    /// Minutes since midnight UTC.
    #[cfg_attr(feature = "serde", serde(rename = "activity_change_info_t"))]
    pub minutes: u16,
    /// The day of the record plus [`Self::minutes`].
    #[cfg_attr(feature = "serde", serde(rename = "calculated_time"))]
    pub time: DateTime<Utc>,
}

impl ActivityChange {
    /// Decode one unit of four hex characters.
    pub fn decode(unit: &str, day: DateTime<Utc>) -> Result<Self> {
        let mut raw = [0; 2];
        hex::decode_to_slice(unit, &mut raw)
            .map_err(|_| Error::MalformedBitfield(unit.to_owned()))?;

        let info = ChangeInfo(u16::from_be_bytes(raw));
        let minutes = info.minutes();

        Ok(Self {
            reader_slot: info.slot().into(),
            driving_status: info.driving_status().into(),
            card_status: info.card_status().into(),
            activity: info.activity(),
            minutes,
            time: day + TimeDelta::minutes(minutes.into()),
        })
    }
}

/// Lazily decoded activity changes of one day, in recorded order.
///
/// Cloning yields an independent iterator starting from the same unit.
#[derive(Debug, Clone)]
pub struct ActivityChanges<'a> {
    units: &'a str,
    day: DateTime<Utc>,
}

impl<'a> ActivityChanges<'a> {
    pub fn new(units: &'a str, day: DateTime<Utc>) -> Self {
        Self { units, day }
    }
}

impl Iterator for ActivityChanges<'_> {
    type Item = Result<ActivityChange>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.units.is_empty() {
            return None;
        }

        let (unit, rest) = self
            .units
            .split_at_checked(UNIT_CHARS)
            .unwrap_or((self.units, ""));
        self.units = rest;

        Some(ActivityChange::decode(unit, self.day))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.units.len().div_ceil(UNIT_CHARS);
        (n, Some(n))
    }
}

impl FusedIterator for ActivityChanges<'_> {}
