//! Record shapes of a driver card.
//!
//! Shapes populated once per card live in [`identity`]; shapes cut from
//! cyclic files live in [`history`] and implement [`Repeating`].

pub mod history;
pub mod identity;

use core::fmt;

use log::{debug, warn};

pub use self::{
    history::{
        CardEvent, CardFault, ControlActivity, DailyActivity, Place, SpecificCondition,
        VehicleUsed,
    },
    identity::{ApplicationIdentification, CardInfo, Driver, DrivingLicence, SessionOpen},
};
use crate::{
    cyclic::SplitPolicy,
    error::{Error, Result},
    schema::{FromFields, SubRecord, Tag, TagSource, load},
};

/// A group of records stored in one cyclic file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Events,
    Faults,
    VehiclesUsed,
    Places,
    ControlActivity,
    SpecificConditions,
    DriverActivity,
}

impl RecordKind {
    pub const ALL: [Self; 7] = [
        Self::Events,
        Self::Faults,
        Self::VehiclesUsed,
        Self::Places,
        Self::ControlActivity,
        Self::SpecificConditions,
        Self::DriverActivity,
    ];

    /// File holding the group.
    pub const fn tag(self) -> Tag {
        Tag::new(match self {
            Self::Events => 0x0502,
            Self::Faults => 0x0503,
            Self::VehiclesUsed => 0x0505,
            Self::Places => 0x0506,
            Self::ControlActivity => 0x0508,
            Self::SpecificConditions => 0x0522,
            Self::DriverActivity => 0x0504,
        })
    }

    /// How the file is cut into records.
    pub const fn policy(self) -> SplitPolicy {
        match self {
            Self::Events | Self::Faults => SplitPolicy::Fixed { width: 24, skip: 0 },
            Self::VehiclesUsed => SplitPolicy::Fixed { width: 31, skip: 2 },
            Self::Places => SplitPolicy::Fixed { width: 10, skip: 1 },
            Self::ControlActivity => SplitPolicy::Fixed { width: 46, skip: 0 },
            Self::SpecificConditions => SplitPolicy::Fixed { width: 5, skip: 0 },
            Self::DriverActivity => SplitPolicy::ActivityRing,
        }
    }

    /// Name of the group in documents and error reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Faults => "faults",
            Self::VehiclesUsed => "vehicles_used",
            Self::Places => "places",
            Self::ControlActivity => "control_activity",
            Self::SpecificConditions => "specific_conditions",
            Self::DriverActivity => "driver_activity",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record shape cut from a cyclic file.
pub trait Repeating: FromFields + PartialEq {
    const KIND: RecordKind;

    /// Complete a record after its fields are loaded.
    fn complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Whether the record is an unused slot, i.e. every field still holds
    /// its sentinel.
    fn is_vacant(&self) -> bool {
        *self == Self::default()
    }
}

/// Load every occupied record of a cyclic group, oldest first.
///
/// Integrity failures that cut an activity ring short are logged and the
/// records read before them kept. Any other failure is returned.
pub fn load_group<R: Repeating>(source: &impl TagSource) -> Result<Vec<R>> {
    let kind = R::KIND;
    let tag = kind.tag();

    let raw = source.get(tag).ok_or(Error::MissingSection {
        shape: R::SHAPE,
        tag,
    })?;

    let split = kind.policy().split(raw)?;
    for err in &split.recovered {
        warn!("Kept {} {kind} records before a broken chain: {err}", split.records.len());
    }

    let mut records = Vec::with_capacity(split.records.len());
    let mut vacant = 0;

    for bytes in &split.records {
        let mut record: R = load(&SubRecord { tag, bytes })?;
        record.complete()?;

        if record.is_vacant() {
            vacant += 1;
        } else {
            records.push(record);
        }
    }

    debug!("Loaded {} {kind} records, skipped {vacant} vacant.", records.len());

    Ok(records)
}
