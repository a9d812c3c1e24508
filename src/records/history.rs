//! Shapes cut from the cyclic files of a driver card.

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::Serialize;

use super::{RecordKind, Repeating};
use crate::{
    activity::{ActivityChange, ActivityChanges},
    error::Result,
    schema::FromFields,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CardEvent {
    #[tlv(0x0502, 1, 0, int)]
    #[cfg_attr(feature = "serde", serde(rename = "event_type_id"))]
    pub event_type: u32,
    #[tlv(0x0502, 4, 1, date)]
    pub event_begin_time: DateTime<Utc>,
    #[tlv(0x0502, 4, 5, date)]
    pub event_end_time: DateTime<Utc>,
    #[tlv(0x0502, 1, 9, int)]
    pub vehicle_registration_nation: u32,
    #[tlv(0x0502, 14, 10, string)]
    pub vehicle_registration_number: String,
}

impl Repeating for CardEvent {
    const KIND: RecordKind = RecordKind::Events;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CardFault {
    #[tlv(0x0503, 1, 0, int)]
    #[cfg_attr(feature = "serde", serde(rename = "fault_type_id"))]
    pub fault_type: u32,
    #[tlv(0x0503, 4, 1, date)]
    pub fault_begin_time: DateTime<Utc>,
    #[tlv(0x0503, 4, 5, date)]
    pub fault_end_time: DateTime<Utc>,
    #[tlv(0x0503, 1, 9, int)]
    pub vehicle_registration_nation: u32,
    #[tlv(0x0503, 14, 10, string)]
    pub vehicle_registration_number: String,
}

impl Repeating for CardFault {
    const KIND: RecordKind = RecordKind::Faults;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VehicleUsed {
    #[tlv(0x0505, 3, 0, int)]
    pub vehicle_odometer_begin: u32,
    #[tlv(0x0505, 3, 3, int)]
    pub vehicle_odometer_end: u32,
    #[tlv(0x0505, 4, 6, date)]
    pub vehicle_first_use: DateTime<Utc>,
    #[tlv(0x0505, 4, 10, date)]
    pub vehicle_last_use: DateTime<Utc>,
    #[tlv(0x0505, 1, 14, int)]
    pub vehicle_registration_nation: u32,
    #[tlv(0x0505, 14, 15, string)]
    pub vehicle_registration_number: String,
    #[tlv(0x0505, 2, 29, daylicounter)]
    pub vu_data_block_counter: String,
}

impl Repeating for VehicleUsed {
    const KIND: RecordKind = RecordKind::VehiclesUsed;
}

/// Where a daily work period began or ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Place {
    #[tlv(0x0506, 4, 0, date)]
    pub entry_time: DateTime<Utc>,
    #[tlv(0x0506, 1, 4, int)]
    #[cfg_attr(feature = "serde", serde(rename = "type_period_id"))]
    pub entry_type_daily_work_period: u32,
    #[tlv(0x0506, 1, 5, int)]
    pub daily_work_period_country: u32,
    #[tlv(0x0506, 1, 6, int)]
    pub daily_work_period_region: u32,
    #[tlv(0x0506, 3, 7, int)]
    pub vehicle_odometer_value: u32,
}

impl Repeating for Place {
    const KIND: RecordKind = RecordKind::Places;
}

/// The last control the card was subject to.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ControlActivity {
    #[tlv(0x0508, 1, 0, int)]
    #[cfg_attr(feature = "serde", serde(rename = "control_type_id"))]
    pub control_type: u32,
    #[tlv(0x0508, 4, 1, date)]
    pub control_time: DateTime<Utc>,
    #[tlv(0x0508, 1, 5, int)]
    #[cfg_attr(feature = "serde", serde(rename = "card_type_id"))]
    pub control_card_type: u32,
    #[tlv(0x0508, 1, 6, int)]
    #[cfg_attr(feature = "serde", serde(rename = "card_issuing_member_state"))]
    pub control_card_issuing_member_state: u32,
    #[tlv(0x0508, 16, 7, string)]
    pub control_card_number: String,
    #[tlv(0x0508, 1, 23, int)]
    pub vehicle_registration_nation: u32,
    #[tlv(0x0508, 14, 24, string)]
    pub vehicle_registration_number: String,
    #[tlv(0x0508, 4, 38, date)]
    pub control_download_period_begin: DateTime<Utc>,
    #[tlv(0x0508, 4, 42, date)]
    pub control_download_period_end: DateTime<Utc>,
}

impl Repeating for ControlActivity {
    const KIND: RecordKind = RecordKind::ControlActivity;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SpecificCondition {
    #[tlv(0x0522, 4, 0, date)]
    pub entry_time: DateTime<Utc>,
    #[tlv(0x0522, 1, 4, int)]
    pub specific_condition_type_id: u32,
}

impl Repeating for SpecificCondition {
    const KIND: RecordKind = RecordKind::SpecificConditions;
}

/// One day of driver activity.
///
/// [`DailyActivity::changes`] is filled from [`DailyActivity::activities`]
/// as the record is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DailyActivity {
    #[tlv(0x0504, 4, 0, date)]
    pub activity_record_date: DateTime<Utc>,
    #[tlv(0x0504, 2, 4, daylicounter)]
    pub activity_daily_presence_counter: String,
    #[tlv(0x0504, 2, 6, int)]
    pub activity_day_distance: u32,
    /// Raw change units as lowercase hex.
    #[tlv(0x0504, rest, 8, activities)]
    #[cfg_attr(feature = "serde", serde(rename = "activities_s"))]
    pub activities: String,
    #[cfg_attr(feature = "serde", serde(rename = "activity_change_infos"))]
    pub changes: Vec<ActivityChange>,
}

impl DailyActivity {
    /// Decode the change units again, without touching [`Self::changes`].
    pub fn change_units(&self) -> ActivityChanges<'_> {
        ActivityChanges::new(&self.activities, self.activity_record_date)
    }
}

impl Repeating for DailyActivity {
    const KIND: RecordKind = RecordKind::DriverActivity;

    fn complete(&mut self) -> Result<()> {
        self.changes = self.change_units().collect::<Result<_>>()?;
        Ok(())
    }
}
