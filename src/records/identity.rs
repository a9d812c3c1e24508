//! Shapes read once per card: chip, card, holder and current session.

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::schema::FromFields;

/// Chip and card identification, with the card's certificates.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CardInfo {
    #[tlv(0x0005, 4, 0, hexadecimal)]
    pub ic_serial_number: String,
    #[tlv(0x0005, 4, 4, hexadecimal)]
    pub ic_manufacturing_references: String,
    #[tlv(0x0002, 8, 1, string)]
    pub card_extended_serial_number: String,
    #[tlv(0x0002, 8, 9, string)]
    pub card_approval_number: String,
    #[tlv(0x0002, 1, 17, int)]
    #[cfg_attr(feature = "serde", serde(rename = "card_personalizer_id"))]
    pub card_personaliser_id: u32,
    #[tlv(0x0002, 5, 18, string)]
    #[cfg_attr(feature = "serde", serde(rename = "embedderic_assembler_id"))]
    pub embedder_ic_assembler_id: String,
    #[tlv(0x0002, 2, 23, int)]
    pub ic_identifier: u32,
    #[tlv(0x0520, 1, 0, int)]
    pub card_issuing_member_state: u32,
    #[tlv(0x0520, 16, 1, string)]
    pub card_number: String,
    #[tlv(0x0520, 36, 17, string)]
    pub card_issuing_authority_name: String,
    #[tlv(0x0520, 4, 53, date)]
    pub card_issue_date: DateTime<Utc>,
    #[tlv(0x0520, 4, 57, date)]
    pub card_validity_begin: DateTime<Utc>,
    #[tlv(0x0520, 4, 61, date)]
    pub card_expiry_date: DateTime<Utc>,
    #[tlv(0x050E, 4, 0, date, optional)]
    pub last_card_download: DateTime<Utc>,
    #[tlv(0x0501, 1, 0, int)]
    pub type_of_tachograph_card_id: u32,
    #[tlv(0x0501, 2, 1, hexadecimal)]
    pub card_structure_version: String,
    #[tlv(0xC200, 1000, 0, hexadecimal, optional)]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub card_certificate_gost: Option<String>,
    #[tlv(0xC208, 1000, 0, hexadecimal, optional)]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub ca_certificate_gost: Option<String>,
    #[tlv(0xC100, 194, 0, hexadecimal, optional)]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub card_certificate_estr: Option<String>,
    #[tlv(0xC108, 194, 0, hexadecimal, optional)]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub ca_certificate_estr: Option<String>,
}

/// Counts sizing the cyclic files of a driver or workshop card.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ApplicationIdentification {
    #[tlv(0x0501, 1, 0, int)]
    pub type_of_tachograph_card_id: u32,
    #[tlv(0x0501, 2, 1, hexadecimal)]
    pub card_structure_version: String,
    #[tlv(0x0501, 1, 3, int)]
    pub no_of_events_per_type: u32,
    #[tlv(0x0501, 1, 4, int)]
    pub no_of_faults_per_type: u32,
    #[tlv(0x0501, 2, 5, int)]
    pub activity_structure_length: u32,
    #[tlv(0x0501, 2, 7, int)]
    pub no_of_card_vehicle_records: u32,
    #[tlv(0x0501, 1, 9, int)]
    pub no_of_card_place_records: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Driver {
    #[tlv(0x0520, 36, 65, string)]
    #[cfg_attr(feature = "serde", serde(rename = "holder_surname"))]
    pub card_holder_surname: String,
    #[tlv(0x0520, 36, 101, string)]
    #[cfg_attr(feature = "serde", serde(rename = "holder_first_names"))]
    pub card_holder_first_names: String,
    #[tlv(0x0520, 4, 137, birthday)]
    pub card_holder_birth_date: DateTime<Utc>,
    #[tlv(0x0520, 2, 141, string)]
    pub card_holder_preferred_language: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DrivingLicence {
    #[tlv(0x0521, 36, 0, string)]
    pub driving_licence_issuing_authority: String,
    #[tlv(0x0521, 1, 36, int)]
    pub driving_licence_issuing_nation: u32,
    #[tlv(0x0521, 16, 37, string)]
    pub driving_licence_number: String,
}

/// The vehicle the card was last inserted in.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromFields)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SessionOpen {
    #[tlv(0x0507, 4, 0, date)]
    pub session_open_time: DateTime<Utc>,
    #[tlv(0x0507, 1, 4, int)]
    pub vehicle_registration_nation: u32,
    #[tlv(0x0507, 14, 5, string)]
    pub vehicle_registration_number: String,
}
