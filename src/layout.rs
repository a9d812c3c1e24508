//! File layout of tachograph cards.
//!
//! Each card type exposes a fixed list of elementary files. Most have a fixed
//! size; the cyclic ones are sized from counts stored in the card's
//! application identification file, so reading a card starts by building a
//! [`CardGeometry`] from that file and consulting it for every other file.

use std::collections::BTreeMap;

use crate::{
    error::{Error, Result, window},
    records::ApplicationIdentification,
    schema::Tag,
    value::decode_int,
};

/// Kind of tachograph card, as stored in the first byte of the application
/// identification file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardType {
    Driver,
    Workshop,
    Control,
    Company,
}

impl TryFrom<u8> for CardType {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        Ok(match id {
            0x01 => Self::Driver,
            0x02 => Self::Workshop,
            0x03 => Self::Control,
            0x04 => Self::Company,
            _ => Err(Error::UnsupportedType(format!("card type {id:#04x}")))?,
        })
    }
}

impl CardType {
    /// Files of the tachograph application, in download order.
    pub const fn files(self) -> &'static [CardFile] {
        match self {
            Self::Driver => DRIVER_FILES,
            Self::Workshop => WORKSHOP_FILES,
            Self::Control => CONTROL_FILES,
            Self::Company => COMPANY_FILES,
        }
    }

    /// Length of the application identification file.
    pub const fn application_length(self) -> usize {
        match self {
            Self::Driver => 10,
            Self::Workshop => 11,
            Self::Control | Self::Company => 5,
        }
    }
}

/// An elementary file of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardFile {
    pub name: &'static str,
    pub tag: Tag,
    pub min_len: usize,
    pub max_len: usize,
    /// Whether the download carries a signature block after the file.
    pub signed: bool,
}

const fn file(name: &'static str, tag: u16, min_len: usize, max_len: usize, signed: bool) -> CardFile {
    CardFile {
        name,
        tag: Tag::new(tag),
        min_len,
        max_len,
        signed,
    }
}

/// Files of the master file, common to every card type.
pub const MASTER_FILES: &[CardFile] = &[
    file("EF_ICC", 0x0002, 25, 25, false),
    file("EF_IC", 0x0005, 8, 8, false),
];

const DRIVER_FILES: &[CardFile] = &[
    file("EF_Application_Identification", 0x0501, 10, 10, true),
    file("EF_Card_Certificate_GOST", 0xC200, 1000, 1000, false),
    file("EF_Key_Identificators", 0xC201, 16, 16, true),
    file("EF_CA_Certificate_GOST", 0xC208, 1000, 1000, false),
    file("EF_Identification", 0x0520, 143, 143, true),
    file("EF_Card_Download", 0x050E, 4, 4, true),
    file("EF_Driver_Licence_Info", 0x0521, 53, 53, true),
    file("EF_Events_Data", 0x0502, 864, 1728, true),
    file("EF_Faults_Data", 0x0503, 576, 1152, true),
    file("EF_Driver_Activity_Data", 0x0504, 5548, 13780, true),
    file("EF_Vehicles_Used", 0x0505, 2606, 6202, true),
    file("EF_Places", 0x0506, 841, 1121, true),
    file("EF_Current_Usage", 0x0507, 19, 19, true),
    file("EF_Control_Activity_Data", 0x0508, 46, 46, true),
    file("EF_Specific_Conditions", 0x0522, 280, 280, true),
];

const WORKSHOP_FILES: &[CardFile] = &[
    file("EF_Application_Identification", 0x0501, 11, 11, true),
    file("EF_Card_Certificate_GOST", 0xC200, 1000, 1000, false),
    file("EF_Key_Identificators", 0xC201, 16, 16, true),
    file("EF_Temporary_Cert", 0xC203, 1024, 1024, true),
    file("EF_Cert_Request", 0xC204, 1024, 1024, true),
    file("EF_VU_Cert", 0xC205, 2048, 2048, true),
    file("EF_Archive_Request", 0xC206, 14, 14, true),
    file("EF_VU_Cert_Request", 0xC207, 1024, 1024, true),
    file("EF_CA_Certificate_GOST", 0xC208, 1000, 1000, false),
    file("EF_Identification", 0x0520, 211, 211, true),
    file("EF_Card_Download", 0x0509, 2, 2, true),
    file("EF_Calibration", 0x050A, 9243, 26778, true),
    file("EF_Sensor_Installation_Data", 0x050B, 16, 16, true),
    file("EF_Events_Data", 0x0502, 432, 432, true),
    file("EF_Faults_Data", 0x0503, 288, 288, true),
    file("EF_Driver_Activity_Data", 0x0504, 202, 496, true),
    file("EF_Vehicles_Used", 0x0505, 126, 250, true),
    file("EF_Places", 0x0506, 61, 81, true),
    file("EF_Current_Usage", 0x0507, 19, 19, true),
    file("EF_Control_Activity_Data", 0x0508, 46, 46, true),
    file("EF_Specific_Conditions", 0x0522, 10, 10, true),
];

const CONTROL_FILES: &[CardFile] = &[
    file("EF_Application_Identification", 0x0501, 5, 5, true),
    file("EF_Card_Certificate_GOST", 0xC200, 1000, 1000, false),
    file("EF_Key_Identificators", 0xC201, 16, 16, true),
    file("EF_CA_Certificate_GOST", 0xC208, 1000, 1000, false),
    file("EF_Identification", 0x0520, 211, 211, true),
    file("EF_Controller_Activity_Data", 0x050C, 10582, 23922, true),
    file("EF_Archive_Requests", 0xC206, 14, 14, true),
];

const COMPANY_FILES: &[CardFile] = &[
    file("EF_Application_Identification", 0x0501, 5, 5, true),
    file("EF_Card_Certificate_GOST", 0xC200, 1000, 1000, false),
    file("EF_Key_Identificators", 0xC201, 16, 16, true),
    file("EF_CA_Certificate_GOST", 0xC208, 1000, 1000, false),
    file("EF_Identification", 0x0520, 211, 211, true),
    file("EF_Company_Activity_Data", 0x050C, 10582, 23922, true),
    file("EF_Archive_Requests", 0xC206, 14, 14, true),
];

/// Sizes of the variable-length files of one particular card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardGeometry {
    card_type: CardType,
    sizes: BTreeMap<Tag, usize>,
}

impl CardGeometry {
    /// Derive file sizes from the raw application identification file.
    pub fn new(application: &[u8]) -> Result<Self> {
        let &[id, ..] = application else {
            Err(Error::Truncated {
                offset: 0,
                needed: 1,
                available: 0,
            })?
        };
        let card_type = CardType::try_from(id)?;
        let r = window(application, 0, card_type.application_length())?;

        let count = |offset: usize, width: usize| -> Result<usize> {
            Ok(decode_int(window(r, offset, width)?)? as usize)
        };

        let sizes = match card_type {
            CardType::Driver | CardType::Workshop => {
                let mut sizes = history_sizes(
                    count(3, 1)?,
                    count(4, 1)?,
                    count(5, 2)?,
                    count(7, 2)?,
                    count(9, 1)?,
                );
                if card_type == CardType::Workshop {
                    sizes.insert(Tag::new(0x050A), count(10, 1)? * 105 + 3);
                }
                sizes
            }
            CardType::Control | CardType::Company => {
                BTreeMap::from([(Tag::new(0x050C), count(3, 2)? * 46 + 2)])
            }
        };

        Ok(Self { card_type, sizes })
    }

    /// Derive file sizes from a decoded driver or workshop application
    /// identification.
    ///
    /// The decoded shape carries no calibration count, so a workshop
    /// geometry built here leaves the calibration file unsized.
    pub fn from_application(application: &ApplicationIdentification) -> Result<Self> {
        let id = application.type_of_tachograph_card_id;
        let card_type = u8::try_from(id)
            .map_err(|_| Error::UnsupportedType(format!("card type {id:#x}")))
            .and_then(CardType::try_from)?;

        if !matches!(card_type, CardType::Driver | CardType::Workshop) {
            Err(Error::UnsupportedType(format!("{card_type:?} card history counts")))?;
        }

        let sizes = history_sizes(
            application.no_of_events_per_type as usize,
            application.no_of_faults_per_type as usize,
            application.activity_structure_length as usize,
            application.no_of_card_vehicle_records as usize,
            application.no_of_card_place_records as usize,
        );

        Ok(Self { card_type, sizes })
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    /// Number of bytes to read for a file, if known.
    ///
    /// Fixed-size files report their size directly; variable-size ones report
    /// the size derived from the application identification file.
    pub fn file_size(&self, file: &CardFile) -> Option<usize> {
        if file.min_len == file.max_len {
            Some(file.min_len)
        } else {
            self.sizes.get(&file.tag).copied()
        }
    }
}

/// Sizes of the cyclic files shared by driver and workshop cards.
fn history_sizes(
    events: usize,
    faults: usize,
    activity: usize,
    vehicles: usize,
    places: usize,
) -> BTreeMap<Tag, usize> {
    BTreeMap::from([
        (Tag::new(0x0502), events * 24 * 6),
        (Tag::new(0x0503), faults * 24 * 2),
        (Tag::new(0x0504), activity + 4),
        (Tag::new(0x0505), vehicles * 31 + 2),
        (Tag::new(0x0506), places * 10 + 1),
    ])
}
