use chrono::{DateTime, Utc};
use log::{debug, warn};
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    error::{Error, Result},
    framing::RawTagMap,
    layout::CardGeometry,
    records::{
        ApplicationIdentification, CardEvent, CardFault, CardInfo, ControlActivity,
        DailyActivity, Driver, DrivingLicence, Place, Repeating, SessionOpen, SpecificCondition,
        VehicleUsed, load_group,
    },
    schema::{FromFields, TagSource, load},
};

/// A fully decoded driver card export.
///
/// Groups serialize under their snake_case names. Certificates absent from
/// the export are omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CardDocument {
    pub card: CardInfo,
    pub application: ApplicationIdentification,
    pub session_open: SessionOpen,
    pub driver: Driver,
    pub driving_licence: DrivingLicence,
    pub events: Vec<CardEvent>,
    pub faults: Vec<CardFault>,
    pub vehicles_used: Vec<VehicleUsed>,
    pub places: Vec<Place>,
    pub control_activity: Vec<ControlActivity>,
    pub specific_conditions: Vec<SpecificCondition>,
    pub driver_activity: Vec<DailyActivity>,
}

impl CardDocument {
    /// Decode a card export, failing on the first group that does not decode.
    pub fn decode(r: &[u8]) -> Result<Self> {
        PartialDocument::decode(r)?.into_document()
    }

    /// Name under which the export is archived:
    /// `<view>-<card number>-<YYYYMMDD>_<HHMM>.ddd`.
    ///
    /// The view is `RFSKZI` for cards carrying a GOST certificate and `ESTR`
    /// otherwise.
    pub fn export_file_name(&self, at: DateTime<Utc>) -> String {
        let view = if self.card.card_certificate_gost.is_some() {
            "RFSKZI"
        } else {
            "ESTR"
        };
        format!(
            "{view}-{}-{}.ddd",
            self.card.card_number,
            at.format("%Y%m%d_%H%M")
        )
    }

    /// Sizes of the card's cyclic files, as declared by its application
    /// identification.
    pub fn geometry(&self) -> Result<CardGeometry> {
        CardGeometry::from_application(&self.application)
    }
}

/// A card export decoded group by group.
///
/// Each group succeeds or fails on its own, so a card with one damaged file
/// still yields the rest.
#[derive(Debug)]
pub struct PartialDocument {
    pub card: Result<CardInfo>,
    pub application: Result<ApplicationIdentification>,
    pub session_open: Result<SessionOpen>,
    pub driver: Result<Driver>,
    pub driving_licence: Result<DrivingLicence>,
    pub events: Result<Vec<CardEvent>>,
    pub faults: Result<Vec<CardFault>>,
    pub vehicles_used: Result<Vec<VehicleUsed>>,
    pub places: Result<Vec<Place>>,
    pub control_activity: Result<Vec<ControlActivity>>,
    pub specific_conditions: Result<Vec<SpecificCondition>>,
    pub driver_activity: Result<Vec<DailyActivity>>,
}

impl PartialDocument {
    /// Decode every group of a card export.
    ///
    /// Only a failure to split the export into tags is returned here.
    pub fn decode(r: &[u8]) -> Result<Self> {
        let map = RawTagMap::extract(r).map_err(|e| e.in_section("tags"))?;
        debug!("Extracted {} tags from {} bytes.", map.len(), r.len());

        let document = Self::from_tags(&map);
        for err in document.errors() {
            warn!("{err}");
        }

        Ok(document)
    }

    /// Decode every group from already extracted tags.
    pub fn from_tags(source: &impl TagSource) -> Self {
        Self {
            card: single(source, "card"),
            application: single(source, "application"),
            session_open: single(source, "session_open"),
            driver: single(source, "driver"),
            driving_licence: single(source, "driving_licence"),
            events: group(source),
            faults: group(source),
            vehicles_used: group(source),
            places: group(source),
            control_activity: group(source),
            specific_conditions: group(source),
            driver_activity: group(source),
        }
    }

    /// Errors of the groups that failed, in document order.
    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        [
            self.card.as_ref().err(),
            self.application.as_ref().err(),
            self.session_open.as_ref().err(),
            self.driver.as_ref().err(),
            self.driving_licence.as_ref().err(),
            self.events.as_ref().err(),
            self.faults.as_ref().err(),
            self.vehicles_used.as_ref().err(),
            self.places.as_ref().err(),
            self.control_activity.as_ref().err(),
            self.specific_conditions.as_ref().err(),
            self.driver_activity.as_ref().err(),
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Assemble the full document, or return the first group error.
    pub fn into_document(self) -> Result<CardDocument> {
        Ok(CardDocument {
            card: self.card?,
            application: self.application?,
            session_open: self.session_open?,
            driver: self.driver?,
            driving_licence: self.driving_licence?,
            events: self.events?,
            faults: self.faults?,
            vehicles_used: self.vehicles_used?,
            places: self.places?,
            control_activity: self.control_activity?,
            specific_conditions: self.specific_conditions?,
            driver_activity: self.driver_activity?,
        })
    }
}

fn single<T: FromFields>(source: &impl TagSource, section: &'static str) -> Result<T> {
    load(source).map_err(|e| e.in_section(section))
}

fn group<R: Repeating>(source: &impl TagSource) -> Result<Vec<R>> {
    load_group(source).map_err(|e| e.in_section(R::KIND.name()))
}
