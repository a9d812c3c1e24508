mod common;

use chrono::{DateTime, TimeDelta, Utc};
use common::{Card, DAY, be, latin, pad, ring_record};
use tachocard::{
    CardDocument, Error, PartialDocument,
    framing::Export,
    layout::CardType,
    schema::Tag,
};

fn day() -> DateTime<Utc> {
    DateTime::from_timestamp(DAY.into(), 0).unwrap()
}

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[test]
fn decode_driver_card() {
    let doc = CardDocument::decode(&Card::driver().export()).unwrap();

    let card = &doc.card;
    assert_eq!(card.ic_serial_number, "deadbeef");
    assert_eq!(card.ic_manufacturing_references, "0102");
    assert_eq!(card.card_extended_serial_number, "SN00001");
    assert_eq!(card.card_approval_number, "APPR001");
    assert_eq!(card.card_personaliser_id, 42);
    assert_eq!(card.embedder_ic_assembler_id, "EMBD");
    assert_eq!(card.ic_identifier, 0x0102);
    assert_eq!(card.card_issuing_member_state, 0x11);
    assert_eq!(card.card_number, "RUD0000000001000");
    assert_eq!(card.card_issuing_authority_name, "Authority");
    assert_eq!(card.card_issue_date, day());
    assert!(card.card_expiry_date > card.card_validity_begin);
    assert_eq!(card.last_card_download, day());
    assert_eq!(card.type_of_tachograph_card_id, 1);
    assert_eq!(card.card_structure_version, "0001");
    assert_eq!(card.card_certificate_estr.as_deref(), Some("ab".repeat(194).as_str()));
    assert!(card.ca_certificate_estr.is_some());
    assert_eq!(card.card_certificate_gost, None);
    assert_eq!(card.ca_certificate_gost, None);

    assert_eq!(doc.driver.card_holder_surname, "Muller");
    assert_eq!(doc.driver.card_holder_first_names, "Иван");
    assert_eq!(doc.driver.card_holder_birth_date, utc("1985-03-21T00:00:00Z"));
    assert_eq!(doc.driver.card_holder_preferred_language, "ru");

    assert_eq!(doc.driving_licence.driving_licence_issuing_authority, "GIBDD");
    assert_eq!(doc.driving_licence.driving_licence_issuing_nation, 0x11);
    assert_eq!(doc.driving_licence.driving_licence_number, "77AB123456");

    assert_eq!(doc.session_open.session_open_time, day());
    assert_eq!(doc.session_open.vehicle_registration_number, "A123BC77");
}

#[test]
fn decode_driver_card_history() {
    let doc = CardDocument::decode(&Card::driver().export()).unwrap();

    assert_eq!(doc.events.len(), 1);
    assert_eq!(doc.events[0].event_type, 5);
    assert_eq!(doc.events[0].event_end_time, day() + TimeDelta::seconds(60));

    assert_eq!(doc.faults.len(), 1);
    assert_eq!(doc.faults[0].fault_type, 1);

    assert_eq!(doc.vehicles_used.len(), 1);
    let vehicle = &doc.vehicles_used[0];
    assert_eq!(vehicle.vehicle_odometer_begin, 1000);
    assert_eq!(vehicle.vehicle_odometer_end, 1200);
    assert_eq!(vehicle.vu_data_block_counter, "05");

    assert_eq!(doc.places.len(), 1);
    assert_eq!(doc.places[0].daily_work_period_country, 0x11);
    assert_eq!(doc.places[0].vehicle_odometer_value, 1000);

    assert!(doc.control_activity.is_empty());

    assert_eq!(doc.specific_conditions.len(), 1);
    assert_eq!(doc.specific_conditions[0].specific_condition_type_id, 1);

    let days = &doc.driver_activity;
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].activity_record_date, day());
    assert_eq!(days[0].activity_daily_presence_counter, "01");
    assert_eq!(days[0].activity_day_distance, 100);
    assert_eq!(days[0].activities, "b0051900");

    let changes = &days[0].changes;
    assert_eq!(changes.len(), 2);
    assert_eq!(
        (changes[0].reader_slot, changes[0].driving_status, changes[0].card_status),
        (1, 0, 1)
    );
    assert_eq!((changes[0].activity, changes[0].minutes), (2, 5));
    assert_eq!(changes[0].time, day() + TimeDelta::minutes(5));
    assert_eq!((changes[1].activity, changes[1].minutes), (3, 256));

    assert_eq!(days[1].activity_record_date, day() + TimeDelta::days(1));
    assert_eq!(days[1].changes.len(), 1);
    assert_eq!(days[1].changes[0].time, days[1].activity_record_date);
}

#[test]
fn decode_is_deterministic() {
    let export = Card::driver().export();
    assert_eq!(
        CardDocument::decode(&export).unwrap(),
        CardDocument::decode(&export).unwrap()
    );
}

#[test]
fn unknown_tags_are_ignored() {
    let plain = CardDocument::decode(&Card::driver().export()).unwrap();
    let extra = Card::driver().set(0x9999, vec![1, 2, 3]).export();
    assert_eq!(CardDocument::decode(&extra).unwrap(), plain);
}

#[test]
fn repeated_tag_keeps_last() {
    let mut export = Card::driver().export();
    let usage = [&be(DAY, 4)[..], &[0x11], &latin("X999XX99", 14)].concat();
    let mut tail = Export::new();
    tail.file(Tag::new(0x0507), &usage).unwrap();
    export.extend(tail.finish());

    let doc = CardDocument::decode(&export).unwrap();
    assert_eq!(doc.session_open.vehicle_registration_number, "X999XX99");
}

#[test]
fn missing_required_section() {
    let export = Card::driver().remove(0x0521).export();

    let err = CardDocument::decode(&export).unwrap_err();
    assert!(matches!(
        err,
        Error::Section {
            section: "driving_licence",
            ..
        }
    ));
    assert!(matches!(
        err.root(),
        Error::MissingSection { tag, .. } if *tag == Tag::new(0x0521)
    ));
}

#[test]
fn missing_optional_sections() {
    let export = Card::driver()
        .remove(0x050E)
        .remove(0xC100)
        .remove(0xC108)
        .export();

    let doc = CardDocument::decode(&export).unwrap();
    assert_eq!(doc.card.last_card_download, DateTime::<Utc>::default());
    assert_eq!(doc.card.card_certificate_estr, None);
}

#[test]
fn partial_document_keeps_intact_groups() {
    let export = Card::driver()
        .remove(0x0502)
        .set(0x0503, vec![0; 30])
        .export();

    let partial = PartialDocument::decode(&export).unwrap();
    assert!(!partial.is_complete());
    assert_eq!(partial.errors().count(), 2);

    assert!(matches!(
        partial.events.as_ref().unwrap_err().root(),
        Error::MissingSection { .. }
    ));
    assert!(matches!(
        partial.faults.as_ref().unwrap_err().root(),
        Error::Truncated { .. }
    ));
    assert_eq!(partial.driver.as_ref().unwrap().card_holder_surname, "Muller");
    assert_eq!(partial.driver_activity.as_ref().unwrap().len(), 2);

    assert!(matches!(
        partial.into_document(),
        Err(Error::Section {
            section: "events",
            ..
        })
    ));
}

#[test]
fn broken_framing_is_fatal() {
    let export = Card::driver().export();
    let cut = &export[..export.len() - 10];

    assert!(matches!(
        PartialDocument::decode(cut),
        Err(Error::Section { section: "tags", .. })
    ));
    assert!(matches!(
        CardDocument::decode(cut).map_err(|e| e.root().to_string()),
        Err(msg) if msg.starts_with("Truncated")
    ));
}

#[test]
fn export_file_name_names_the_view() {
    let at = utc("2024-03-05T14:07:00Z");

    let doc = CardDocument::decode(&Card::driver().export()).unwrap();
    assert_eq!(
        doc.export_file_name(at),
        "ESTR-RUD0000000001000-20240305_1407.ddd"
    );

    let gost = Card::driver().set(0xC200, vec![0x77; 1000]).export();
    let doc = CardDocument::decode(&gost).unwrap();
    assert_eq!(
        doc.export_file_name(at),
        "RFSKZI-RUD0000000001000-20240305_1407.ddd"
    );
}

#[test]
fn geometry_matches_file_sizes() {
    let card = Card::driver();
    let doc = CardDocument::decode(&card.export()).unwrap();
    let geometry = doc.geometry().unwrap();
    assert_eq!(geometry.card_type(), CardType::Driver);

    for file in CardType::Driver.files() {
        let tag = file.tag.id();
        if [0x0502, 0x0503, 0x0504, 0x0505, 0x0506, 0x0507, 0x0520].contains(&tag) {
            assert_eq!(
                geometry.file_size(file),
                Some(card.value(tag).len()),
                "{}",
                file.name
            );
        }
    }
}

/// A daily record of `n` days after [`DAY`] with a single change unit.
fn activity_day(n: u32) -> Vec<u8> {
    [
        &be(DAY + n * 86_400, 4)[..],
        &[0x00, n as u8 + 1],
        &be(0, 2),
        &[0xB0, 0x05],
    ]
    .concat()
}

#[test]
fn wrapped_activity_ring_keeps_day_order() {
    let [first, second, third, fourth] = [0, 1, 2, 3].map(activity_day);
    let r1 = ring_record(0, &first);
    let r2 = ring_record(14, &second);
    let r3 = ring_record(14, &third);
    let r4 = ring_record(14, &fourth);

    // The second record runs past the end of the area and continues at its
    // start; the newest record sits below the oldest.
    let area = [&r2[10..], &r3, &r4, &[0; 8], &r1, &r2[..10]].concat();
    assert_eq!(area.len(), 64);
    let ring = [&be(40, 2)[..], &be(18, 2), &area].concat();

    let export = Card::driver().set(0x0504, ring).export();
    let doc = CardDocument::decode(&export).unwrap();

    let dates: Vec<_> = doc
        .driver_activity
        .iter()
        .map(|d| d.activity_record_date)
        .collect();
    let expected: Vec<_> = (0..4).map(|n| day() + TimeDelta::days(n)).collect();
    assert_eq!(dates, expected);

    let counters: Vec<_> = doc
        .driver_activity
        .iter()
        .map(|d| d.activity_daily_presence_counter.as_str())
        .collect();
    assert_eq!(counters, ["01", "02", "03", "04"]);
    assert!(doc.driver_activity.iter().all(|d| d.changes.len() == 1));
}

#[test]
fn odd_change_string_fails_only_its_group() {
    // A single byte of change data is half a unit.
    let payload = [&activity_day(0)[..8], &[0xB0]].concat();
    let ring = [&be(0, 2)[..], &be(0, 2), &pad(&ring_record(0, &payload), 64)].concat();

    let export = Card::driver().set(0x0504, ring).export();
    let partial = PartialDocument::decode(&export).unwrap();

    let err = partial.driver_activity.as_ref().unwrap_err();
    assert!(matches!(
        err,
        Error::Section {
            section: "driver_activity",
            ..
        }
    ));
    assert!(matches!(err.root(), Error::MalformedBitfield(unit) if unit == "b0"));

    assert_eq!(partial.errors().count(), 1);
    assert_eq!(partial.events.as_ref().unwrap().len(), 1);
    assert_eq!(partial.places.as_ref().unwrap().len(), 1);
    assert_eq!(partial.driver.as_ref().unwrap().card_holder_surname, "Muller");

    assert!(matches!(
        CardDocument::decode(&export),
        Err(Error::Section {
            section: "driver_activity",
            ..
        })
    ));
}

#[cfg(feature = "serde")]
#[test]
fn serializes_with_stable_names() {
    let control = [
        &[0x02][..],
        &be(DAY, 4),
        &[0x01, 0x11],
        &latin("C12", 16),
        &[0x11],
        &latin("A123BC77", 14),
        &be(DAY, 4),
        &be(DAY + 86_400, 4),
    ]
    .concat();
    let export = Card::driver().set(0x0508, control).export();
    let doc = CardDocument::decode(&export).unwrap();
    let json = serde_json::to_value(&doc).unwrap();

    let card = &json["card"];
    assert!(card.get("card_certificate_gost").is_none());
    assert!(card.get("ca_certificate_gost").is_none());
    assert!(card["card_certificate_estr"].is_string());
    assert_eq!(card["card_number"], "RUD0000000001000");
    assert_eq!(card["card_personalizer_id"], 42);
    assert_eq!(card["embedderic_assembler_id"], "EMBD");

    let driver = &json["driver"];
    assert_eq!(driver["holder_surname"], "Muller");
    assert_eq!(driver["holder_first_names"], "Иван");
    assert_eq!(driver["card_holder_birth_date"], "1985-03-21T00:00:00Z");

    assert_eq!(json["events"][0]["event_type_id"], 5);
    assert_eq!(json["faults"][0]["fault_type_id"], 1);
    assert_eq!(json["places"][0]["type_period_id"], 1);
    assert_eq!(json["vehicles_used"][0]["vu_data_block_counter"], "05");
    assert_eq!(json["specific_conditions"][0]["specific_condition_type_id"], 1);

    let control = &json["control_activity"][0];
    assert_eq!(control["control_type_id"], 2);
    assert_eq!(control["card_type_id"], 1);
    assert_eq!(control["card_issuing_member_state"], 0x11);
    assert_eq!(control["control_card_number"], "C12");

    let day = &json["driver_activity"][0];
    assert_eq!(day["activities_s"], "b0051900");

    let change = &day["activity_change_infos"][0];
    assert_eq!(change["tachograph_card_reader_id"], 1);
    assert_eq!(change["activity_kind_id"], 2);
    assert_eq!(change["activity_change_info_t"], 5);
    assert_eq!(change["calculated_time"], "2020-09-13T12:31:40Z");
}
