#![allow(dead_code)]

use tachocard::{
    framing::{Export, header::SignatureScheme},
    schema::Tag,
};

/// 2020-09-13T12:26:40Z
pub const DAY: u32 = 0x5F5E_1000;

/// Big-endian integer in the low `width` bytes.
pub fn be(n: u32, width: usize) -> Vec<u8> {
    n.to_be_bytes()[4 - width..].to_vec()
}

/// Bytes padded with NUL to `width`.
pub fn pad(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut v = bytes.to_vec();
    v.resize(width, 0);
    v
}

/// Latin-1 text behind its code page marker.
pub fn latin(s: &str, width: usize) -> Vec<u8> {
    pad(&[&[0x01], s.as_bytes()].concat(), width)
}

/// Frame a ring record behind its previous and current lengths.
pub fn ring_record(previous: usize, payload: &[u8]) -> Vec<u8> {
    [&be(previous as u32, 2)[..], &be(payload.len() as u32 + 4, 2), payload].concat()
}

/// Files of a synthetic driver card, in download order.
#[derive(Debug, Clone)]
pub struct Card {
    files: Vec<(Tag, Vec<u8>)>,
}

impl Card {
    /// A driver card with one event, one fault, two days of activity, one
    /// vehicle, one place and one specific condition. Its ESTR certificate
    /// is present; its GOST certificates are not.
    pub fn driver() -> Self {
        let icc = [
            &[0x00][..],
            &latin("SN00001", 8),
            &latin("APPR001", 8),
            &[0x2A],
            &latin("EMBD", 5),
            &[0x01, 0x02],
        ]
        .concat();

        let ic = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x00, 0x00];

        // 1 event and 1 fault per type, 64 activity bytes, 2 vehicles, 2
        // places.
        let application = vec![0x01, 0x00, 0x01, 1, 1, 0x00, 0x40, 0x00, 0x02, 2];

        let identification = [
            &[0x11][..],
            b"RUD0000000001000",
            &latin("Authority", 36),
            &be(DAY, 4),
            &be(DAY, 4),
            &be(DAY + 157_680_000, 4),
            &latin("Muller", 36),
            &pad(&[0x05, 0xB8, 0xD2, 0xD0, 0xDD], 36), // Иван
            &[0x19, 0x85, 0x03, 0x21],
            b"ru",
        ]
        .concat();

        let licence = [&latin("GIBDD", 36)[..], &[0x11], &latin("77AB123456", 16)].concat();

        let usage = [&be(DAY, 4)[..], &[0x11], &latin("A123BC77", 14)].concat();

        let event = [
            &[0x05][..],
            &be(DAY, 4),
            &be(DAY + 60, 4),
            &[0x11],
            &latin("A123BC77", 14),
        ]
        .concat();
        let events = [event, vec![0; 24 * 5]].concat();

        let fault = [
            &[0x01][..],
            &be(DAY, 4),
            &be(DAY + 3600, 4),
            &[0x11],
            &latin("A123BC77", 14),
        ]
        .concat();
        let faults = [vec![0; 24], fault].concat();

        let first_day = [
            &be(DAY, 4)[..],
            &[0x00, 0x01],
            &be(100, 2),
            &[0xB0, 0x05, 0x19, 0x00],
        ]
        .concat();
        let second_day = [&be(DAY + 86_400, 4)[..], &[0x00, 0x02], &be(0, 2), &[0x00, 0x00]].concat();
        let area = [
            ring_record(0, &first_day),
            ring_record(16, &second_day),
        ]
        .concat();
        let activity = [&be(0, 2)[..], &be(16, 2), &pad(&area, 64)].concat();

        let vehicle = [
            &be(1000, 3)[..],
            &be(1200, 3),
            &be(DAY, 4),
            &be(DAY + 3600, 4),
            &[0x11],
            &latin("A123BC77", 14),
            &[0x00, 0x05],
        ]
        .concat();
        let vehicles = [&[0x00, 0x01][..], &vehicle, &[0; 31]].concat();

        let place = [&be(DAY, 4)[..], &[0x01, 0x11, 0x00], &be(1000, 3)].concat();
        let places = [&[0x01][..], &place, &[0; 10]].concat();

        let conditions = [&be(DAY, 4)[..], &[0x01], &[0; 5 * 55]].concat();

        let files = vec![
            (0x0002, icc),
            (0x0005, ic),
            (0x0501, application),
            (0xC100, vec![0xAB; 194]),
            (0xC108, vec![0xCD; 194]),
            (0x0520, identification),
            (0x050E, be(DAY, 4)),
            (0x0521, licence),
            (0x0502, events),
            (0x0503, faults),
            (0x0504, activity),
            (0x0505, vehicles),
            (0x0506, places),
            (0x0507, usage),
            (0x0508, vec![0; 46]),
            (0x0522, conditions),
        ];

        Self {
            files: files
                .into_iter()
                .map(|(tag, value)| (Tag::new(tag), value))
                .collect(),
        }
    }

    /// Replace the value of a file, or append it.
    pub fn set(mut self, tag: u16, value: Vec<u8>) -> Self {
        let tag = Tag::new(tag);
        match self.files.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, v)) => *v = value,
            None => self.files.push((tag, value)),
        }
        self
    }

    pub fn remove(mut self, tag: u16) -> Self {
        self.files.retain(|(t, _)| *t != Tag::new(tag));
        self
    }

    pub fn value(&self, tag: u16) -> &[u8] {
        let (_, value) = self
            .files
            .iter()
            .find(|(t, _)| *t == Tag::new(tag))
            .unwrap();
        value
    }

    /// Frame every file, each followed by a GOST signature.
    pub fn export(&self) -> Vec<u8> {
        let mut export = Export::new();
        for (tag, value) in &self.files {
            export
                .file(*tag, value)
                .unwrap()
                .signature(*tag, SignatureScheme::Gost, &[0x5A; 64])
                .unwrap();
        }
        export.finish()
    }
}
