//! A decoder for tachograph driver card exports (`.ddd` files).
//!
//! A card export is a flat run of tagged blocks, one per elementary file of
//! the card, each optionally followed by its signature. Decoding happens in
//! layers:
//!
//! - [`framing`] splits the export into a map of file tags to raw values.
//! - [`schema`] and [`value`] turn tagged bytes into typed record fields,
//!   driven by static field tables generated with the
//!   [`FromFields`](macro@schema::FromFields) derive macro.
//! - [`cyclic`] cuts the card's ring files into individual records, and
//!   [`activity`] unpacks the activity changes of each day.
//! - [`CardDocument`] assembles all of it.
//!
//! Most users need only [`CardDocument::decode`], or [`PartialDocument`]
//! when damaged files should not prevent reading the rest of a card.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `serde`: derive `Serialize` for documents and records (default).

extern crate self as tachocard;

pub mod activity;
pub mod cyclic;
mod document;
mod error;
pub mod framing;
pub mod layout;
pub mod records;
pub mod schema;
pub mod value;

pub use document::{CardDocument, PartialDocument};
pub use error::{Error, Result};
