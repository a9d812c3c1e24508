//! Declarative field schemas and the generic loader applying them.
//!
//! Every record shape carries a static table of [`FieldSchema`] entries, one
//! per populated field: the tag holding the bytes, the width and offset of the
//! field within the tag's value, the [`ValueKind`] used to decode it, and
//! whether the tag must be present. The table is normally generated by the
//! [`FromFields`](macro@FromFields) derive macro and applied by [`load`].

use core::{fmt, str::FromStr};

use crate::{
    error::{Error, Result, window},
    value::{Value, ValueKind},
};

/// A two-byte file identifier keying one section of a card export.
///
/// Displayed as four uppercase hex digits, e.g. `050E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u16);

impl Tag {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub const fn from_bytes(r: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(r))
    }

    pub const fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub const fn id(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 4 {
            Err(Error::UnsupportedType(format!("tag {s}")))?;
        }
        u16::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| Error::UnsupportedType(format!("tag {s}")))
    }
}

/// Number of bytes a field occupies within its tag's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Exactly this many bytes.
    Exact(usize),
    /// Every byte from the offset to the end of the value.
    Rest,
}

/// One field of a record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub tag: Tag,
    pub width: Width,
    pub offset: usize,
    pub kind: ValueKind,
    pub required: bool,
}

impl FieldSchema {
    /// Parse the compact hint form `<tag> <width> <offset> <kind> [required]`.
    ///
    /// A width of `-1` selects [`Width::Rest`]. The required flag accepts
    /// `true`/`false`/`1`/`0` and defaults to `true`.
    ///
    /// ```
    /// let field = FieldSchema::from_hint("last_card_download", "050E 4 0 date 0")?;
    /// ```
    pub fn from_hint(name: &'static str, hint: &str) -> Result<Self> {
        let invalid = || Error::UnsupportedType(format!("field hint `{hint}`"));

        let parts: Vec<&str> = hint.split_ascii_whitespace().collect();
        let [tag, width, offset, kind, rest @ ..] = parts.as_slice() else {
            return Err(invalid());
        };

        let width = match *width {
            "-1" => Width::Rest,
            n => Width::Exact(n.parse().map_err(|_| invalid())?),
        };

        let required = match rest {
            [] => true,
            ["1" | "true"] => true,
            ["0" | "false"] => false,
            _ => Err(invalid())?,
        };

        Ok(Self {
            name,
            tag: tag.parse()?,
            width,
            offset: offset.parse().map_err(|_| invalid())?,
            kind: kind.parse()?,
            required,
        })
    }

    /// Borrow this field's bytes from the value of its tag.
    ///
    /// Declared widths never shrink to fit: a value too short for the
    /// declaration is [`Error::Truncated`].
    pub fn slice<'a>(&self, value: &'a [u8]) -> Result<&'a [u8]> {
        match self.width {
            Width::Exact(n) => window(value, self.offset, n),
            Width::Rest => value.get(self.offset..).ok_or(Error::Truncated {
                offset: 0,
                needed: self.offset,
                available: value.len(),
            }),
        }
    }

    /// Slice and decode this field from the value of its tag.
    pub fn decode(&self, value: &[u8]) -> Result<Value> {
        self.kind.decode(self.slice(value)?)
    }
}

/// Derive [`FromFields`] for a struct representing one record shape.
///
/// # Example
///
/// Each populated field carries a `tlv(tag, width, offset, kind)` attribute.
/// Use `rest` as the width to take every remaining byte, and append
/// `optional` to tolerate an absent tag. Fields without the attribute are
/// left at their default.
///
/// ```
/// #[derive(Debug, Default, FromFields)]
/// struct SessionOpen {
///     #[tlv(0x0507, 4, 0, date)]
///     time: DateTime<Utc>,
///     #[tlv(0x0507, 1, 4, int)]
///     vehicle_nation: u32,
///     #[tlv(0x0507, 14, 5, string)]
///     vehicle_number: String,
/// }
/// ```
pub use tachocard_derive::FromFields;

/// A record shape populated from a static field table.
///
/// See the [`FromFields`](macro@FromFields) derive macro for an automatic
/// implementation of this trait.
pub trait FromFields: Default {
    /// Name of the shape, used to attribute errors.
    const SHAPE: &'static str;
    /// Field table, in declaration order.
    const SCHEMA: &'static [FieldSchema];

    /// Assign the decoded value of the field at `index` in [`Self::SCHEMA`].
    fn set_field(&mut self, index: usize, value: Value) -> Result<()>;
}

/// Resolve tags to their raw value bytes.
pub trait TagSource {
    fn get(&self, tag: Tag) -> Option<&[u8]>;
}

/// A single cyclic sub-record, presented as the only value of its group tag.
#[derive(Debug, Clone, Copy)]
pub struct SubRecord<'a> {
    pub tag: Tag,
    pub bytes: &'a [u8],
}

impl TagSource for SubRecord<'_> {
    fn get(&self, tag: Tag) -> Option<&[u8]> {
        (tag == self.tag).then_some(self.bytes)
    }
}

/// Populate a record shape from a tag source.
///
/// A required field whose tag is absent fails with [`Error::MissingSection`];
/// an optional one is left at its default. Decode errors are wrapped with the
/// shape and field name.
pub fn load<T: FromFields>(source: &impl TagSource) -> Result<T> {
    let mut record = T::default();

    for (index, field) in T::SCHEMA.iter().enumerate() {
        let Some(raw) = source.get(field.tag) else {
            if field.required {
                Err(Error::MissingSection {
                    shape: T::SHAPE,
                    tag: field.tag,
                })?;
            }
            continue;
        };

        let value = field
            .decode(raw)
            .map_err(|e| e.in_field(T::SHAPE, field.name))?;
        record
            .set_field(index, value)
            .map_err(|e| e.in_field(T::SHAPE, field.name))?;
    }

    Ok(record)
}
