//! Errors raised while decoding a card export.

use thiserror::Error;

use crate::schema::Tag;

/// Errors occurring while decoding a card export.
#[derive(Debug, Error)]
pub enum Error {
    /// A length field could not be decoded, or a width is out of range.
    #[error("Malformed length at offset {offset} ({detail}).")]
    MalformedLength { offset: usize, detail: &'static str },
    /// A declared length exceeds the bytes available.
    #[error("Truncated data: needed {needed} bytes at offset {offset}, found {available}.")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// A required tag is absent from the export.
    #[error("Missing section {tag} required by {shape}.")]
    MissingSection { shape: &'static str, tag: Tag },
    /// A value kind is unknown, or does not fit the field receiving it.
    #[error("Unsupported value type `{0}`.")]
    UnsupportedType(String),
    /// An activity change unit could not be decoded.
    #[error("Malformed activity change unit `{0}`.")]
    MalformedBitfield(String),
    /// The activity ring failed an integrity check.
    #[error("Ring mismatch at offset {offset}: expected length {expected}, found {found}.")]
    RingMismatch {
        offset: usize,
        expected: usize,
        found: usize,
    },
    /// A field of a record shape failed to decode.
    #[error("Field `{field}` of {shape}: {source}")]
    Field {
        shape: &'static str,
        field: &'static str,
        #[source]
        source: Box<Error>,
    },
    /// A record group failed to decode.
    #[error("Section {section}: {source}")]
    Section {
        section: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attribute this error to a record group.
    pub fn in_section(self, section: &'static str) -> Self {
        Self::Section {
            section,
            source: Box::new(self),
        }
    }

    /// Attribute this error to a single field of a record shape.
    pub(crate) fn in_field(self, shape: &'static str, field: &'static str) -> Self {
        Self::Field {
            shape,
            field,
            source: Box::new(self),
        }
    }

    /// The innermost error, with any section and field wrapping removed.
    pub fn root(&self) -> &Error {
        match self {
            Self::Field { source, .. } | Self::Section { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A convenience `Result` type alias using the crate's [`Error`] type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Borrow `needed` bytes at `offset`, or fail with [`Error::Truncated`].
pub(crate) fn window(r: &[u8], offset: usize, needed: usize) -> Result<&[u8]> {
    offset
        .checked_add(needed)
        .and_then(|end| r.get(offset..end))
        .ok_or(Error::Truncated {
            offset,
            needed,
            available: r.len().saturating_sub(offset),
        })
}
