//! States processing block headers.
//!
//! Every block of an export opens with a three-byte header (a two-byte file
//! identifier and a marker byte) followed by a two-byte big-endian length.
//! The marker distinguishes file contents from the signature computed over
//! the preceding file.

use either::Either::{self, Left, Right};
use zerocopy::FromBytes;

use crate::schema::Tag;

/// Marker byte of a block holding file contents.
pub const DATA: u8 = 0x00;

/// How the signature following a file was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Cards issued with an ESTR (EU) security module.
    Estr,
    /// Cards issued with a GOST (SKZI) security module.
    Gost,
}

impl SignatureScheme {
    pub const fn marker(self) -> u8 {
        match self {
            Self::Estr => 0x01,
            Self::Gost => 0x81,
        }
    }

    pub const fn from_marker(marker: u8) -> Option<Self> {
        match marker {
            0x01 => Some(Self::Estr),
            0x81 => Some(Self::Gost),
            _ => None,
        }
    }
}

#[repr(C, packed)]
#[derive(Debug, FromBytes)]
struct BlockHeader {
    file: [u8; 2],
    marker: u8,
}

/// Transition to another state by decoding a block header.
///
/// Returns a signature state token for signature blocks, and a file state
/// token otherwise.
pub fn advance(r: [u8; 3]) -> Either<Signature, File> {
    let BlockHeader { file, marker } = zerocopy::transmute!(r);

    let tag = Tag::from_bytes(file);

    match SignatureScheme::from_marker(marker) {
        Some(scheme) => Left(Signature { tag, scheme }),
        None => Right(File { tag }),
    }
}

/// State token to decode the length of a file block.
#[derive(Debug)]
pub struct File {
    tag: Tag,
}

impl File {
    /// Transition by decoding the length field.
    ///
    /// Returns the file's tag and the number of value bytes that follow.
    pub fn advance(self, r: [u8; 2]) -> (Tag, usize) {
        (self.tag, u16::from_be_bytes(r).into())
    }
}

/// State token to decode the length of a signature block.
#[derive(Debug)]
pub struct Signature {
    tag: Tag,
    scheme: SignatureScheme,
}

impl Signature {
    /// Transition by decoding the length field.
    ///
    /// Returns the signed file's tag, the signature scheme, and the number of
    /// signature bytes to skip.
    pub fn advance(self, r: [u8; 2]) -> (Tag, SignatureScheme, usize) {
        (self.tag, self.scheme, u16::from_be_bytes(r).into())
    }
}
