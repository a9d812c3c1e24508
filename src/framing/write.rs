//! Framing of files into an export.

use crate::{
    error::{Error, Result},
    layout::{CardFile, CardGeometry},
    schema::Tag,
};

use super::header::{DATA, SignatureScheme};

/// Builder of a card export.
///
/// ```
/// let mut export = Export::new();
/// export
///     .file(Tag::new(0x050E), &download_time)?
///     .signature(Tag::new(0x050E), SignatureScheme::Gost, &signature)?;
/// let bytes = export.finish();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Export {
    buf: Vec<u8>,
}

impl Export {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file block.
    pub fn file(&mut self, tag: Tag, value: &[u8]) -> Result<&mut Self> {
        self.push(tag, DATA, value)
    }

    /// Append the signature block of the preceding file.
    pub fn signature(
        &mut self,
        tag: Tag,
        scheme: SignatureScheme,
        signature: &[u8],
    ) -> Result<&mut Self> {
        self.push(tag, scheme.marker(), signature)
    }

    /// Append a file of a card layout, checking its size against the card's
    /// geometry.
    pub fn card_file(
        &mut self,
        file: &CardFile,
        geometry: &CardGeometry,
        value: &[u8],
    ) -> Result<&mut Self> {
        if let Some(expected) = geometry.file_size(file) {
            if value.len() < expected {
                Err(Error::Truncated {
                    offset: self.buf.len(),
                    needed: expected,
                    available: value.len(),
                })?;
            }
            if value.len() > expected {
                Err(Error::MalformedLength {
                    offset: self.buf.len(),
                    detail: "file larger than the card layout allows",
                })?;
            }
        }
        self.file(file.tag, value)
    }

    /// Number of bytes framed so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn push(&mut self, tag: Tag, marker: u8, value: &[u8]) -> Result<&mut Self> {
        let len = u16::try_from(value.len()).map_err(|_| Error::MalformedLength {
            offset: self.buf.len(),
            detail: "value longer than 65535 bytes",
        })?;

        self.buf.extend_from_slice(&tag.to_bytes());
        self.buf.push(marker);
        self.buf.extend_from_slice(&len.to_be_bytes());
        self.buf.extend_from_slice(value);

        Ok(self)
    }
}
