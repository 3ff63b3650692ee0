// Source Artifact
//
// A named blob of source bytes, the unit every assertion operates on.

use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;

use crate::domain::error::ParseError;

/// A file-like artifact: a logical name plus raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    bytes: Vec<u8>,
}

impl SourceFile {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_string(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::from_bytes(name, source.into().into_bytes())
    }

    /// Build a file from individual lines, joined with `\n`.
    pub fn for_source_lines(name: impl Into<String>, lines: &[&str]) -> Self {
        Self::from_string(name, lines.join("\n"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the content with `charset`, stripping a matching BOM.
    /// Malformed sequences are replaced with U+FFFD.
    pub fn decode(&self, charset: &'static Encoding) -> Cow<'_, str> {
        charset.decode_with_bom_removal(&self.bytes).0
    }

    /// Strict UTF-8 text for parsing; a leading BOM is dropped.
    pub fn parse_text(&self) -> Result<&str, ParseError> {
        let text = UTF_8
            .decode_without_bom_handling_and_without_replacement(&self.bytes)
            .ok_or_else(|| ParseError::Encoding {
                file: self.name.clone(),
            })?;
        match text {
            Cow::Borrowed(text) => Ok(text.strip_prefix('\u{feff}').unwrap_or(text)),
            // UTF-8 decoding without replacement never allocates.
            Cow::Owned(_) => Err(ParseError::Encoding {
                file: self.name.clone(),
            }),
        }
    }
}
