//! Free-text sanitization for XML character data

use std::fmt;

use super::error::ValidationError;

/// Maximum message length (UTF-16 units)
pub const MAX_MESSAGE_LENGTH: usize = 256;

/// Maximum title length (UTF-16 units)
pub const MAX_TITLE_LENGTH: usize = 32;

/// Maximum source application name length (UTF-16 units)
pub const MAX_SOURCE_LENGTH: usize = 32;

/// Text that is safe to embed as XML character data.
///
/// Only [`sanitize`] builds one: no NUL, no XML-illegal characters, not
/// blank, and the raw input fit the field's length limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedText(String);

impl SanitizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SanitizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `c` may appear in an XML 1.0 document.
///
/// Supplementary-plane characters are treated as illegal.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
}

/// Length as the Windows APIs count it.
pub(crate) fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Validate `input` for `field` and strip XML-illegal characters.
///
/// The length limit applies to the raw input, so padding a short payload with
/// characters that would later be stripped never gets it accepted.
pub fn sanitize(input: &str, max_length: usize, field: &str) -> Result<SanitizedText, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::EmptyField { field: field.into() });
    }

    if input.contains('\0') {
        return Err(ValidationError::IllegalCharacter {
            field: field.into(),
            what: "invalid null characters",
        });
    }

    if utf16_len(input) > max_length {
        return Err(ValidationError::TooLong {
            field: field.into(),
            max: max_length,
        });
    }

    let cleaned: String = input.chars().filter(|&c| is_xml_char(c)).collect();

    if cleaned.trim().is_empty() {
        return Err(ValidationError::NoValidContent { field: field.into() });
    }

    Ok(SanitizedText(cleaned))
}
