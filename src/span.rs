//! Typed span identifiers (`q12`, `m3`, ...).

use std::fmt;
use std::str::FromStr;

/// The element kinds whose ids are renumbered on merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Quote,
    Mention,
}

impl SpanKind {
    pub const ALL: [SpanKind; 2] = [SpanKind::Quote, SpanKind::Mention];

    pub fn tag(self) -> &'static str {
        match self {
            SpanKind::Quote => "quote",
            SpanKind::Mention => "mention",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "quote" => Some(SpanKind::Quote),
            "mention" => Some(SpanKind::Mention),
            _ => None,
        }
    }
}

/// A span id: ASCII letters followed by a decimal number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpanId {
    pub prefix: String,
    pub number: u64,
}

/// Why a span id could not be parsed or shifted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanIdError {
    /// Not of the form `<letters><digits>`.
    Malformed(String),
    /// The number, once shifted, leaves no room in `u64`.
    Overflow(String),
}

impl SpanIdError {
    /// The offending id text.
    pub fn id(&self) -> &str {
        match self {
            SpanIdError::Malformed(id) | SpanIdError::Overflow(id) => id,
        }
    }
}

impl fmt::Display for SpanIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanIdError::Malformed(id) => write!(f, "invalid span id {id:?}"),
            SpanIdError::Overflow(id) => write!(f, "span id {id:?} is out of range"),
        }
    }
}

impl std::error::Error for SpanIdError {}

impl SpanId {
    pub fn new(prefix: impl Into<String>, number: u64) -> Self {
        Self {
            prefix: prefix.into(),
            number,
        }
    }

    /// Shift the numeric part by `offset`, or `None` if it would overflow.
    pub fn offset(&self, offset: u64) -> Option<SpanId> {
        Some(SpanId {
            prefix: self.prefix.clone(),
            number: self.number.checked_add(offset)?,
        })
    }
}

impl FromStr for SpanId {
    type Err = SpanIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        let (prefix, digits) = s.split_at(split);

        if prefix.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SpanIdError::Malformed(s.to_string()));
        }

        // only digits remain, so the parse can fail on overflow alone
        let number = digits
            .parse::<u64>()
            .map_err(|_| SpanIdError::Overflow(s.to_string()))?;

        Ok(SpanId::new(prefix, number))
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.number)
    }
}

/// Shift an `id` attribute value. Empty ids pass through as `None`.
pub fn shift_id(raw: &str, offset: u64) -> Result<Option<SpanId>, SpanIdError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<SpanId>()?
        .offset(offset)
        .map(Some)
        .ok_or_else(|| SpanIdError::Overflow(raw.to_string()))
}

/// Shift every id in a comma-separated `connection` list.
///
/// Empty tokens are kept as they are, so `"q1,"` stays a two-token list.
pub fn shift_connection(raw: &str, offset: u64) -> Result<String, SpanIdError> {
    let tokens = raw
        .split(',')
        .map(|token| {
            Ok(match shift_id(token, offset)? {
                Some(id) => id.to_string(),
                None => String::new(),
            })
        })
        .collect::<Result<Vec<_>, SpanIdError>>()?;
    Ok(tokens.join(","))
}
