use std::fmt;
use std::str::FromStr;

use chrono::{Local, Offset};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A commit timestamp: seconds since the UNIX epoch plus the author's
/// time-zone offset.
///
/// Rendered as `<epoch> <±HHMM>`, e.g. `1700000000 +0530`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since the UNIX epoch (UTC).
    pub seconds: i64,
    /// Offset from UTC in minutes (east positive).
    pub offset_minutes: i32,
}

impl Timestamp {
    /// Create a timestamp with explicit values.
    pub const fn new(seconds: i64, offset_minutes: i32) -> Self {
        Self {
            seconds,
            offset_minutes,
        }
    }

    /// The current wall-clock time in the local time zone.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            seconds: now.timestamp(),
            offset_minutes: now.offset().fix().local_minus_utc() / 60,
        }
    }

    /// The offset formatted as `±HHMM`.
    pub fn offset_string(&self) -> String {
        let sign = if self.offset_minutes < 0 { '-' } else { '+' };
        let minutes = self.offset_minutes.unsigned_abs();
        format!("{sign}{:02}{:02}", minutes / 60, minutes % 60)
    }

    /// Parse an offset of the form `±HHMM` into minutes.
    pub fn parse_offset(s: &str) -> Result<i32, TypeError> {
        let invalid = || TypeError::InvalidOffset(s.to_string());
        if s.len() != 5 || !s.is_ascii() {
            return Err(invalid());
        }
        let sign = match &s[..1] {
            "+" => 1,
            "-" => -1,
            _ => return Err(invalid()),
        };
        let hours: i32 = s[1..3].parse().map_err(|_| invalid())?;
        let minutes: i32 = s[3..5].parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        Ok(sign * (hours * 60 + minutes))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seconds, self.offset_string())
    }
}

/// Characters that would break the `name <email>` framing of a signature line.
const FRAMING_CHARS: [char; 3] = ['<', '>', '\n'];

/// Drop framing characters and surrounding whitespace, as git does for
/// user-supplied identities.
fn sanitize(field: &str) -> String {
    let kept: String = field.chars().filter(|c| !FRAMING_CHARS.contains(c)).collect();
    kept.trim().to_string()
}

/// Identity and time attached to a commit's `author` and `committer` lines.
///
/// [`Signature::new`] strips `<`, `>` and newlines from the name and email so
/// the rendered line always parses back.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: Timestamp,
}

impl Signature {
    pub fn new(name: impl AsRef<str>, email: impl AsRef<str>, when: Timestamp) -> Self {
        Self {
            name: sanitize(name.as_ref()),
            email: sanitize(email.as_ref()),
            when,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.when)
    }
}

impl FromStr for Signature {
    type Err = TypeError;

    /// Parse `<name> <<email>> <epoch> <±HHMM>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidSignature(s.to_string());
        let open = s.find('<').ok_or_else(invalid)?;
        let close = s[open..].find('>').map(|i| open + i).ok_or_else(invalid)?;
        let name = s[..open].trim_end();
        let email = &s[open + 1..close];

        let mut rest = s[close + 1..].split_whitespace();
        let seconds: i64 = rest
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(invalid)?;
        let offset = rest.next().ok_or_else(invalid)?;
        if rest.next().is_some() {
            return Err(invalid());
        }
        let offset_minutes = Timestamp::parse_offset(offset)?;

        Ok(Self::new(name, email, Timestamp::new(seconds, offset_minutes)))
    }
}
