//! Shared primitive types for formkit.

use std::fmt;
use std::str::FromStr;

// ============================================================================
// Field identity
// ============================================================================

/// Identifies one field within a form.
///
/// Ids are the correlation key for error, blur and loading tracking, so they
/// must be unique within one rendered form. They are usually derived from a
/// field's label via [`FieldId::from_label`], but can be set explicitly on
/// the field's options when two fields would otherwise collide.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(String);

impl FieldId {
    /// Create a field id from an explicit string.
    pub fn new(raw: impl Into<String>) -> Self {
        FieldId(raw.into())
    }

    /// Derive a field id from a human-readable label.
    ///
    /// The label is lowercased and runs of non-alphanumeric characters are
    /// collapsed into single dashes, so `"Account name"` becomes
    /// `account-name`.
    pub fn from_label(label: &str) -> Self {
        let mut id = String::with_capacity(label.len());
        let mut pending_dash = false;
        for ch in label.chars() {
            if ch.is_alphanumeric() {
                if pending_dash && !id.is_empty() {
                    id.push('-');
                }
                pending_dash = false;
                for lower in ch.to_lowercase() {
                    id.push(lower);
                }
            } else {
                pending_dash = true;
            }
        }
        FieldId(id)
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(raw: &str) -> Self {
        FieldId::new(raw)
    }
}

// ============================================================================
// Validation timing
// ============================================================================

/// When a field's error message becomes visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationStrategy {
    /// Show the error once the field has been blurred while invalid, or once
    /// a submit attempt forces every error to show. The default.
    #[default]
    OnBlur,
    /// Suppress the error until a submit attempt, regardless of blur state.
    OnSubmit,
}

// ============================================================================
// Calendar date
// ============================================================================

/// A plain calendar date, as produced by a date picker field.
///
/// No timezone or time-of-day semantics; this is a `(year, month, day)`
/// triple with basic range validation and ISO-8601 formatting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    year: i32,
    month: u8,
    day: u8,
}

impl CalendarDate {
    /// Create a date, checking month and day ranges (including leap years).
    pub fn new(year: i32, month: u8, day: u8) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        if day < 1 || day > days_in_month(year, month) {
            return None;
        }
        Some(CalendarDate { year, month, day })
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month component (1-12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The day component (1-31).
    pub fn day(&self) -> u8 {
        self.day
    }
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
            if leap {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for CalendarDate {
    type Err = String;

    /// Parse an ISO-8601 date (`YYYY-MM-DD`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let (y, m, d) = match (parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d)) => (y, m, d),
            _ => return Err(format!("invalid date: {}", s)),
        };
        let year: i32 = y.parse().map_err(|_| format!("invalid year: {}", y))?;
        let month: u8 = m.parse().map_err(|_| format!("invalid month: {}", m))?;
        let day: u8 = d.parse().map_err(|_| format!("invalid day: {}", d))?;
        CalendarDate::new(year, month, day).ok_or_else(|| format!("date out of range: {}", s))
    }
}

// ============================================================================
// File upload state
// ============================================================================

/// The lifecycle of an uploaded file, stored as the typed value of a file
/// field inside the dirty values.
///
/// Mirrors the remote-data shape: nothing selected yet, upload in flight,
/// uploaded to a URL, or failed (retryable).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FileState {
    /// No file has been selected.
    #[default]
    NotAsked,
    /// An upload is in flight.
    Loading,
    /// The upload completed; the server returned this URL.
    Loaded(String),
    /// The upload failed with this message. The field stays in this state
    /// until the user retries, so parsing reports a load error.
    Failed(String),
}

impl FileState {
    /// The uploaded URL, if the upload completed.
    pub fn url(&self) -> Option<&str> {
        match self {
            FileState::Loaded(url) => Some(url),
            _ => None,
        }
    }

    /// Whether an upload is currently in flight.
    pub fn is_uploading(&self) -> bool {
        matches!(self, FileState::Loading)
    }

    /// Whether no file has been selected yet.
    pub fn is_not_asked(&self) -> bool {
        matches!(self, FileState::NotAsked)
    }
}

/// A file chosen by the user, handed to the upload transport.
///
/// The core never reads file contents; the transport resolves the payload to
/// a URL or an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePayload {
    /// The file name as reported by the picker.
    pub name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
}

impl FilePayload {
    /// Create a payload with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        FilePayload {
            name: name.into(),
            content_type: None,
        }
    }

    /// Attach a MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
