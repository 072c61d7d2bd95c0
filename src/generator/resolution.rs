//! Time-window resolutions and the layout of generated identifiers.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// Format of second-resolution windows.
const SECOND_WINDOW_FORMAT: &str = "%Y%m%d%H%M%S";

/// Reserved trailing digit of every identifier.
pub const RESERVED_MARK: u8 = 0;

/// Granularity of the time window that prefixes an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Unix epoch milliseconds in decimal, 12-digit sequence.
    Millis,
    /// UTC `YYYYMMDDhhmmss`, 3-digit sequence.
    Seconds,
}

impl Resolution {
    /// Digits reserved for the sequence field.
    #[must_use]
    pub const fn sequence_width(self) -> usize {
        match self {
            Self::Millis => 12,
            Self::Seconds => 3,
        }
    }

    /// Largest sequence value that fits the field.
    #[must_use]
    pub const fn capacity(self) -> u64 {
        match self {
            Self::Millis => 999_999_999_999,
            Self::Seconds => 999,
        }
    }

    /// Truncates `instant` to this resolution and renders the window label.
    #[must_use]
    pub fn window(self, instant: DateTime<Utc>) -> Window {
        let label = match self {
            Self::Millis => instant.timestamp_millis().to_string(),
            Self::Seconds => instant.format(SECOND_WINDOW_FORMAT).to_string(),
        };
        Window { label, resolution: self }
    }

    /// Start of the window a label names, or `None` if it does not parse.
    #[must_use]
    pub fn window_start(self, label: &str) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis => {
                let ms = label.parse::<i64>().ok()?;
                Utc.timestamp_millis_opt(ms).single()
            }
            Self::Seconds => NaiveDateTime::parse_from_str(label, SECOND_WINDOW_FORMAT)
                .ok()
                .map(|naive| naive.and_utc()),
        }
    }
}

/// A rendered time window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Window {
    /// Text that prefixes identifiers issued in this window.
    pub label: String,
    /// Resolution the label was rendered at.
    pub resolution: Resolution,
}

/// Renders `<window><machine_id><sequence><mark>`.
#[must_use]
pub fn format_id(window: &Window, machine_id: &str, sequence: u64) -> String {
    let width = window.resolution.sequence_width();
    format!("{}{machine_id}{sequence:0width$}{RESERVED_MARK}", window.label)
}

/// An identifier split back into its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdParts {
    /// Window label.
    pub window: String,
    /// Machine id as supplied by the caller.
    pub machine_id: String,
    /// Sequence number within the window.
    pub sequence: u64,
    /// Reserved mark digit.
    pub mark: u8,
    /// Resolution the identifier was minted at.
    pub resolution: Resolution,
}

impl IdParts {
    /// Splits `id`, minted for `machine_id` at `resolution`, into its fields.
    ///
    /// Returns `None` when the machine id does not sit where expected or a
    /// numeric field does not parse.
    #[must_use]
    pub fn parse(id: &str, machine_id: &str, resolution: Resolution) -> Option<Self> {
        let width = resolution.sequence_width();
        let window_end = id.len().checked_sub(machine_id.len() + width + 1)?;
        let window = id.get(..window_end).filter(|w| !w.is_empty())?;
        let rest = id.get(window_end..)?.strip_prefix(machine_id)?;
        let (sequence, mark) = (rest.get(..width)?, rest.get(width..)?);
        resolution.window_start(window)?;
        Some(Self {
            window: window.to_string(),
            machine_id: machine_id.to_string(),
            sequence: sequence.parse().ok()?,
            mark: mark.parse().ok()?,
            resolution,
        })
    }

    /// Start of the identifier's window.
    #[must_use]
    pub fn window_start(&self) -> Option<DateTime<Utc>> {
        self.resolution.window_start(&self.window)
    }
}
