//! Translation of the three user-facing timing fields into a (start, end) pair.
//!
//! All arithmetic is on whole milliseconds, so a start edit moves both ends by
//! the same amount and the duration is kept exactly. Nothing here checks
//! `end > start`; the store rejects degenerate ranges when the result is
//! committed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{EditError, EditResult},
    model::Cue,
    time::{MAX_MS, ms_to_secs, parse_ms},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingField {
    /// Moves the whole interval.
    Start,
    End,
    /// "Show for": end relative to start.
    Duration,
}

impl fmt::Display for TimingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimingField::Start => "start time",
            TimingField::End => "end time",
            TimingField::Duration => "show for",
        };
        f.write_str(name)
    }
}

impl TimingField {
    /// The value, in seconds, a timing input shows for `cue`.
    pub fn display_value(self, cue: &Cue) -> f64 {
        match self {
            TimingField::Start => cue.start_secs(),
            TimingField::End => cue.end_secs(),
            TimingField::Duration => ms_to_secs(cue.duration_ms()),
        }
    }
}

/// Parses `input` and applies it to `cue`, returning the new (start, end) in ms.
pub fn retime(cue: &Cue, field: TimingField, input: &str) -> EditResult<(i64, i64)> {
    let invalid = || EditError::InvalidTime {
        field,
        input: input.to_string(),
    };
    let value = parse_ms(input).ok_or_else(invalid)?;
    apply(cue.start_ms, cue.end_ms, field, value).ok_or_else(invalid)
}

/// Pure form of [`retime`] over an already parsed value. `None` if the result
/// leaves the representable range.
pub fn apply(start: i64, end: i64, field: TimingField, value: i64) -> Option<(i64, i64)> {
    let (new_start, new_end) = match field {
        TimingField::Start => {
            let offset = value.checked_sub(start)?;
            (value, end.checked_add(offset)?)
        }
        TimingField::End => (start, value),
        TimingField::Duration => (start, start.checked_add(value)?),
    };
    (new_start.abs() <= MAX_MS && new_end.abs() <= MAX_MS).then_some((new_start, new_end))
}
