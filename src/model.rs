use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::{ms_to_secs, secs_to_ms};

/// Store-assigned identity of a cue. Unique within one store, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CueId(pub u64);

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cue as exchanged with import and export collaborators, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueData {
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub text: String,
}

impl CueData {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
        }
    }
}

/// The editable value of a cue as the store holds it, times in ms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueEdit {
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
}

impl CueEdit {
    pub fn new(start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// `None` when either time is not a finite, representable number.
    pub fn from_data(data: CueData) -> Option<Self> {
        Some(Self {
            start_ms: secs_to_ms(data.start_time)?,
            end_ms: secs_to_ms(data.end_time)?,
            text: data.text,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cue {
    pub id: CueId,
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
}

impl Cue {
    pub(crate) fn from_edit(id: CueId, edit: CueEdit) -> Self {
        Self {
            id,
            start_ms: edit.start_ms,
            end_ms: edit.end_ms,
            text: edit.text,
        }
    }

    /// Length of the "show for" field.
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    pub fn start_secs(&self) -> f64 {
        ms_to_secs(self.start_ms)
    }

    pub fn end_secs(&self) -> f64 {
        ms_to_secs(self.end_ms)
    }

    pub fn data(&self) -> CueData {
        CueData::new(self.start_secs(), self.end_secs(), self.text.clone())
    }

    /// Same cue with new text, keeping its current timing.
    pub fn with_text(&self, text: impl Into<String>) -> CueEdit {
        CueEdit::new(self.start_ms, self.end_ms, text)
    }
}
