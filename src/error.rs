use thiserror::Error;

use crate::{model::CueId, timing::TimingField};

pub type EditResult<T> = Result<T, EditError>;

/// Every failure here degrades to "edit not applied"; none of them end a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("invalid {field} value: {input:?}")]
    InvalidTime { field: TimingField, input: String },

    #[error("cue {0} is no longer in the collection")]
    StaleCue(CueId),

    #[error("cue range {start_ms}ms..{end_ms}ms is empty or inverted")]
    DegenerateRange { start_ms: i64, end_ms: i64 },

    #[error("cue start {0}ms is negative")]
    InvalidStart(i64),

    #[error("cue list is still loading")]
    Loading,
}

impl EditError {
    /// Validation failures leave the timing field on its last valid value.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EditError::InvalidTime { .. }
                | EditError::DegenerateRange { .. }
                | EditError::InvalidStart(_)
        )
    }
}
