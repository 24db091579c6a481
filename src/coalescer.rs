//! Buffers caption-text keystrokes so the store sees one update per burst.
//!
//! ```text
//! Idle --keystroke--> Buffering --quiet period / flush--> (commit) --> Idle
//!                       ^   |
//!                       +---+ keystroke restarts the timer
//! ```
//!
//! The coalescer only decides *when* and *what* to commit. The caller turns a
//! [`TextCommit`] into a store update using the cue's timing at that moment.

use std::time::Duration;

use crate::model::CueId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCommit {
    pub cue: CueId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Buffering {
        cue: CueId,
        text: String,
        deadline: Duration,
    },
}

#[derive(Debug)]
pub struct EditCoalescer {
    delay: Duration,
    state: State,
}

impl EditCoalescer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: State::Idle,
        }
    }

    /// Records the latest text for `cue` and restarts the quiet-period timer.
    ///
    /// If a different cue still had buffered text, that edit is returned so the
    /// caller can commit it before anything else happens.
    pub fn on_keystroke(&mut self, cue: CueId, text: String, now: Duration) -> Option<TextCommit> {
        let displaced = match &self.state {
            State::Buffering { cue: pending, .. } if *pending != cue => self.take(),
            _ => None,
        };
        self.state = State::Buffering {
            cue,
            text,
            deadline: now + self.delay,
        };
        displaced
    }

    /// Fires the timer if the quiet period has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<TextCommit> {
        match &self.state {
            State::Buffering { deadline, .. } if now >= *deadline => self.take(),
            _ => None,
        }
    }

    /// Commits whatever is buffered right away. No-op when idle.
    pub fn flush(&mut self) -> Option<TextCommit> {
        self.take()
    }

    /// Drops buffered text without committing it.
    pub fn cancel(&mut self) {
        if let State::Buffering { cue, .. } = &self.state {
            tracing::debug!(cue = %cue, "pending text edit cancelled");
        }
        self.state = State::Idle;
    }

    pub fn pending_cue(&self) -> Option<CueId> {
        match &self.state {
            State::Buffering { cue, .. } => Some(*cue),
            State::Idle => None,
        }
    }

    /// Buffered text for `cue`, if that cue is the one being edited.
    pub fn pending_text(&self, cue: CueId) -> Option<&str> {
        match &self.state {
            State::Buffering { cue: c, text, .. } if *c == cue => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        match &self.state {
            State::Buffering { deadline, .. } => Some(*deadline),
            State::Idle => None,
        }
    }

    fn take(&mut self) -> Option<TextCommit> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Buffering { cue, text, .. } => Some(TextCommit { cue, text }),
            State::Idle => None,
        }
    }
}
