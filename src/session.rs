//! One editing session over a single caption track.
//!
//! The session owns the cue store and hosts the edit coalescer and the
//! auto-scroller. It plays the role of the list view's controller: inputs come
//! in as method calls, and scroll commands and commit outcomes come out
//! through [`EditorSession::drain_events`].

use std::time::Duration;

use serde::Serialize;

use crate::{
    clock::Clock,
    coalescer::{EditCoalescer, TextCommit},
    config::EditorCfg,
    error::{EditError, EditResult},
    model::{Cue, CueData, CueEdit, CueId},
    store::{CueStore, LoadSummary},
    timing::{self, TimingField},
    tracker::{ActiveCue, AutoScroller, ScrollCommand},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Scroll(ScrollCommand),
    TextCommitted { cue: CueId, text: String },
    CommitRejected { cue: CueId, reason: String },
}

/// What the list view renders for one cue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CueRow {
    pub key: CueId,
    pub index: usize,
    pub start_time: f64,
    pub show_for: f64,
    pub end_time: f64,
    pub text: String,
    pub is_active: bool,
    pub is_last: bool,
}

pub struct EditorSession<C: Clock> {
    clock: C,
    store: CueStore,
    coalescer: EditCoalescer,
    scroller: AutoScroller,
    playback: Option<f64>,
    events: Vec<SessionEvent>,
}

impl<C: Clock> EditorSession<C> {
    pub fn new(cfg: &EditorCfg, clock: C) -> Self {
        Self {
            clock,
            store: CueStore::new(cfg.default_cue_duration_ms()),
            coalescer: EditCoalescer::new(Duration::from_millis(cfg.coalesce_delay_ms)),
            scroller: AutoScroller::new(Duration::from_millis(cfg.scroll_cooldown_ms)),
            playback: None,
            events: Vec::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &CueStore {
        &self.store
    }

    /// Seeds the session from an import collaborator. Any pending text edit is
    /// committed against the outgoing collection first.
    pub fn load(&mut self, raw: Vec<CueData>) -> LoadSummary {
        self.flush_pending();
        let summary = self.store.load(raw);
        self.retrack();
        summary
    }

    pub fn set_loading(&mut self, loading: bool) {
        if loading {
            self.flush_pending();
        }
        self.store.set_loading(loading);
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Adds a cue at the current playback position.
    pub fn add_cue(&mut self) -> EditResult<Cue> {
        let cue = self.store.add(self.playback)?;
        self.retrack();
        Ok(cue)
    }

    /// Removes `id`. Text still buffered for it is discarded on purpose: the
    /// flush runs after removal and surfaces as [`SessionEvent::CommitRejected`].
    pub fn delete_cue(&mut self, id: CueId) -> EditResult<bool> {
        let removed = self.store.remove(id)?;
        if self.coalescer.pending_cue() == Some(id) {
            self.flush_pending();
        }
        self.retrack();
        Ok(removed)
    }

    /// Applies a typed value to one timing field and commits it immediately.
    /// On any failure the cue keeps its previous timing.
    pub fn edit_timing(&mut self, id: CueId, field: TimingField, input: &str) -> EditResult<Cue> {
        let Some(cue) = self.store.get(id) else {
            tracing::warn!(id = %id, %field, "timing edit targets a cue that is no longer present");
            return Err(EditError::StaleCue(id));
        };
        let (start, end) = timing::retime(cue, field, input)?;
        let edit = CueEdit::new(start, end, cue.text.clone());

        let updated = self.store.update(id, edit).map(Cue::clone).inspect_err(|err| {
            tracing::debug!(id = %id, %field, input, error = %err, "timing edit rejected");
        })?;
        self.retrack();
        Ok(updated)
    }

    /// Records a keystroke in the caption text of `id`.
    pub fn type_text(&mut self, id: CueId, text: impl Into<String>) -> EditResult<()> {
        if self.store.is_loading() {
            return Err(EditError::Loading);
        }
        if self.store.get(id).is_none() {
            return Err(EditError::StaleCue(id));
        }
        let now = self.clock.now();
        if let Some(displaced) = self.coalescer.on_keystroke(id, text.into(), now) {
            self.commit(displaced);
        }
        Ok(())
    }

    /// The text input lost focus.
    pub fn blur(&mut self) {
        self.flush_pending();
    }

    /// The editor stops showing its current cue and starts showing `id`.
    pub fn swap_to(&mut self, id: CueId) {
        if self.coalescer.pending_cue().is_some_and(|pending| pending != id) {
            self.flush_pending();
        }
    }

    /// Ends the session: commits buffered text, then stops every timer.
    pub fn close(&mut self) {
        self.flush_pending();
        self.coalescer.cancel();
        self.scroller.reset();
    }

    pub fn on_playback_time(&mut self, position: f64) {
        if self.store.is_loading() {
            return;
        }
        if position.is_finite() {
            self.playback = Some(position);
        }
        if let Some(cmd) = self.scroller.update(self.store.list(), position) {
            self.events.push(SessionEvent::Scroll(cmd));
        }
    }

    pub fn on_user_scroll(&mut self) {
        self.scroller.suspend(self.clock.now());
    }

    /// Runs whichever timers are due.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        if let Some(commit) = self.coalescer.poll(now) {
            self.commit(commit);
        }
        if !self.store.is_loading() {
            if let Some(cmd) = self.scroller.poll(self.store.list(), now) {
                self.events.push(SessionEvent::Scroll(cmd));
            }
        }
    }

    /// The earliest pending timer deadline, for hosts that schedule wakeups.
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.coalescer.deadline(), self.scroller.resume_at()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn active(&self) -> ActiveCue {
        self.scroller.active()
    }

    pub fn rows(&self) -> Vec<CueRow> {
        if self.store.is_loading() {
            return Vec::new();
        }
        let active = self.scroller.active().id();
        let cues = self.store.list();
        cues.iter()
            .enumerate()
            .map(|(index, cue)| CueRow {
                key: cue.id,
                index,
                start_time: TimingField::Start.display_value(cue),
                show_for: TimingField::Duration.display_value(cue),
                end_time: TimingField::End.display_value(cue),
                text: self
                    .coalescer
                    .pending_text(cue.id)
                    .unwrap_or(cue.text.as_str())
                    .to_string(),
                is_active: active == Some(cue.id),
                is_last: index + 1 == cues.len(),
            })
            .collect()
    }

    pub fn export(&self) -> Vec<CueData> {
        self.store.export()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn flush_pending(&mut self) {
        if let Some(commit) = self.coalescer.flush() {
            self.commit(commit);
        }
    }

    /// Writes buffered text using the cue's timing as it is right now.
    fn commit(&mut self, TextCommit { cue: id, text }: TextCommit) {
        let result = match self.store.get(id) {
            Some(current) => {
                let edit = current.with_text(text.clone());
                self.store.update(id, edit).map(|_| ())
            }
            None => {
                tracing::warn!(id = %id, "buffered text targets a cue that is no longer present");
                Err(EditError::StaleCue(id))
            }
        };

        match result {
            Ok(()) => {
                tracing::debug!(id = %id, chars = text.chars().count(), "text edit committed");
                self.events.push(SessionEvent::TextCommitted { cue: id, text });
                self.retrack();
            }
            Err(err) => {
                self.events.push(SessionEvent::CommitRejected {
                    cue: id,
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Store state changed; derive the active cue again from the fresh list.
    fn retrack(&mut self) {
        if let Some(position) = self.playback {
            if let Some(cmd) = self.scroller.update(self.store.list(), position) {
                self.events.push(SessionEvent::Scroll(cmd));
            }
        }
    }
}
