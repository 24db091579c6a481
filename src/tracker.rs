//! Follows the playback position through the cue list.
//!
//! [`active_cue`] is the pure "which cue is active" rule. [`AutoScroller`]
//! decides whether a change of active cue should move the list, and backs off
//! for a cooldown while the user scrolls by hand.

use std::time::Duration;

use serde::Serialize;

use crate::model::{Cue, CueId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActiveCue {
    NoActiveCue,
    Active { index: usize, id: CueId },
}

impl ActiveCue {
    pub fn index(self) -> Option<usize> {
        match self {
            ActiveCue::Active { index, .. } => Some(index),
            ActiveCue::NoActiveCue => None,
        }
    }

    pub fn id(self) -> Option<CueId> {
        match self {
            ActiveCue::Active { id, .. } => Some(id),
            ActiveCue::NoActiveCue => None,
        }
    }
}

/// The last cue, in list order, that has started by `position` seconds.
///
/// `cues` must be sorted by start time.
pub fn active_cue(cues: &[Cue], position: f64) -> ActiveCue {
    let started = cues.partition_point(|c| c.start_secs() <= position);
    match started.checked_sub(1) {
        Some(index) => ActiveCue::Active {
            index,
            id: cues[index].id,
        },
        None => ActiveCue::NoActiveCue,
    }
}

/// Instruction for the list view to bring a row into view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollCommand {
    pub index: usize,
    pub cue: CueId,
    pub start_time: f64,
}

#[derive(Debug)]
pub struct AutoScroller {
    cooldown: Duration,
    active: ActiveCue,
    /// Target of the last emitted command.
    scrolled_to: ActiveCue,
    suspended_until: Option<Duration>,
}

impl AutoScroller {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            active: ActiveCue::NoActiveCue,
            scrolled_to: ActiveCue::NoActiveCue,
            suspended_until: None,
        }
    }

    pub fn active(&self) -> ActiveCue {
        self.active
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended_until.is_some()
    }

    pub fn resume_at(&self) -> Option<Duration> {
        self.suspended_until
    }

    /// Re-evaluates the active cue. Safe to call at any rate and with
    /// repeated or out-of-order positions.
    pub fn update(&mut self, cues: &[Cue], position: f64) -> Option<ScrollCommand> {
        if !position.is_finite() {
            tracing::debug!(position, "ignoring non-finite playback position");
            return None;
        }
        self.active = active_cue(cues, position);
        if self.is_suspended() {
            return None;
        }
        self.scroll_if_moved(cues)
    }

    /// The user scrolled the list; hold off until `now + cooldown`.
    pub fn suspend(&mut self, now: Duration) {
        let until = now + self.cooldown;
        self.suspended_until = Some(until);
        tracing::debug!(resume_at_ms = until.as_millis() as u64, "auto-scroll suspended");
    }

    /// Fires the cooldown timer. On re-arm, catches the list up with the
    /// active cue if it moved meanwhile.
    pub fn poll(&mut self, cues: &[Cue], now: Duration) -> Option<ScrollCommand> {
        match self.suspended_until {
            Some(until) if now >= until => {
                self.suspended_until = None;
                tracing::debug!("auto-scroll re-armed");
                self.scroll_if_moved(cues)
            }
            _ => None,
        }
    }

    /// Forgets all state, e.g. when the session closes.
    pub fn reset(&mut self) {
        self.active = ActiveCue::NoActiveCue;
        self.scrolled_to = ActiveCue::NoActiveCue;
        self.suspended_until = None;
    }

    fn scroll_if_moved(&mut self, cues: &[Cue]) -> Option<ScrollCommand> {
        if self.active == self.scrolled_to {
            return None;
        }
        let ActiveCue::Active { index, id } = self.active else {
            // Leaving every cue behind does not move the list.
            self.scrolled_to = self.active;
            return None;
        };
        self.scrolled_to = self.active;
        let cmd = ScrollCommand {
            index,
            cue: id,
            start_time: cues.get(index).map(Cue::start_secs).unwrap_or_default(),
        };
        tracing::trace!(index, cue = %id, "scroll to active cue");
        Some(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CueEdit;

    fn cues(starts_ms: &[i64]) -> Vec<Cue> {
        starts_ms
            .iter()
            .enumerate()
            .map(|(i, s)| Cue::from_edit(CueId(i as u64), CueEdit::new(*s, s + 1_000, "")))
            .collect()
    }

    #[test]
    fn picks_last_started_cue() {
        let list = cues(&[0, 5_000, 12_000]);
        assert_eq!(active_cue(&list, 7.0).index(), Some(1));
        assert_eq!(active_cue(&list, 12.0).index(), Some(2));
        assert_eq!(active_cue(&list, 0.0).index(), Some(0));
        assert_eq!(active_cue(&list, 100.0).index(), Some(2));
        assert_eq!(active_cue(&list, -1.0), ActiveCue::NoActiveCue);
    }

    #[test]
    fn no_cue_before_first_start() {
        let list = cues(&[2_000, 5_000]);
        assert_eq!(active_cue(&list, 1.9), ActiveCue::NoActiveCue);
        assert_eq!(active_cue(&[], 3.0), ActiveCue::NoActiveCue);
    }

    #[test]
    fn decimal_start_is_active_at_its_own_position() {
        let list = cues(&[4_350, 7_100]);
        assert_eq!(active_cue(&list, 4.35).index(), Some(0));
        assert_eq!(active_cue(&list, 4.349).index(), None);
        assert_eq!(active_cue(&list, 7.1).index(), Some(1));
    }

    #[test]
    fn repeated_positions_scroll_once() {
        let list = cues(&[0, 5_000, 12_000]);
        let mut s = AutoScroller::new(Duration::from_millis(1500));

        let first = s.update(&list, 7.0).unwrap();
        assert_eq!((first.index, first.cue, first.start_time), (1, CueId(1), 5.0));
        assert!(s.update(&list, 7.0).is_none());
        assert!(s.update(&list, 8.5).is_none(), "same cue, no command");
        assert_eq!(s.update(&list, 12.0).map(|c| c.index), Some(2));
    }

    #[test]
    fn out_of_order_positions_are_tolerated() {
        let list = cues(&[0, 5_000, 12_000]);
        let mut s = AutoScroller::new(Duration::from_millis(1500));
        assert_eq!(s.update(&list, 13.0).map(|c| c.index), Some(2));
        assert_eq!(s.update(&list, 6.0).map(|c| c.index), Some(1));
        assert!(s.update(&list, f64::NAN).is_none());
        assert_eq!(s.active().index(), Some(1));
    }

    #[test]
    fn manual_scroll_suspends_then_catches_up() {
        let list = cues(&[0, 5_000, 12_000]);
        let mut s = AutoScroller::new(Duration::from_millis(1000));
        s.update(&list, 1.0);

        s.suspend(Duration::from_millis(100));
        assert!(s.update(&list, 6.0).is_none());
        assert_eq!(s.active().index(), Some(1));
        assert!(s.poll(&list, Duration::from_millis(900)).is_none());

        let cmd = s.poll(&list, Duration::from_millis(1100)).unwrap();
        assert_eq!(cmd.index, 1);
        assert!(!s.is_suspended());
        assert!(s.update(&list, 6.5).is_none());
    }

    #[test]
    fn rearm_without_movement_is_silent() {
        let list = cues(&[0, 5_000]);
        let mut s = AutoScroller::new(Duration::from_millis(1000));
        s.update(&list, 6.0);
        s.suspend(Duration::ZERO);
        s.suspend(Duration::from_millis(500));
        assert!(s.poll(&list, Duration::from_millis(1200)).is_none());
        assert!(s.is_suspended(), "second scroll extended the cooldown");
        assert!(s.poll(&list, Duration::from_millis(1500)).is_none());
        assert!(!s.is_suspended());
    }

    #[test]
    fn returning_to_a_cue_after_leaving_scrolls_again() {
        let list = cues(&[2_000, 5_000]);
        let mut s = AutoScroller::new(Duration::from_millis(1000));
        assert!(s.update(&list, 3.0).is_some());
        assert!(s.update(&list, 0.5).is_none());
        assert_eq!(s.update(&list, 3.0).map(|c| c.index), Some(0));
    }
}
