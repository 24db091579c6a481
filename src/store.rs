//! The cue collection. It is the only owner of cues and the single place
//! where the `end > start` interval invariant is enforced.

use crate::{
    error::{EditError, EditResult},
    model::{Cue, CueData, CueEdit, CueId},
    time::secs_to_ms,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub kept: usize,
    pub dropped: usize,
}

#[derive(Debug)]
pub struct CueStore {
    /// Always sorted by (start_ms, id).
    cues: Vec<Cue>,
    next_id: u64,
    revision: u64,
    loading: bool,
    default_duration_ms: i64,
}

impl CueStore {
    pub fn new(default_duration_ms: i64) -> Self {
        Self {
            cues: Vec::new(),
            next_id: 0,
            revision: 0,
            loading: false,
            default_duration_ms: default_duration_ms.max(1),
        }
    }

    /// Replaces the collection. Entries breaking the interval invariant are dropped.
    pub fn load(&mut self, raw: Vec<CueData>) -> LoadSummary {
        let total = raw.len();
        self.cues.clear();
        for data in raw {
            let (start, end) = (data.start_time, data.end_time);
            let Some(edit) = CueEdit::from_data(data) else {
                tracing::warn!(start, end, "dropping cue with unrepresentable times from loaded track");
                continue;
            };
            if let Err(err) = validate(&edit) {
                tracing::warn!(start, end, error = %err, "dropping invalid cue from loaded track");
                continue;
            }
            let id = self.allocate_id();
            self.cues.push(Cue::from_edit(id, edit));
        }
        self.cues.sort_by(order);
        self.loading = false;
        self.bump();

        let summary = LoadSummary {
            kept: self.cues.len(),
            dropped: total - self.cues.len(),
        };
        tracing::info!(kept = summary.kept, dropped = summary.dropped, "cue track loaded");
        summary
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Inserts an empty cue of the default duration at `after_time` seconds,
    /// or right after the last cue when no time is given.
    pub fn add(&mut self, after_time: Option<f64>) -> EditResult<Cue> {
        self.ensure_ready()?;
        let start = match after_time.and_then(secs_to_ms) {
            Some(ms) => ms.max(0),
            None => self.cues.last().map(|c| c.end_ms.max(c.start_ms)).unwrap_or(0),
        };
        let end = start
            .checked_add(self.default_duration_ms)
            .ok_or(EditError::DegenerateRange {
                start_ms: start,
                end_ms: start,
            })?;
        let edit = CueEdit::new(start, end, String::new());
        validate(&edit)?;

        let cue = Cue::from_edit(self.allocate_id(), edit);
        self.insert_sorted(cue.clone());
        self.bump();
        tracing::debug!(id = %cue.id, start_ms = cue.start_ms, end_ms = cue.end_ms, "cue added");
        Ok(cue)
    }

    /// Replaces the cue `id` with `edit`, keeping its identity.
    pub fn update(&mut self, id: CueId, edit: CueEdit) -> EditResult<&Cue> {
        self.ensure_ready()?;
        let Some(pos) = self.position(id) else {
            tracing::warn!(id = %id, "update targets a cue that is no longer present");
            return Err(EditError::StaleCue(id));
        };
        validate(&edit)?;

        self.cues.remove(pos);
        let at = self.insert_sorted(Cue::from_edit(id, edit));
        self.bump();

        let cue = &self.cues[at];
        tracing::debug!(
            id = %id,
            start_ms = cue.start_ms,
            end_ms = cue.end_ms,
            from = pos,
            to = at,
            "cue updated"
        );
        Ok(cue)
    }

    /// Removes `id`. Returns false if it was already gone.
    pub fn remove(&mut self, id: CueId) -> EditResult<bool> {
        self.ensure_ready()?;
        match self.position(id) {
            Some(pos) => {
                self.cues.remove(pos);
                self.bump();
                tracing::debug!(id = %id, "cue removed");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Cues in ascending start order.
    pub fn list(&self) -> &[Cue] {
        &self.cues
    }

    pub fn get(&self, id: CueId) -> Option<&Cue> {
        self.cues.iter().find(|c| c.id == id)
    }

    pub fn position(&self, id: CueId) -> Option<usize> {
        self.cues.iter().position(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ordered snapshot for an export collaborator.
    pub fn export(&self) -> Vec<CueData> {
        self.cues.iter().map(Cue::data).collect()
    }

    fn ensure_ready(&self) -> EditResult<()> {
        if self.loading {
            return Err(EditError::Loading);
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> CueId {
        let id = CueId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_sorted(&mut self, cue: Cue) -> usize {
        let at = self
            .cues
            .partition_point(|c| (c.start_ms, c.id) < (cue.start_ms, cue.id));
        self.cues.insert(at, cue);
        at
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

fn order(a: &Cue, b: &Cue) -> std::cmp::Ordering {
    (a.start_ms, a.id).cmp(&(b.start_ms, b.id))
}

fn validate(edit: &CueEdit) -> EditResult<()> {
    if edit.start_ms < 0 {
        return Err(EditError::InvalidStart(edit.start_ms));
    }
    if edit.end_ms <= edit.start_ms {
        return Err(EditError::DegenerateRange {
            start_ms: edit.start_ms,
            end_ms: edit.end_ms,
        });
    }
    Ok(())
}
