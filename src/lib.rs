//! Headless model of a caption cue editor: an ordered cue store, timing-field
//! arithmetic, coalesced text commits, and a playback-driven active-cue tracker
//! that tells the list view where to scroll.

pub mod cli;
pub mod clock;
pub mod coalescer;
pub mod config;
pub mod error;
pub mod model;
pub mod replay;
pub mod session;
pub mod store;
pub mod time;
pub mod timing;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{EditError, EditResult};
pub use model::{Cue, CueData, CueEdit, CueId};
pub use session::{CueRow, EditorSession, SessionEvent};
pub use store::CueStore;
pub use timing::TimingField;
pub use tracker::{ActiveCue, ScrollCommand};
