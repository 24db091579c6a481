use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::{
    cli::ReplayCmd,
    clock::ManualClock,
    config::Config,
    model::{Cue, CueData, CueId},
    session::{EditorSession, SessionEvent},
    time::format_timestamp,
    timing::TimingField,
};

/// A scripted editing session. Cue references are indices into the ordered
/// list as it stands when the step runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub cues: Vec<CueData>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Type {
        cue: usize,
        text: String,
    },
    Blur,
    Swap {
        cue: usize,
    },
    EditTiming {
        cue: usize,
        field: TimingField,
        value: String,
    },
    Add,
    Delete {
        cue: usize,
    },
    Playback {
        time: f64,
    },
    UserScroll,
    Advance {
        ms: u64,
    },
    Close,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Type { .. } => "type",
            Step::Blur => "blur",
            Step::Swap { .. } => "swap",
            Step::EditTiming { .. } => "edit_timing",
            Step::Add => "add",
            Step::Delete { .. } => "delete",
            Step::Playback { .. } => "playback",
            Step::UserScroll => "user_scroll",
            Step::Advance { .. } => "advance",
            Step::Close => "close",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub schema: String,
    pub version: u32,
    pub loaded: usize,
    pub dropped: usize,
    pub cues: Vec<CueData>,
    pub events: Vec<StepEvent>,
    pub rejected_steps: Vec<RejectedStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepEvent {
    pub step: usize,
    #[serde(flatten)]
    pub event: SessionEvent,
}

/// A step the editor refused; the session carried on.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedStep {
    pub step: usize,
    pub op: String,
    pub error: String,
}

pub fn run_replay(cmd: ReplayCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!("replay", script = cmd.script.as_str());
    let _g = span.enter();

    let raw = read_input_to_string(&cmd.script)?;
    tracing::info!(bytes = raw.len(), "read script");

    let script: Script = serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing replay script: {}", cmd.script))?;

    let report = replay_script(script, cfg)?;
    log_report_summary(&report);

    let rendered = if cfg.output.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    if cmd.stdout {
        println!("{rendered}");
        tracing::info!(mode = "stdout", "wrote report");
        return Ok(());
    }

    let out_path = derive_output_path(&cmd)?;
    write_output(&out_path, &rendered, cmd.overwrite)?;
    tracing::info!(path = out_path.as_str(), "wrote report file");

    Ok(())
}

/// Runs `script` against a fresh session on a manual clock.
pub fn replay_script(script: Script, cfg: &Config) -> Result<ReplayReport> {
    let mut session = EditorSession::new(&cfg.editor, ManualClock::new());
    let summary = session.load(script.cues);

    let mut events = Vec::new();
    let mut rejected_steps = Vec::new();

    for (i, step) in script.steps.into_iter().enumerate() {
        let op = step.name();
        tracing::debug!(step = i, op, "replaying step");

        let outcome = match step {
            Step::Type { cue, text } => {
                let id = cue_at(&session, cue, i)?;
                session.type_text(id, text).map(|_| ())
            }
            Step::Blur => {
                session.blur();
                Ok(())
            }
            Step::Swap { cue } => {
                let id = cue_at(&session, cue, i)?;
                session.swap_to(id);
                Ok(())
            }
            Step::EditTiming { cue, field, value } => {
                let id = cue_at(&session, cue, i)?;
                session.edit_timing(id, field, &value).map(|_| ())
            }
            Step::Add => session.add_cue().map(|_| ()),
            Step::Delete { cue } => {
                let id = cue_at(&session, cue, i)?;
                session.delete_cue(id).map(|_| ())
            }
            Step::Playback { time } => {
                session.on_playback_time(time);
                Ok(())
            }
            Step::UserScroll => {
                session.on_user_scroll();
                Ok(())
            }
            Step::Advance { ms } => {
                session.clock().advance(Duration::from_millis(ms));
                session.poll();
                Ok(())
            }
            Step::Close => {
                session.close();
                Ok(())
            }
        };

        if let Err(err) = outcome {
            tracing::info!(step = i, op, error = %err, "step rejected");
            rejected_steps.push(RejectedStep {
                step: i,
                op: op.to_string(),
                error: err.to_string(),
            });
        }

        events.extend(
            session
                .drain_events()
                .into_iter()
                .map(|event| StepEvent { step: i, event }),
        );
    }

    log_cue_samples(session.store().list());

    Ok(ReplayReport {
        schema: "cuedit.replay".to_string(),
        version: 1,
        loaded: summary.kept,
        dropped: summary.dropped,
        cues: session.export(),
        events,
        rejected_steps,
    })
}

fn cue_at(session: &EditorSession<ManualClock>, index: usize, step: usize) -> Result<CueId> {
    session
        .store()
        .list()
        .get(index)
        .map(|c| c.id)
        .ok_or_else(|| {
            anyhow!(
                "step {step}: no cue at index {index} (list has {})",
                session.store().len()
            )
        })
}

fn read_input_to_string(input: &str) -> Result<String> {
    if input == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed reading script: {input}"))
    }
}

fn log_report_summary(r: &ReplayReport) {
    tracing::info!(
        cues = r.cues.len(),
        events = r.events.len(),
        rejected = r.rejected_steps.len(),
        "replay summary"
    );
}

fn log_cue_samples(cues: &[Cue]) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        for (i, c) in cues.iter().enumerate() {
            tracing::debug!(
                idx = i,
                id = %c.id,
                start = %format_timestamp(c.start_ms),
                end = %format_timestamp(c.end_ms),
                chars = c.text.chars().count(),
                "cue"
            );
        }
    }
}

fn derive_output_path(cmd: &ReplayCmd) -> Result<String> {
    if let Some(o) = &cmd.output {
        return Ok(o.clone());
    }

    if cmd.script == "-" {
        return Err(anyhow!(
            "output path required when script is stdin and --stdout is not set"
        ));
    }

    let p = Path::new(&cmd.script);
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("bad script filename"))?;

    let parent = p.parent().unwrap_or_else(|| Path::new("."));
    let out = parent.join(format!("{stem}.report.json"));
    Ok(out.to_string_lossy().to_string())
}

fn write_output(path: &str, data: &str, overwrite: bool) -> Result<()> {
    if Path::new(path).exists() && !overwrite {
        return Err(anyhow!(
            "refusing to overwrite existing file (pass --overwrite): {path}"
        ));
    }
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_defaults_next_to_script() {
        let cmd = ReplayCmd {
            script: "sessions/demo.json".to_string(),
            output: None,
            stdout: false,
            overwrite: false,
        };
        let path = derive_output_path(&cmd).unwrap();
        assert_eq!(Path::new(&path), Path::new("sessions/demo.report.json"));
    }

    #[test]
    fn stdin_script_needs_explicit_output() {
        let cmd = ReplayCmd {
            script: "-".to_string(),
            output: None,
            stdout: false,
            overwrite: false,
        };
        assert!(derive_output_path(&cmd).is_err());
    }

    #[test]
    fn refuses_to_clobber_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let path = path.to_str().unwrap();

        write_output(path, "{}", false).unwrap();
        assert!(write_output(path, "{}", false).is_err());
        write_output(path, "[]", true).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn bad_index_is_a_script_error() {
        let script: Script =
            serde_json::from_str(r#"{"cues": [], "steps": [{"op": "delete", "cue": 0}]}"#).unwrap();
        let err = replay_script(script, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("no cue at index 0"));
    }
}
