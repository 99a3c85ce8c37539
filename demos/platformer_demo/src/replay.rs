//! Headless input scripts.
//!
//! A script is a JSON array of steps, each holding the controls to press and
//! how many ticks to hold them:
//!
//! ```json
//! [{ "right": true, "ticks": 30 }, { "jump": true }, { "ticks": 60 }]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use pixelhop::{InputSnapshot, PlayerBody};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScriptStep {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub restart: bool,
    #[serde(default = "one")]
    pub ticks: u32,
}

fn one() -> u32 {
    1
}

impl ScriptStep {
    fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
            jump: self.jump,
            restart: self.restart,
            quit: false,
        }
    }
}

/// Expand a script into one snapshot per tick.
///
/// `jump` is edge-triggered and fires only on the first tick of its step; every
/// other control is held for the whole step.
pub fn expand(steps: &[ScriptStep]) -> Vec<InputSnapshot> {
    let mut frames = Vec::new();
    for step in steps {
        let held = step.snapshot();
        for tick in 0..step.ticks {
            let mut frame = held;
            if tick > 0 {
                frame.jump = false;
            }
            frames.push(frame);
        }
    }
    frames
}

pub fn parse_script(json: &str) -> Result<Vec<InputSnapshot>> {
    let steps: Vec<ScriptStep> = serde_json::from_str(json).context("parsing input script")?;
    Ok(expand(&steps))
}

pub fn load_script(path: &Path) -> Result<Vec<InputSnapshot>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading input script {}", path.display()))?;
    parse_script(&json)
}

/// Final state printed after a replay.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub ticks: u64,
    pub player: PlayerBody,
    pub camera_offset: pixelhop::Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_expand_per_tick() {
        let frames =
            parse_script(r#"[{ "right": true, "ticks": 3 }, { "jump": true, "ticks": 2 }, {}]"#)
                .unwrap();
        assert_eq!(frames.len(), 6);
        assert!(frames[..3].iter().all(|f| f.right && !f.jump));
        assert!(frames[3].jump);
        assert!(!frames[4].jump);
        assert_eq!(frames[5], InputSnapshot::idle());
    }

    #[test]
    fn restart_is_held_for_the_whole_step() {
        let frames = parse_script(r#"[{ "restart": true, "jump": true, "ticks": 3 }]"#).unwrap();
        assert!(frames.iter().all(|f| f.restart));
        assert_eq!(frames.iter().filter(|f| f.jump).count(), 1);
    }

    #[test]
    fn zero_tick_step_is_skipped() {
        let frames = parse_script(r#"[{ "left": true, "ticks": 0 }]"#).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn bad_script_is_an_error() {
        assert!(parse_script(r#"{ "right": true }"#).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, r#"[{ "left": true, "ticks": 2 }]"#).unwrap();
        assert_eq!(load_script(&path).unwrap(), vec![InputSnapshot::left(); 2]);
    }
}
