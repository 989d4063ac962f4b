//! Event scripts: recorded sequences of form events replayed through a machine.
//!
//! JSON scripts are either a bare array of events or `{ "events": [...] }`.
//! TOML scripts use `[[events]]` tables with a `type` key and an optional
//! `[events.payload]` table.

use std::path::Path;

use serde::Deserialize;

use crate::error::JobDraftError;
use crate::state_machine::{Event, JobCreationMachine, Transition};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventScript {
    pub events: Vec<Event>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonScript {
    Bare(Vec<Event>),
    Wrapped(EventScript),
}

impl EventScript {
    pub fn load(path: &Path) -> Result<Self, JobDraftError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let script = match extension.as_deref() {
            Some("json") => Self::from_json(&std::fs::read_to_string(path)?)?,
            Some("toml") => Self::from_toml(&std::fs::read_to_string(path)?)?,
            _ => return Err(JobDraftError::UnsupportedScript(path.to_path_buf())),
        };

        if script.events.is_empty() {
            return Err(JobDraftError::EmptyScript(path.to_path_buf()));
        }
        Ok(script)
    }

    pub fn from_json(contents: &str) -> Result<Self, JobDraftError> {
        Ok(match serde_json::from_str::<JsonScript>(contents)? {
            JsonScript::Bare(events) => Self { events },
            JsonScript::Wrapped(script) => script,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, JobDraftError> {
        Ok(toml::from_str(contents)?)
    }

    /// Send every event in order and collect the outcomes.
    pub fn replay(&self, machine: &mut JobCreationMachine) -> Vec<Transition> {
        self.events
            .iter()
            .cloned()
            .map(|event| machine.send(event))
            .collect()
    }
}
