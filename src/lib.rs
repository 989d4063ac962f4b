//! State machine for the job-creation form of an ML platform console.
//!
//! The form holds a [`JobCreationMachine`](state_machine::JobCreationMachine),
//! dispatches events as the user picks models, edits fields or reruns a past
//! job, and reads back the current state and context to decide what to render.

pub mod cli;
pub mod config;
pub mod error;
pub mod script;
pub mod state_machine;
pub mod ui;
