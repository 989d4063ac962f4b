use serde::Serialize;

use super::context::JobDraftContext;
use super::draft::{JobDraft, SessionRecord};
use super::state::{Event, EventKind, State, StateMachine, Transition};
use crate::config::JobDraftConfig;

/// Read-only view of the machine handed to the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub name: State,
    pub context: JobDraftContext,
}

impl Snapshot {
    pub fn matches(&self, state: State) -> bool {
        self.name == state
    }
}

type TransitionListener = Box<dyn FnMut(&Snapshot, &Transition)>;
type IgnoredListener = Box<dyn FnMut(State, EventKind)>;

/// The job-creation form machine, owned by one mounted form.
///
/// Events are processed one at a time to completion. The context can only
/// change through [`JobCreationMachine::send`].
pub struct JobCreationMachine {
    draft: JobDraft,
    warn_on_ignored: bool,
    listeners: Vec<TransitionListener>,
    ignored_listener: Option<IgnoredListener>,
}

impl Default for JobCreationMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl JobCreationMachine {
    pub fn new() -> Self {
        Self::with_config(&JobDraftConfig::default())
    }

    pub fn with_config(config: &JobDraftConfig) -> Self {
        Self {
            draft: JobDraft::new(config.history_limit),
            warn_on_ignored: config.warn_on_ignored,
            listeners: Vec::new(),
            ignored_listener: None,
        }
    }

    /// Dispatch an event. Unaccepted events are dropped silently unless a
    /// diagnostic hook is installed.
    pub fn send(&mut self, event: Event) -> Transition {
        let transition = StateMachine::next(&mut self.draft, event);

        if let Transition::Ignored { state, event } = transition {
            if self.warn_on_ignored {
                tracing::warn!(draft_id = %self.draft.id, %state, %event, "event ignored");
            } else {
                tracing::trace!(draft_id = %self.draft.id, %state, %event, "event ignored");
            }
            if let Some(listener) = self.ignored_listener.as_mut() {
                listener(state, event);
            }
            return transition;
        }

        match &transition {
            Transition::Taken { from, to, action } => {
                tracing::debug!(
                    draft_id = %self.draft.id,
                    %from,
                    %to,
                    action = ?action,
                    "transition"
                );
            }
            Transition::ContextOnly { state, action } => {
                tracing::debug!(draft_id = %self.draft.id, %state, %action, "context updated");
            }
            Transition::Ignored { .. } => {}
        }

        if !self.listeners.is_empty() {
            let snapshot = self.get_state();
            for listener in &mut self.listeners {
                listener(&snapshot, &transition);
            }
        }

        transition
    }

    /// Current state name and an owned copy of the context.
    pub fn get_state(&self) -> Snapshot {
        Snapshot {
            name: self.draft.state,
            context: self.draft.context.clone(),
        }
    }

    pub fn state(&self) -> State {
        self.draft.state
    }

    pub fn context(&self) -> &JobDraftContext {
        &self.draft.context
    }

    pub fn draft(&self) -> &JobDraft {
        &self.draft
    }

    pub fn can(&self, kind: EventKind) -> bool {
        StateMachine::accepts(self.draft.state, kind)
    }

    /// Register a callback run after every accepted event.
    pub fn on_transition(&mut self, listener: impl FnMut(&Snapshot, &Transition) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Register a callback run for every dropped event, replacing any previous one.
    pub fn on_ignored(&mut self, listener: impl FnMut(State, EventKind) + 'static) {
        self.ignored_listener = Some(Box::new(listener));
    }

    pub fn session_record(&self) -> SessionRecord {
        SessionRecord::from_draft(&self.draft)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::state_machine::{JobDescriptor, ModelTreeNode};

    fn job(name: &str) -> JobDescriptor {
        serde_json::from_value(json!({ "name": name, "gpus": 1 })).unwrap()
    }

    #[test]
    fn edit_sequence_walks_expected_path() {
        let mut machine = JobCreationMachine::new();
        machine.send(Event::ModelTreeFetched {
            tree: vec![ModelTreeNode(json!({ "id": "llama" }))],
        });

        let mut path = vec![machine.state()];
        for event in [
            Event::ModelChanged,
            Event::UserEditing,
            Event::ModelChanged,
            Event::Reset,
        ] {
            machine.send(event);
            path.push(machine.state());
        }

        assert_eq!(
            path,
            vec![
                State::Init,
                State::AutoFilled,
                State::UserEditing,
                State::EditFilled,
                State::Init
            ]
        );
        assert_eq!(machine.get_state().context, JobDraftContext::default());
    }

    #[test]
    fn rerun_after_reset_keeps_no_residue() {
        let mut machine = JobCreationMachine::new();
        machine.send(Event::ApiRerun { job: job("j1") });
        machine.send(Event::Reset);
        machine.send(Event::ApiRerun { job: job("j2") });

        let snapshot = machine.get_state();
        assert!(snapshot.matches(State::RerunFilled));
        assert_eq!(snapshot.context.job, job("j2"));
    }

    #[test]
    fn listeners_see_accepted_events_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let ignored = Rc::new(RefCell::new(Vec::new()));

        let mut machine = JobCreationMachine::new();
        let sink = Rc::clone(&seen);
        machine.on_transition(move |snapshot, _| sink.borrow_mut().push(snapshot.name));
        let sink = Rc::clone(&ignored);
        machine.on_ignored(move |state, event| sink.borrow_mut().push((state, event)));

        machine.send(Event::UserEditing);
        machine.send(Event::QueryModelId {
            model_id: "m1".into(),
            model_version_handler: "h1".into(),
        });
        machine.send(Event::ModelChanged);
        machine.send(Event::UserEditing);

        assert_eq!(
            *seen.borrow(),
            vec![State::AutoFilledByModelId, State::UserEditing]
        );
        assert_eq!(
            *ignored.borrow(),
            vec![
                (State::Init, EventKind::UserEditing),
                (State::AutoFilledByModelId, EventKind::ModelChanged)
            ]
        );
        assert_eq!(machine.draft().ignored_count, 2);
        assert_eq!(machine.draft().accepted_count, 2);
    }

    #[test]
    fn snapshot_is_detached_from_machine() {
        let mut machine = JobCreationMachine::new();
        let mut snapshot = machine.get_state();
        snapshot.context.model_id = "tampered".into();

        assert_eq!(machine.context().model_id, "");
        machine.send(Event::ModelChanged);
        assert_eq!(snapshot.name, State::Init);
    }

    #[test]
    fn query_model_id_stable_until_reset() {
        let mut machine = JobCreationMachine::new();
        machine.send(Event::QueryModelId {
            model_id: "m1".into(),
            model_version_handler: "h1".into(),
        });
        machine.send(Event::UserEditing);
        machine.send(Event::ModelChanged);
        machine.send(Event::ModelChanged);
        assert_eq!(machine.state(), State::EditFilled);
        assert_eq!(machine.context().model_id, "m1");
        assert_eq!(machine.context().model_version_handler, "h1");

        // QUERYMODELID is only accepted from init.
        machine.send(Event::QueryModelId {
            model_id: "m2".into(),
            model_version_handler: "h2".into(),
        });
        assert_eq!(machine.context().model_id, "m1");

        machine.send(Event::Reset);
        assert_eq!(machine.context().model_id, "");
    }

    #[test]
    fn can_reflects_current_state() {
        let mut machine = JobCreationMachine::new();
        assert!(machine.can(EventKind::QueryModelId));
        assert!(!machine.can(EventKind::UserEditing));

        machine.send(Event::ApiRerun { job: job("j") });
        assert!(machine.can(EventKind::UserEditing));
        assert!(!machine.can(EventKind::ApiRerun));
        assert!(machine.can(EventKind::Reset));
    }

    #[test]
    fn warn_on_ignored_still_drops_event() {
        let config = JobDraftConfig {
            warn_on_ignored: true,
            ..Default::default()
        };
        let mut machine = JobCreationMachine::with_config(&config);
        machine.send(Event::ApiRerun { job: job("j1") });
        let before = machine.get_state();
        let updated_at = machine.draft().updated_at;

        let t = machine.send(Event::ModelChanged);

        assert_eq!(
            t,
            Transition::Ignored {
                state: State::RerunFilled,
                event: EventKind::ModelChanged
            }
        );
        assert_eq!(machine.get_state(), before);
        assert_eq!(machine.draft().updated_at, updated_at);
        assert_eq!(machine.draft().history.len(), 1);
        assert_eq!(machine.draft().ignored_count, 1);
    }

    #[test]
    fn history_limit_comes_from_config() {
        let config = JobDraftConfig {
            history_limit: 3,
            ..Default::default()
        };
        let mut machine = JobCreationMachine::with_config(&config);
        for _ in 0..5 {
            machine.send(Event::Reset);
        }
        assert_eq!(machine.draft().history.len(), 3);
        assert_eq!(machine.session_record().accepted_events, 5);
    }
}
