use std::fmt;
use std::str::FromStr;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::{JobDescriptor, JobDraftContext, ModelTreeNode};
use super::draft::JobDraft;
use crate::error::JobDraftError;

/// The six states of the job-creation form.
///
/// Every session starts in `Init`. There is no terminal state: `RESET`
/// returns to `Init` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum State {
    Init,
    AutoFilled,
    RerunFilled,
    UserEditing,
    EditFilled,
    AutoFilledByModelId,
}

impl State {
    pub const ALL: [State; 6] = [
        State::Init,
        State::AutoFilled,
        State::RerunFilled,
        State::UserEditing,
        State::EditFilled,
        State::AutoFilledByModelId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            State::Init => "init",
            State::AutoFilled => "autoFilled",
            State::RerunFilled => "rerunFilled",
            State::UserEditing => "userEditing",
            State::EditFilled => "editFilled",
            State::AutoFilledByModelId => "autoFilledByModelId",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = JobDraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        State::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| JobDraftError::UnknownState(s.to_string()))
    }
}

/// Event tag without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    ModelChanged,
    UserEditing,
    ApiRerun,
    ModelTreeFetched,
    Reset,
    QueryModelId,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::ModelChanged,
        EventKind::UserEditing,
        EventKind::ApiRerun,
        EventKind::ModelTreeFetched,
        EventKind::Reset,
        EventKind::QueryModelId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ModelChanged => "MODELCHANGED",
            EventKind::UserEditing => "USEREDITING",
            EventKind::ApiRerun => "APIRERUN",
            EventKind::ModelTreeFetched => "MODELTREEFETCHED",
            EventKind::Reset => "RESET",
            EventKind::QueryModelId => "QUERYMODELID",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event dispatched by the form or by a data-fetching callback.
///
/// On the wire: `{ "type": "APIRERUN", "payload": { "job": {...} } }`.
/// A missing or `null` payload, and missing or `null` payload fields, read
/// as empty values. Events without a payload ignore whatever `payload` holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "UPPERCASE")]
pub enum Event {
    ModelChanged,
    UserEditing,
    ApiRerun {
        job: JobDescriptor,
    },
    ModelTreeFetched {
        tree: Vec<ModelTreeNode>,
    },
    Reset,
    #[serde(rename_all = "camelCase")]
    QueryModelId {
        model_id: String,
        model_version_handler: String,
    },
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: EventKind,
    #[serde(default)]
    payload: Option<Value>,
}

#[derive(Default, Deserialize)]
struct RerunPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    job: JobDescriptor,
}

#[derive(Default, Deserialize)]
struct TreePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    tree: Vec<ModelTreeNode>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryModelIdPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    model_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    model_version_handler: String,
}

fn payload<T: DeserializeOwned + Default>(value: Option<Value>) -> serde_json::Result<T> {
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value),
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEvent::deserialize(deserializer)?;
        let event = match raw.kind {
            EventKind::ModelChanged => Event::ModelChanged,
            EventKind::UserEditing => Event::UserEditing,
            EventKind::Reset => Event::Reset,
            EventKind::ApiRerun => {
                let RerunPayload { job } = payload(raw.payload).map_err(de::Error::custom)?;
                Event::ApiRerun { job }
            }
            EventKind::ModelTreeFetched => {
                let TreePayload { tree } = payload(raw.payload).map_err(de::Error::custom)?;
                Event::ModelTreeFetched { tree }
            }
            EventKind::QueryModelId => {
                let QueryModelIdPayload {
                    model_id,
                    model_version_handler,
                } = payload(raw.payload).map_err(de::Error::custom)?;
                Event::QueryModelId {
                    model_id,
                    model_version_handler,
                }
            }
        };
        Ok(event)
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ModelChanged => EventKind::ModelChanged,
            Event::UserEditing => EventKind::UserEditing,
            Event::ApiRerun { .. } => EventKind::ApiRerun,
            Event::ModelTreeFetched { .. } => EventKind::ModelTreeFetched,
            Event::Reset => EventKind::Reset,
            Event::QueryModelId { .. } => EventKind::QueryModelId,
        }
    }
}

/// Context assignment run as part of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    SetJob,
    SetTree,
    SetQueryModelId,
    Reset,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SetJob => write!(f, "setJob"),
            Action::SetTree => write!(f, "setTree"),
            Action::SetQueryModelId => write!(f, "setQueryModelId"),
            Action::Reset => write!(f, "reset"),
        }
    }
}

/// Where an accepted event leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Enter the given state (possibly the current one), running the action if any.
    State(State, Option<Action>),
    /// Keep the current state; only the action runs.
    Stay(Action),
}

impl Target {
    pub fn action(self) -> Option<Action> {
        match self {
            Target::State(_, action) => action,
            Target::Stay(action) => Some(action),
        }
    }
}

/// The result of sending one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Transition {
    /// The event moved the machine, including self-transitions.
    Taken {
        from: State,
        to: State,
        action: Option<Action>,
    },
    /// The event updated the context without leaving the state.
    ContextOnly { state: State, action: Action },
    /// The event is not accepted in this state; nothing changed.
    Ignored { state: State, event: EventKind },
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored { .. })
    }

    /// State the machine is in after this transition.
    pub fn state(&self) -> State {
        match self {
            Transition::Taken { to, .. } => *to,
            Transition::ContextOnly { state, .. } | Transition::Ignored { state, .. } => *state,
        }
    }
}

/// One accepted row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub source: State,
    pub event: EventKind,
    /// `None` means the state does not change.
    pub target: Option<State>,
    pub action: Option<Action>,
}

/// Drives a `JobDraft` through the job-creation form states.
pub struct StateMachine;

impl StateMachine {
    /// Look up the transition for `kind` in `state`.
    ///
    /// `RESET` and `MODELTREEFETCHED` apply in every state and are checked
    /// before the per-state rows. `None` means the event is dropped.
    pub fn resolve(state: State, kind: EventKind) -> Option<Target> {
        use EventKind as E;
        use State as S;

        match (state, kind) {
            (_, E::Reset) => Some(Target::State(S::Init, Some(Action::Reset))),
            (_, E::ModelTreeFetched) => Some(Target::Stay(Action::SetTree)),

            (S::Init, E::ModelChanged) => Some(Target::State(S::AutoFilled, None)),
            (S::Init, E::ApiRerun) => Some(Target::State(S::RerunFilled, Some(Action::SetJob))),
            (S::Init, E::QueryModelId) => Some(Target::State(
                S::AutoFilledByModelId,
                Some(Action::SetQueryModelId),
            )),

            (S::AutoFilled, E::ApiRerun) => {
                Some(Target::State(S::RerunFilled, Some(Action::SetJob)))
            }
            (S::AutoFilled, E::UserEditing) => Some(Target::State(S::UserEditing, None)),

            (S::AutoFilledByModelId, E::UserEditing) => Some(Target::State(S::UserEditing, None)),
            (S::AutoFilledByModelId, E::ApiRerun) => {
                Some(Target::State(S::RerunFilled, Some(Action::SetJob)))
            }

            (S::UserEditing, E::ModelChanged) => Some(Target::State(S::EditFilled, None)),
            (S::EditFilled, E::ModelChanged) => Some(Target::State(S::EditFilled, None)),

            (S::RerunFilled, E::UserEditing) => Some(Target::State(S::UserEditing, None)),

            _ => None,
        }
    }

    /// Whether sending `kind` in `state` would have any effect.
    pub fn accepts(state: State, kind: EventKind) -> bool {
        Self::resolve(state, kind).is_some()
    }

    /// Every accepted `(state, event)` pair, in declaration order.
    pub fn table() -> Vec<TableRow> {
        State::ALL
            .into_iter()
            .flat_map(|source| EventKind::ALL.into_iter().map(move |event| (source, event)))
            .filter_map(|(source, event)| {
                Self::resolve(source, event).map(|target| TableRow {
                    source,
                    event,
                    target: match target {
                        Target::State(to, _) => Some(to),
                        Target::Stay(_) => None,
                    },
                    action: target.action(),
                })
            })
            .collect()
    }

    /// Pure form of a step: the state and context after `event`.
    pub fn transition(
        state: State,
        context: JobDraftContext,
        event: Event,
    ) -> (State, JobDraftContext) {
        let Some(target) = Self::resolve(state, event.kind()) else {
            return (state, context);
        };
        let context = match target.action() {
            Some(action) => context.apply(action, event),
            None => context,
        };
        let state = match target {
            Target::State(to, _) => to,
            Target::Stay(_) => state,
        };
        (state, context)
    }

    /// Apply `event` to the draft and report what happened.
    ///
    /// Ignored events leave state, context, history and `updated_at` untouched.
    pub fn next(draft: &mut JobDraft, event: Event) -> Transition {
        let from = draft.state;
        let kind = event.kind();

        let Some(target) = Self::resolve(from, kind) else {
            draft.ignored_count += 1;
            return Transition::Ignored {
                state: from,
                event: kind,
            };
        };

        if let Some(action) = target.action() {
            let context = std::mem::take(&mut draft.context);
            draft.context = context.apply(action, event);
        }

        let transition = match target {
            Target::State(to, action) => {
                draft.state = to;
                Transition::Taken { from, to, action }
            }
            Target::Stay(action) => Transition::ContextOnly {
                state: from,
                action,
            },
        };

        draft.record(from, draft.state, kind);
        transition
    }
}
