mod context;
mod draft;
mod machine;
mod state;

pub use context::{JobDescriptor, JobDraftContext, ModelTreeNode};
pub use draft::{DEFAULT_HISTORY_LIMIT, JobDraft, SessionRecord, TransitionRecord};
pub use machine::{JobCreationMachine, Snapshot};
pub use state::{Action, Event, EventKind, State, StateMachine, TableRow, Target, Transition};
