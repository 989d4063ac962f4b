use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::state::{Action, Event};

/// A node of the model tree shown in the model picker.
///
/// The machine never looks inside a node; it only stores the tree it was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelTreeNode(pub Value);

/// A job as returned by the job API, used to prefill the form on rerun.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobDescriptor(pub Map<String, Value>);

impl JobDescriptor {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Map<String, Value>> for JobDescriptor {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Extended state of the job-creation form.
///
/// `Default` is the value `RESET` restores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraftContext {
    pub model_tree: Vec<ModelTreeNode>,
    pub job: JobDescriptor,
    pub model_id: String,
    pub model_version_handler: String,
}

impl JobDraftContext {
    /// Run an assignment action against the event that triggered it.
    ///
    /// Every action replaces whole fields from the event payload. An action
    /// paired with an event that carries no matching payload leaves the
    /// context as it was.
    pub fn apply(self, action: Action, event: Event) -> Self {
        match (action, event) {
            (Action::SetJob, Event::ApiRerun { job }) => Self { job, ..self },
            (Action::SetTree, Event::ModelTreeFetched { tree }) => Self {
                model_tree: tree,
                ..self
            },
            (
                Action::SetQueryModelId,
                Event::QueryModelId {
                    model_id,
                    model_version_handler,
                },
            ) => Self {
                model_id,
                model_version_handler,
                ..self
            },
            (Action::Reset, _) => Self::default(),
            (_, _) => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(value: Value) -> JobDescriptor {
        match value {
            Value::Object(map) => JobDescriptor::from(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn default_is_reset_value() {
        let ctx = JobDraftContext::default();
        assert_eq!(
            serde_json::to_value(&ctx).unwrap(),
            json!({ "modelTree": [], "job": {}, "modelId": "", "modelVersionHandler": "" })
        );
    }

    #[test]
    fn set_job_replaces_whole_job() {
        let ctx = JobDraftContext {
            job: job(json!({ "name": "old", "cpu": 2 })),
            ..Default::default()
        };
        let next = ctx.apply(
            Action::SetJob,
            Event::ApiRerun {
                job: job(json!({ "name": "new" })),
            },
        );
        assert_eq!(next.job, job(json!({ "name": "new" })));
        assert!(!next.job.is_empty());
        assert!(next.job.get("cpu").is_none());
    }

    #[test]
    fn set_tree_leaves_other_fields() {
        let ctx = JobDraftContext {
            model_id: "m1".into(),
            ..Default::default()
        };
        let tree = vec![ModelTreeNode(json!({ "id": "resnet", "children": [] }))];
        let next = ctx.apply(Action::SetTree, Event::ModelTreeFetched { tree: tree.clone() });
        assert_eq!(next.model_tree, tree);
        assert_eq!(next.model_id, "m1");
    }

    #[test]
    fn set_query_model_id_sets_both_fields() {
        let next = JobDraftContext::default().apply(
            Action::SetQueryModelId,
            Event::QueryModelId {
                model_id: "m1".into(),
                model_version_handler: "h1".into(),
            },
        );
        assert_eq!(next.model_id, "m1");
        assert_eq!(next.model_version_handler, "h1");
    }

    #[test]
    fn reset_clears_everything() {
        let ctx = JobDraftContext {
            model_tree: vec![ModelTreeNode(json!("node"))],
            job: job(json!({ "name": "j" })),
            model_id: "m".into(),
            model_version_handler: "h".into(),
        };
        let next = ctx.apply(Action::Reset, Event::Reset);
        assert!(next.job.is_empty());
        assert_eq!(next, JobDraftContext::default());
    }

    #[test]
    fn mismatched_payload_is_noop() {
        let ctx = JobDraftContext {
            model_id: "keep".into(),
            ..Default::default()
        };
        let next = ctx.clone().apply(Action::SetJob, Event::ModelChanged);
        assert_eq!(next, ctx);
    }
}
