//! Per-category task records and their status machine

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Gathering,
    Gathered,
    Processing,
    GeneratingImage,
    Composing,
    Uploading,
    SendingWebhook,
    Done,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Error)
    }

    /// Forward edges of the batch pipeline. `Error` is reachable from any
    /// non-terminal status; nothing leaves a terminal one.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;

        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (_, Error)
                | (Pending, Gathering)
                | (Gathering, Gathered)
                | (Gathered, Processing)
                | (Processing, GeneratingImage)
                | (Processing, Composing)
                | (GeneratingImage, Composing)
                | (Composing, Uploading)
                | (Uploading, SendingWebhook)
                | (SendingWebhook, Done)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Gathering => "GATHERING",
            TaskStatus::Gathered => "GATHERED",
            TaskStatus::Processing => "PROCESSING",
            TaskStatus::GeneratingImage => "GENERATING_IMAGE",
            TaskStatus::Composing => "COMPOSING",
            TaskStatus::Uploading => "UPLOADING",
            TaskStatus::SendingWebhook => "SENDING_WEBHOOK",
            TaskStatus::Done => "DONE",
            TaskStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a completed category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub headline: String,
    pub image_url: String,
    pub caption: String,
    pub source_url: String,
    pub source_name: String,
}

/// Status plus the data only that status may carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,
    Gathering,
    Gathered,
    Processing,
    GeneratingImage,
    Composing,
    Uploading,
    SendingWebhook,
    Done { result: TaskResult },
    Error { error: String },
}

impl TaskState {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::Gathering => TaskStatus::Gathering,
            TaskState::Gathered => TaskStatus::Gathered,
            TaskState::Processing => TaskStatus::Processing,
            TaskState::GeneratingImage => TaskStatus::GeneratingImage,
            TaskState::Composing => TaskStatus::Composing,
            TaskState::Uploading => TaskStatus::Uploading,
            TaskState::SendingWebhook => TaskStatus::SendingWebhook,
            TaskState::Done { .. } => TaskStatus::Done,
            TaskState::Error { .. } => TaskStatus::Error,
        }
    }

    pub fn failed(error: impl fmt::Display) -> Self {
        TaskState::Error {
            error: error.to_string(),
        }
    }
}

/// One category's progress through a run; serialized as a flat record
/// `{id, categoryName, status, error?, result?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTask {
    pub id: String,
    pub category_name: String,
    #[serde(flatten)]
    pub state: TaskState,
}

impl BatchTask {
    pub fn pending(id: impl Into<String>, category_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category_name: category_name.into(),
            state: TaskState::Pending,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.state.status()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            TaskState::Error { error } => Some(error),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&TaskResult> {
        match &self.state {
            TaskState::Done { result } => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn happy_path_edges_are_allowed() {
        use TaskStatus::*;
        let path = [
            Pending,
            Gathering,
            Gathered,
            Processing,
            GeneratingImage,
            Composing,
            Uploading,
            SendingWebhook,
            Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(Processing.can_transition_to(Composing));
    }

    #[test]
    fn terminal_states_are_closed() {
        use TaskStatus::*;
        assert!(!Done.can_transition_to(Error));
        assert!(!Error.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Done));
        assert!(!Gathered.can_transition_to(GeneratingImage));
        assert!(Uploading.can_transition_to(Error));
    }

    #[test]
    fn serializes_as_flat_record() {
        let task = BatchTask {
            id: "business".into(),
            category_name: "Business".into(),
            state: TaskState::Error {
                error: "No unused articles available".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            json!({
                "id": "business",
                "categoryName": "Business",
                "status": "ERROR",
                "error": "No unused articles available"
            })
        );

        let pending = serde_json::to_value(BatchTask::pending("top", "Top")).unwrap();
        assert_eq!(pending, json!({"id": "top", "categoryName": "Top", "status": "PENDING"}));
    }

    #[test]
    fn done_record_round_trips_with_result() {
        let raw = json!({
            "id": "science",
            "categoryName": "Science",
            "status": "DONE",
            "result": {
                "headline": "H",
                "imageUrl": "https://img/1.png",
                "caption": "C",
                "sourceUrl": "https://news/1",
                "sourceName": "Wire"
            }
        });
        let task: BatchTask = serde_json::from_value(raw).unwrap();
        assert_eq!(task.status(), TaskStatus::Done);
        assert_eq!(task.result().map(|r| r.image_url.as_str()), Some("https://img/1.png"));

        let generating: BatchTask =
            serde_json::from_value(json!({"id": "a", "categoryName": "A", "status": "GENERATING_IMAGE"})).unwrap();
        assert_eq!(generating.status(), TaskStatus::GeneratingImage);
    }
}
