use thiserror::Error;

use super::{
    categories::Category,
    task::{BatchTask, TaskState, TaskStatus},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskStoreError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),
    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),
    #[error("Task {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
}

/// Ordered task records for one run. [`TaskStore::update`] is the only way
/// to change a record.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<BatchTask>,
    completed: usize,
}

impl TaskStore {
    pub fn new(categories: &[Category]) -> Result<Self, TaskStoreError> {
        let mut tasks: Vec<BatchTask> = Vec::with_capacity(categories.len());
        for category in categories {
            if tasks.iter().any(|t| t.id == category.api_value) {
                return Err(TaskStoreError::DuplicateTask(category.api_value.clone()));
            }
            tasks.push(BatchTask::pending(&category.api_value, &category.name));
        }
        Ok(Self { tasks, completed: 0 })
    }

    /// Apply a transition and return the new snapshot.
    ///
    /// `DONE -> DONE` is accepted as a re-delivery: the stored result is kept
    /// and the completed count does not move.
    pub fn update(&mut self, id: &str, state: TaskState) -> Result<BatchTask, TaskStoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TaskStoreError::UnknownTask(id.to_string()))?;

        let from = task.status();
        let to = state.status();

        if from == TaskStatus::Done && to == TaskStatus::Done {
            tracing::debug!("[BATCH] Ignoring repeated DONE for task {}", id);
            return Ok(task.clone());
        }
        if !from.can_transition_to(to) {
            return Err(TaskStoreError::InvalidTransition {
                id: id.to_string(),
                from,
                to,
            });
        }

        task.state = state;
        let snapshot = task.clone();
        if to == TaskStatus::Done {
            self.completed += 1;
        }
        Ok(snapshot)
    }

    pub fn get(&self, id: &str) -> Option<&BatchTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[BatchTask] {
        &self.tasks
    }

    /// Owned copy of every record, in category order
    pub fn snapshot(&self) -> Vec<BatchTask> {
        self.tasks.clone()
    }

    pub fn into_tasks(self) -> Vec<BatchTask> {
        self.tasks
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn failed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status() == TaskStatus::Error)
            .count()
    }
}
