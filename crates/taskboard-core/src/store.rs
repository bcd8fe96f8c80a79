use chrono::Utc;
use taskboard_shared::{Task, TaskDraft, TaskFilters, TaskId, TaskPatch};
use tracing::{debug, info, instrument, warn};

use crate::api::TodoApi;
use crate::error::{FetchError, StoreError, ValidationError};
use crate::view::{self, Summary};

/// Authoritative in-memory list of todos, kept in step with a remote
/// service.
///
/// The list only changes after a round trip succeeds, and always takes the
/// service's answer over what was sent. Mutations borrow the store mutably,
/// so one store never has two round trips in flight.
pub struct TaskStore<A> {
    api: A,
    tasks: Vec<Task>,
    last_provisional: u64,
}

impl<A: TodoApi> TaskStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            last_provisional: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn summary(&self) -> Summary {
        view::summary(&self.tasks)
    }

    pub fn visible(&self, filters: &TaskFilters) -> Vec<&Task> {
        view::visible_tasks(&self.tasks, filters)
    }

    /// Replaces the whole list with the service's collection.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&[Task], FetchError> {
        let tasks = self.api.list().await?;
        info!(count = tasks.len(), "loaded todos");
        self.tasks = tasks;
        Ok(&self.tasks)
    }

    #[instrument(skip(self, draft), fields(text_len = draft.text.len(), priority = %draft.priority, category = %draft.category))]
    pub async fn create(&mut self, draft: TaskDraft) -> Result<&Task, StoreError> {
        if draft.text.trim().is_empty() {
            debug!("rejecting blank todo");
            return Err(ValidationError::EmptyText.into());
        }

        let provisional = Task::from_draft(self.next_provisional_id(), draft);
        let created = self.api.create(&provisional).await?;
        if self.get(&created.id).is_some() {
            warn!(id = %created.id, "service returned an id already in the list");
        }

        info!(provisional = %provisional.id, id = %created.id, "todo created");
        self.tasks.push(created);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Sends `patch` merged over the local task; ids not in the list are
    /// rejected without a request.
    #[instrument(skip(self, id, patch), fields(id = %id))]
    pub async fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<&Task, StoreError> {
        let idx = self
            .position(id)
            .ok_or_else(|| ValidationError::UnknownTask(id.clone()))?;

        if patch.text.as_deref().is_some_and(|text| text.trim().is_empty()) {
            return Err(ValidationError::EmptyText.into());
        }

        let body = self.tasks[idx].merged(&patch);
        let updated = self.api.update(id, &body).await?;
        if &updated.id != id {
            warn!(sent = %id, returned = %updated.id, "service changed todo id on update");
        }

        info!(completed = updated.completed, "todo updated");
        self.tasks[idx] = updated;
        Ok(&self.tasks[idx])
    }

    /// Flips `completed` based on the value held right now.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn toggle_completion(&mut self, id: &TaskId) -> Result<&Task, StoreError> {
        let current = self
            .get(id)
            .map(|task| task.completed)
            .ok_or_else(|| ValidationError::UnknownTask(id.clone()))?;

        self.update(id, TaskPatch::completed(!current)).await
    }

    /// Deletes remotely, then drops the local copy if there is one.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn remove(&mut self, id: &TaskId) -> Result<Option<Task>, FetchError> {
        if self.position(id).is_none() {
            debug!("deleting id not present locally");
        }

        self.api.delete(id).await?;

        let removed = self.position(id).map(|idx| self.tasks.remove(idx));
        info!(removed_locally = removed.is_some(), "todo deleted");
        Ok(removed)
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| &task.id == id)
    }

    fn next_provisional_id(&mut self) -> TaskId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let highest_known = self
            .tasks
            .iter()
            .filter_map(|task| task.id.as_u64())
            .max()
            .unwrap_or_default();

        let next = now.max(highest_known.saturating_add(1)).max(self.last_provisional.saturating_add(1));
        self.last_provisional = next;
        TaskId::number(next)
    }
}
