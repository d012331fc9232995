//! Local mirror of the remote todo collection.
//!
//! # Design
//! `TodoStore` owns the ordered sequence of todos the UI renders, a
//! `TodoClient` and a `Transport`. Every mutation is exactly one request
//! followed by a reconciliation step, and local state is only touched after
//! a response has been parsed successfully. Failures are logged here, at the
//! call site, and handed back so the caller can surface them.
//!
//! Reconciliation per operation:
//! - create / update: refetch the whole list (`SyncMode::Refetch`) or apply
//!   the returned record (`SyncMode::ApplyResponse`); a failed refetch falls
//!   back to applying the returned record
//! - delete: drop the id locally, no refetch
//! - toggle: replace the one record with the server's copy

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{CreateTodo, Filter, Todo, TodoStatus, UpdateTodo};

/// How create and update reconcile local state after the server accepts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Follow the mutation with a full `load_all`.
    #[default]
    Refetch,
    /// Apply the record returned by the mutation directly.
    ApplyResponse,
}

/// Pending/completed totals over the local sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub pending: usize,
    pub completed: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.pending + self.completed
    }

    pub fn for_filter(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.total(),
            Filter::Pending => self.pending,
            Filter::Completed => self.completed,
        }
    }
}

pub struct TodoStore<T> {
    client: TodoClient,
    transport: T,
    sync_mode: SyncMode,
    todos: Vec<Todo>,
    loaded: bool,
}

impl<T: Transport> TodoStore<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self {
            client,
            transport,
            sync_mode: SyncMode::default(),
            todos: Vec::new(),
            loaded: false,
        }
    }

    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// False until the first `load_all` settles successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn filter(&self, filter: Filter) -> Vec<&Todo> {
        self.todos.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn counts(&self) -> Counts {
        self.todos.iter().fold(Counts::default(), |mut acc, t| {
            match t.status {
                TodoStatus::Pending => acc.pending += 1,
                TodoStatus::Completed => acc.completed += 1,
            }
            acc
        })
    }

    /// Replace local state with the full remote collection.
    pub fn load_all(&mut self) -> Result<(), ApiError> {
        let request = self.client.build_list_todos();
        let todos = self
            .transport
            .execute(request)
            .and_then(|response| self.client.parse_list_todos(response))
            .inspect_err(|e| error!(operation = "load_all", error = %e, "failed to fetch todos"))?;
        debug!(count = todos.len(), "loaded todos");
        self.todos = todos;
        self.loaded = true;
        Ok(())
    }

    /// Re-read one record and patch it into place, appending it if unknown.
    pub fn refresh(&mut self, id: &str) -> Result<(), ApiError> {
        let request = self.client.build_get_todo(id);
        let todo = self
            .transport
            .execute(request)
            .and_then(|response| self.client.parse_get_todo(response))
            .inspect_err(|e| error!(operation = "refresh", id, error = %e, "failed to fetch todo"))?;
        self.upsert(todo);
        Ok(())
    }

    pub fn create(&mut self, title: &str, description: &str) -> Result<(), ApiError> {
        ensure_title("create", title)?;
        let input = CreateTodo {
            title: title.to_string(),
            description: description.to_string(),
        };
        let created = self
            .client
            .build_create_todo(&input)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_create_todo(response))
            .inspect_err(|e| error!(operation = "create", error = %e, "failed to create todo"))?;
        debug!(id = %created.id, "created todo");
        self.reconcile(created)
    }

    /// Edit title and description. Status is never sent; the record keeps
    /// its old fields locally until reconciliation completes.
    pub fn update(&mut self, id: &str, title: &str, description: &str) -> Result<(), ApiError> {
        ensure_title("update", title)?;
        let input = UpdateTodo {
            title: title.to_string(),
            description: description.to_string(),
        };
        let updated = self
            .client
            .build_update_todo(id, &input)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_update_todo(response))
            .inspect_err(|e| error!(operation = "update", id, error = %e, "failed to update todo"))?;
        self.reconcile(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        let request = self.client.build_delete_todo(id);
        self.transport
            .execute(request)
            .and_then(|response| self.client.parse_delete_todo(response))
            .inspect_err(|e| error!(operation = "delete", id, error = %e, "failed to delete todo"))?;
        self.todos.retain(|t| t.id != id);
        Ok(())
    }

    pub fn toggle_status(&mut self, id: &str) -> Result<(), ApiError> {
        let request = self.client.build_toggle_todo(id);
        let toggled = self
            .transport
            .execute(request)
            .and_then(|response| self.client.parse_toggle_todo(response))
            .inspect_err(|e| error!(operation = "toggle", id, error = %e, "failed to toggle todo"))?;
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
            *slot = toggled;
        }
        Ok(())
    }

    /// The server has already accepted the mutation, so a failed refetch is
    /// not reported as a failure of the operation. The returned record is
    /// applied instead and the list catches up on the next load.
    fn reconcile(&mut self, todo: Todo) -> Result<(), ApiError> {
        if self.sync_mode == SyncMode::Refetch && self.load_all().is_ok() {
            return Ok(());
        }
        if self.sync_mode == SyncMode::Refetch {
            warn!(id = %todo.id, "refetch failed, applying returned record");
        }
        self.upsert(todo);
        Ok(())
    }

    fn upsert(&mut self, todo: Todo) {
        match self.todos.iter_mut().find(|t| t.id == todo.id) {
            Some(slot) => *slot = todo,
            None => self.todos.push(todo),
        }
    }
}

fn ensure_title(operation: &'static str, title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        error!(operation, "rejected blank title");
        return Err(ApiError::EmptyTitle);
    }
    Ok(())
}
