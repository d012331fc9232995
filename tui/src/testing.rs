//! In-memory remote for app and render tests.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use todo_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, Todo, TodoClient, TodoStatus, TodoStore,
    Transport,
};

const BASE: &str = "http://remote";

#[derive(Default)]
pub struct FakeRemote {
    pub todos: Vec<Todo>,
    pub next_id: usize,
    pub fail_next: bool,
    /// Fail the request with this 1-based call number.
    pub fail_call: Option<usize>,
    pub calls: usize,
}

impl FakeRemote {
    fn position(&self, id: &str) -> Option<usize> {
        self.todos.iter().position(|t| t.id == id)
    }

    fn respond(&mut self, req: &HttpRequest) -> HttpResponse {
        let path = req.path.trim_start_matches(BASE).trim_matches('/');
        let parts: Vec<&str> = path.split('/').collect();
        let body: serde_json::Value = req
            .body
            .as_deref()
            .and_then(|b| serde_json::from_str(b).ok())
            .unwrap_or_default();
        let text = |key: &str| body[key].as_str().unwrap_or_default().to_string();

        match (req.method, parts.as_slice()) {
            (HttpMethod::Get, ["api", "todos"]) => json(200, &self.todos),
            (HttpMethod::Post, ["api", "todos"]) => {
                self.next_id += 1;
                let mut todo = todo(&format!("t{}", self.next_id), &text("title"), TodoStatus::Pending);
                todo.description = text("description");
                self.todos.push(todo.clone());
                json(201, &todo)
            }
            (HttpMethod::Patch, ["api", "todos", id]) => match self.position(id) {
                Some(i) => {
                    self.todos[i].title = text("title");
                    self.todos[i].description = text("description");
                    json(200, &self.todos[i])
                }
                None => HttpResponse::new(404, ""),
            },
            (HttpMethod::Patch, ["api", "todos", id, "toggle"]) => match self.position(id) {
                Some(i) => {
                    self.todos[i].status = self.todos[i].status.toggled();
                    json(200, &self.todos[i])
                }
                None => HttpResponse::new(404, ""),
            },
            (HttpMethod::Delete, ["api", "todos", id]) => match self.position(id) {
                Some(i) => {
                    self.todos.remove(i);
                    HttpResponse::new(204, "")
                }
                None => HttpResponse::new(404, ""),
            },
            _ => HttpResponse::new(405, ""),
        }
    }
}

impl Transport for FakeRemote {
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.calls += 1;
        if std::mem::take(&mut self.fail_next) || self.fail_call == Some(self.calls) {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(self.respond(&request))
    }
}

fn json<T: serde::Serialize>(status: u16, value: &T) -> HttpResponse {
    HttpResponse::new(status, serde_json::to_string(value).unwrap())
}

pub fn todo(id: &str, title: &str, status: TodoStatus) -> Todo {
    Todo {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        status,
        created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
    }
}

/// A store (not yet loaded) over a remote seeded with `items`.
pub fn remote_with(items: &[(&str, TodoStatus)]) -> TodoStore<FakeRemote> {
    let todos: Vec<Todo> = items
        .iter()
        .enumerate()
        .map(|(i, (title, status))| todo(&format!("s{i}"), title, *status))
        .collect();
    let remote = FakeRemote {
        todos,
        ..FakeRemote::default()
    };
    TodoStore::new(TodoClient::new(BASE), remote)
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}
