//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, UpdateTodo};

const COLLECTION: &str = "api/todos";

/// Characters escaped when an id is placed in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Synchronous, stateless client for the todo API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/{COLLECTION}", self.base_url)
    }

    fn item_url(&self, id: &str) -> String {
        let id = utf8_percent_encode(id, PATH_SEGMENT);
        format!("{}/{COLLECTION}/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        bare(HttpMethod::Get, self.collection_url())
    }

    pub fn build_get_todo(&self, id: &str) -> HttpRequest {
        bare(HttpMethod::Get, self.item_url(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        with_json(HttpMethod::Post, self.collection_url(), input)
    }

    pub fn build_update_todo(&self, id: &str, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        with_json(HttpMethod::Patch, self.item_url(id), input)
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        bare(HttpMethod::Delete, self.item_url(id))
    }

    pub fn build_toggle_todo(&self, id: &str) -> HttpRequest {
        bare(HttpMethod::Patch, format!("{}/toggle", self.item_url(id)))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        decode(response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        decode(response)
    }
}

fn bare(method: HttpMethod, path: String) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn with_json<B: Serialize>(
    method: HttpMethod,
    path: String,
    input: &B,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoStatus;

    const TODO_JSON: &str = r#"{"id":"t1","title":"Test","description":"","status":"pending","createdAt":"2024-01-02T03:04:05Z"}"#;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:5000")
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:5000/api/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_todo_produces_correct_request() {
        let req = client().build_get_todo("t1");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:5000/api/todos/t1");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = CreateTodo {
            title: "Buy milk".to_string(),
            description: "2 litres".to_string(),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:5000/api/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["description"], "2 litres");
    }

    #[test]
    fn build_update_todo_uses_patch() {
        let input = UpdateTodo {
            title: "Updated".to_string(),
            description: String::new(),
        };
        let req = client().build_update_todo("t1", &input).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "http://localhost:5000/api/todos/t1");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Updated");
        assert!(body.get("status").is_none());
    }

    #[test]
    fn build_delete_todo_produces_correct_request() {
        let req = client().build_delete_todo("t1");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:5000/api/todos/t1");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_toggle_todo_has_no_body() {
        let req = client().build_toggle_todo("t1");
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "http://localhost:5000/api/todos/t1/toggle");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn ids_are_encoded_as_one_path_segment() {
        let c = client();
        assert_eq!(
            c.build_toggle_todo("a/b c?x#y").path,
            "http://localhost:5000/api/todos/a%2Fb%20c%3Fx%23y/toggle"
        );
        assert_eq!(
            c.build_delete_todo("50%").path,
            "http://localhost:5000/api/todos/50%25"
        );
        assert_eq!(
            c.build_get_todo("665f1c2e-9b1a").path,
            "http://localhost:5000/api/todos/665f1c2e-9b1a"
        );
    }

    #[test]
    fn parse_list_todos_success() {
        let response = HttpResponse::new(200, format!("[{TODO_JSON}]"));
        let todos = client().parse_list_todos(response).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Test");
    }

    #[test]
    fn parse_get_todo_not_found() {
        let err = client().parse_get_todo(HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_create_accepts_any_2xx() {
        for status in [200, 201] {
            let todo = client()
                .parse_create_todo(HttpResponse::new(status, TODO_JSON))
                .unwrap();
            assert_eq!(todo.id, "t1");
        }
    }

    #[test]
    fn parse_create_todo_wrong_status() {
        let response = HttpResponse::new(500, "internal error");
        let err = client().parse_create_todo(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_toggle_todo_returns_record() {
        let body = TODO_JSON.replace("pending", "completed");
        let todo = client().parse_toggle_todo(HttpResponse::new(200, body)).unwrap();
        assert_eq!(todo.status, TodoStatus::Completed);
    }

    #[test]
    fn parse_delete_todo_ignores_body() {
        assert!(client().parse_delete_todo(HttpResponse::new(204, "")).is_ok());
        assert!(client()
            .parse_delete_todo(HttpResponse::new(200, r#"{"message":"Todo deleted"}"#))
            .is_ok());
    }

    #[test]
    fn parse_delete_todo_not_found() {
        let err = client().parse_delete_todo(HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:5000/");
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:5000/api/todos");
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client()
            .parse_list_todos(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
