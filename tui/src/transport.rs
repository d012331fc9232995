use std::time::Duration;

use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};
use tracing::debug;

/// Blocking transport backed by a ureq agent.
///
/// Status codes are passed through as data (`http_status_as_error(false)`);
/// only failures to get a response at all become `ApiError::Transport`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&mut self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = req.method;
        let path = req.path;
        let result = match (method, req.body) {
            (HttpMethod::Get, _) => self.agent.get(&path).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&path).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&path).send_empty(),
            (HttpMethod::Patch, Some(body)) => self
                .agent
                .patch(&path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Patch, None) => self.agent.patch(&path).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        debug!(method = method.as_str(), %path, status, "request settled");

        Ok(HttpResponse::new(status, body))
    }
}
