//! Client side of the natural-language interpretation service.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::shape::{Drawing, Geometry, Point, Shape};

/// Shown when a failed response carries no usable message.
pub const GENERIC_SERVER_ERROR: &str = "Server error.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// A success response whose body is not a valid drawing.
    #[error("Malformed drawing response: {0}")]
    Malformed(String),
}

/// Turns one combined instruction into one drawing.
pub trait Interpreter: Send + Sync {
    fn interpret(&self, instruction: &str) -> Result<Drawing, ServiceError>;
}

/// Talks to the HTTP service: `POST {base}/userquery` with `{"query": ...}`.
pub struct HttpInterpreter {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpInterpreter {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: format!("{}/userquery", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Interpreter for HttpInterpreter {
    fn interpret(&self, instruction: &str) -> Result<Drawing, ServiceError> {
        let payload = serde_json::json!({ "query": instruction }).to_string();
        debug!(endpoint = %self.endpoint, "sending instruction");

        let response = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .send(payload)
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            warn!(status, "interpretation service returned an error");
            return Err(ServiceError::Server {
                status,
                message: server_error_message(&body),
            });
        }

        parse_drawing_response(&body)
    }
}

/// Pull the human-readable message out of an error body, which looks like
/// `{"detail": "..."}` when present at all.
pub fn server_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|detail| !detail.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string())
}

pub fn parse_drawing_response(body: &str) -> Result<Drawing, ServiceError> {
    Drawing::from_json(body).map_err(|e| ServiceError::Malformed(e.to_string()))
}

/// Offline stand-in: always answers with a right triangle and its incircle.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockInterpreter;

impl Interpreter for MockInterpreter {
    fn interpret(&self, instruction: &str) -> Result<Drawing, ServiceError> {
        debug!(instruction, "mock interpreter");
        let legs = 100.0_f64;
        let inradius = (legs + legs - legs.hypot(legs)) / 2.0;

        let mut drawing = Drawing::new(vec![
            Shape::new(Geometry::Triangle {
                points: vec![Point(0.0, legs), Point(0.0, 0.0), Point(legs, 0.0)],
            }),
            Shape::new(Geometry::Circle {
                center: Point(inradius, inradius),
                radius: inradius,
            }),
        ]);
        drawing
            .meta
            .insert("units".into(), serde_json::Value::from("user-space"));
        drawing
            .meta
            .insert("note".into(), serde_json::Value::from("mock incircle"));
        Ok(drawing)
    }
}
