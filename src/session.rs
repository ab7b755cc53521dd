//! Everything a drawing session keeps between user events.
//!
//! [`Session::update`] is the only way to move from one state to the next.
//! It never performs I/O; when a request must go out it hands back a
//! [`Command`] and the caller runs it, later feeding the result back in as
//! [`Event::Completed`].

use std::rc::Rc;

use tracing::{debug, info};

use crate::canvas::CanvasView;
use crate::history::{History, HistoryEvent};
use crate::service::ServiceError;
use crate::shape::Drawing;

pub const EMPTY_MAIN_QUERY: &str =
    "Main query cannot be empty. Please enter a drawing instruction.";
pub const REQUEST_IN_PROGRESS: &str = "A request is already in progress.";
pub const NO_OUTPUT: &str = "No output yet.";

/// Identifies one outgoing request. Only the latest one may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

#[derive(Debug)]
pub enum Event {
    SetMainQuery(String),
    SetUpdateQuery(String),
    Submit,
    Completed {
        id: RequestId,
        result: Result<Drawing, ServiceError>,
    },
    Undo,
    Redo,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Interpret { id: RequestId, instruction: String },
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    main_query: String,
    update_query: String,
    history: History,
    query_log: Vec<String>,
    pending: Option<RequestId>,
    next_request_id: u64,
    error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(mut self, event: Event) -> (Self, Option<Command>) {
        match event {
            Event::SetMainQuery(text) => self.main_query = text,
            Event::SetUpdateQuery(text) => self.update_query = text,
            Event::Submit => return self.submit(),
            Event::Completed { id, result } => self.complete(id, result),
            Event::Undo => self.step_history(HistoryEvent::Undo),
            Event::Redo => self.step_history(HistoryEvent::Redo),
            Event::Reset => {
                // The request counter survives so a late reply from before
                // the reset can never match a newer request.
                let next_request_id = self.next_request_id;
                self = Self {
                    next_request_id,
                    ..Self::default()
                };
                info!("session reset");
            }
        }
        (self, None)
    }

    fn submit(mut self) -> (Self, Option<Command>) {
        let main = self.main_query.trim().to_string();
        let update = self.update_query.trim().to_string();

        if main.is_empty() {
            self.error = Some(EMPTY_MAIN_QUERY.to_string());
            return (self, None);
        }
        if self.pending.is_some() {
            self.error = Some(REQUEST_IN_PROGRESS.to_string());
            return (self, None);
        }

        let instruction = format!("{} {}", main, update);
        if self.query_log.is_empty() {
            self.query_log.push(main);
        }
        if !update.is_empty() {
            self.query_log.push(update);
        }

        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;
        self.pending = Some(id);
        self.error = None;
        info!(request = id.0, %instruction, "submitting instruction");

        (self, Some(Command::Interpret { id, instruction }))
    }

    fn complete(&mut self, id: RequestId, result: Result<Drawing, ServiceError>) {
        if self.pending != Some(id) {
            debug!(request = id.0, "discarding stale response");
            return;
        }
        self.pending = None;

        match result {
            Ok(drawing) => {
                info!(request = id.0, shapes = drawing.shapes.len(), "drawing received");
                self.step_history(HistoryEvent::Append(Rc::new(drawing)));
                self.update_query.clear();
            }
            Err(err) => {
                info!(request = id.0, error = %err, "request failed");
                self.error = Some(err.to_string());
            }
        }
    }

    fn step_history(&mut self, event: HistoryEvent) {
        self.history = std::mem::take(&mut self.history).apply(event);
    }

    pub fn main_query(&self) -> &str {
        &self.main_query
    }

    pub fn update_query(&self) -> &str {
        &self.update_query
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn current(&self) -> Option<&Rc<Drawing>> {
        self.history.current()
    }

    /// Every instruction sent so far: the main query, then each update.
    pub fn query_log(&self) -> &[String] {
        &self.query_log
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn canvas_view(&self) -> CanvasView<'_> {
        if self.is_loading() {
            return CanvasView::Loading;
        }
        match self.current() {
            Some(drawing) => CanvasView::Drawing(drawing),
            None => CanvasView::Empty,
        }
    }

    /// Pretty-printed JSON of the current drawing.
    pub fn drawing_json(&self) -> String {
        self.current()
            .map(|drawing| drawing.to_pretty_json())
            .unwrap_or_else(|| NO_OUTPUT.to_string())
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_loading() {
            "Processing..."
        } else if self.history.past_len() == 0 {
            "Generate Drawing"
        } else {
            "Update Drawing"
        }
    }
}
