//! Lifecycle events and the handlers that record them.
//!
//! Every [`EventSubject`] has at most one [`EventHandler`]. The registry is
//! assembled once at start-up and then only read.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSubject {
  Experiment,
  ExperimentGroup,
  ExperimentJob,
  BuildJob,
  Job,
  Notebook,
  Tensorboard,
}

impl EventSubject {
  pub const ALL: [EventSubject; 7] = [
    EventSubject::Experiment,
    EventSubject::ExperimentGroup,
    EventSubject::ExperimentJob,
    EventSubject::BuildJob,
    EventSubject::Job,
    EventSubject::Notebook,
    EventSubject::Tensorboard,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      EventSubject::Experiment => "experiment",
      EventSubject::ExperimentGroup => "experiment_group",
      EventSubject::ExperimentJob => "experiment_job",
      EventSubject::BuildJob => "build_job",
      EventSubject::Job => "job",
      EventSubject::Notebook => "notebook",
      EventSubject::Tensorboard => "tensorboard",
    }
  }
}

impl fmt::Display for EventSubject {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Something that happened to a resource, e.g. `experiment` / `deleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub subject: EventSubject,
  pub action: String,
  #[serde(default)]
  pub payload: serde_json::Value,
}

impl Event {
  pub fn new(subject: EventSubject, action: impl Into<String>) -> Self {
    Self {
      subject,
      action: action.into(),
      payload: serde_json::Value::Null,
    }
  }

  pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
    self.payload = payload;
    self
  }
}

#[derive(Debug, Error)]
pub enum EventError {
  #[error("no handler is registered for {0} events")]
  UnregisteredSubject(EventSubject),

  #[error("{subject} handler failed: {message}")]
  Handler { subject: EventSubject, message: String },
}

pub trait EventHandler: Send + Sync {
  fn subject(&self) -> EventSubject;

  fn record_event(&self, event: &Event) -> Result<(), EventError>;
}

/// Records events as structured log lines.
#[derive(Debug, Clone, Copy)]
pub struct TracingHandler {
  subject: EventSubject,
}

impl TracingHandler {
  pub fn new(subject: EventSubject) -> Self {
    Self { subject }
  }
}

impl EventHandler for TracingHandler {
  fn subject(&self) -> EventSubject {
    self.subject
  }

  fn record_event(&self, event: &Event) -> Result<(), EventError> {
    info!(subject = %event.subject, action = %event.action, payload = %event.payload, "event recorded");
    Ok(())
  }
}

#[derive(Default, Clone)]
pub struct HandlerRegistry {
  handlers: HashMap<EventSubject, Arc<dyn EventHandler>>,
}

impl fmt::Debug for HandlerRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut subjects: Vec<_> = self.handlers.keys().collect();
    subjects.sort();
    f.debug_struct("HandlerRegistry").field("subjects", &subjects).finish()
  }
}

impl HandlerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry with a [`TracingHandler`] for every subject.
  pub fn with_tracing_handlers() -> Self {
    EventSubject::ALL
      .into_iter()
      .fold(Self::new(), |registry, subject| registry.with(TracingHandler::new(subject)))
  }

  pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
    self.register(handler);
    self
  }

  /// Register a handler, replacing any previous one for the same subject.
  pub fn register(&mut self, handler: impl EventHandler + 'static) {
    self.handlers.insert(handler.subject(), Arc::new(handler));
  }

  pub fn is_registered(&self, subject: EventSubject) -> bool {
    self.handlers.contains_key(&subject)
  }

  pub fn record_event(&self, event: &Event) -> Result<(), EventError> {
    let handler = self
      .handlers
      .get(&event.subject)
      .ok_or(EventError::UnregisteredSubject(event.subject))?;
    handler.record_event(event)
  }
}
