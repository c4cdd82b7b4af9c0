//! Background deletion of data, outputs and logs.
//!
//! Callers schedule a deletion and return immediately; a single worker drains
//! the queue and runs each deletion on tokio's blocking pool. Failures are
//! logged and counted, never retried.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::persistence::PersistenceKind;
use crate::stores::{Stores, StoresError};

#[derive(Debug, Error)]
pub enum TaskError {
  #[error("deletion queue is closed")]
  QueueClosed,

  #[error("deletion worker panicked: {0}")]
  Worker(String),
}

/// A deletion of `subpath` below one persistence root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionTask {
  pub kind: PersistenceKind,
  pub persistence: String,
  pub subpath: String,
}

impl DeletionTask {
  pub fn new(kind: PersistenceKind, persistence: &str, subpath: &str) -> Self {
    Self {
      kind,
      persistence: persistence.to_string(),
      subpath: subpath.to_string(),
    }
  }

  /// Run the deletion synchronously.
  pub fn run(&self, stores: &Stores) -> Result<(), StoresError> {
    let persistence = Some(self.persistence.as_str());
    match self.kind {
      PersistenceKind::Data => stores.delete_data_path(&self.subpath, persistence),
      PersistenceKind::Outputs => stores.delete_outputs_path(&self.subpath, persistence),
      PersistenceKind::Logs => stores.delete_logs_path(&self.subpath, persistence),
    }
  }
}

impl fmt::Display for DeletionTask {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}:{}", self.kind, self.persistence, self.subpath)
  }
}

/// What the worker did before the queue was shut down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
  pub completed: usize,
  pub failed: Vec<FailedDeletion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDeletion {
  pub task: DeletionTask,
  pub error: String,
}

/// Handle to the deletion worker.
///
/// Must be created inside a tokio runtime.
pub struct DeletionQueue {
  sender: mpsc::UnboundedSender<DeletionTask>,
  worker: JoinHandle<DeletionReport>,
}

impl DeletionQueue {
  pub fn start(stores: Arc<Stores>) -> Self {
    let (sender, receiver) = mpsc::unbounded_channel();
    let worker = tokio::spawn(drain(stores, receiver));
    Self { sender, worker }
  }

  pub fn schedule(&self, task: DeletionTask) -> Result<(), TaskError> {
    debug!(%task, "scheduling deletion");
    self.sender.send(task).map_err(|_| TaskError::QueueClosed)
  }

  pub fn schedule_data_deletion(&self, persistence: &str, subpath: &str) -> Result<(), TaskError> {
    self.schedule(DeletionTask::new(PersistenceKind::Data, persistence, subpath))
  }

  pub fn schedule_outputs_deletion(&self, persistence: &str, subpath: &str) -> Result<(), TaskError> {
    self.schedule(DeletionTask::new(PersistenceKind::Outputs, persistence, subpath))
  }

  pub fn schedule_logs_deletion(&self, persistence: &str, subpath: &str) -> Result<(), TaskError> {
    self.schedule(DeletionTask::new(PersistenceKind::Logs, persistence, subpath))
  }

  /// Stop accepting work, wait for everything queued so far, and report.
  pub async fn shutdown(self) -> Result<DeletionReport, TaskError> {
    drop(self.sender);
    self.worker.await.map_err(|e| TaskError::Worker(e.to_string()))
  }
}

async fn drain(stores: Arc<Stores>, mut receiver: mpsc::UnboundedReceiver<DeletionTask>) -> DeletionReport {
  let mut report = DeletionReport::default();

  while let Some(task) = receiver.recv().await {
    let stores = stores.clone();
    let job = task.clone();
    let outcome = tokio::task::spawn_blocking(move || job.run(&stores)).await;

    let error = match outcome {
      Ok(Ok(())) => {
        report.completed += 1;
        continue;
      }
      Ok(Err(e)) => e.to_string(),
      Err(e) => e.to_string(),
    };
    warn!(%task, error = %error, "deletion failed");
    report.failed.push(FailedDeletion { task, error });
  }

  info!(
    completed = report.completed,
    failed = report.failed.len(),
    "deletion queue drained"
  );
  report
}
