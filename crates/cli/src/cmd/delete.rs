//! Delete command implementation.
//!
//! Deletions go through the same background queue services use, then the
//! command waits for it to drain and reports per-path failures.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use runstore_lib::persistence::PersistenceKind;
use runstore_lib::tasks::{DeletionQueue, DeletionTask};

use super::{PersistenceArg, load_stores};
use crate::output::{Outcome, OutputFormat, print_failure, print_json, print_outcome};

pub fn cmd_delete(
  config: Option<&Path>,
  kind: PersistenceArg,
  subpaths: &[String],
  persistence: Option<&str>,
  output: OutputFormat,
) -> Result<()> {
  let stores = Arc::new(load_stores(config)?);
  let kind = PersistenceKind::from(kind);
  let persistence = stores.registry().resolve(kind, persistence)?.name.to_string();

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(async {
    let queue = DeletionQueue::start(stores.clone());
    for subpath in subpaths {
      queue.schedule(DeletionTask::new(kind, &persistence, subpath))?;
    }
    queue.shutdown().await
  })?;

  if output.is_json() {
    print_json(&report)?;
  } else {
    for failed in &report.failed {
      print_failure(&format!("{}: {}", failed.task.subpath, failed.error));
    }
    if report.completed > 0 {
      print_outcome(
        Outcome::Done,
        &format!("Deleted {} path(s) from {} `{}`", report.completed, kind, persistence),
      );
    } else {
      print_outcome(Outcome::Skipped, "Nothing was deleted");
    }
  }

  if !report.failed.is_empty() {
    bail!("{} deletion(s) failed", report.failed.len());
  }
  Ok(())
}
