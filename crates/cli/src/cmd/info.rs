//! Info command implementation.
//!
//! Lists every persistence with the root it resolves to.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use runstore_lib::persistence::{Location, PersistenceKind};

use super::load_stores;
use crate::output::{OutputFormat, display_path, persistence_line, print_field, print_json};

#[derive(Serialize)]
struct PersistenceInfo {
  kind: PersistenceKind,
  name: String,
  root: String,
  backend: String,
}

pub fn cmd_info(config: Option<&Path>, output: OutputFormat) -> Result<()> {
  let stores = load_stores(config)?;

  let mut entries = Vec::new();
  for kind in [PersistenceKind::Logs, PersistenceKind::Outputs, PersistenceKind::Data] {
    for name in stores.registry().catalog(kind).keys() {
      let location = stores.registry().resolve(kind, Some(name))?.location()?;
      let backend = match &location {
        Location::Mount(_) => "mount".to_string(),
        Location::Bucket { kind, .. } => kind.to_string(),
      };
      entries.push(PersistenceInfo {
        kind,
        name: name.clone(),
        root: display_path(&location.root()),
        backend,
      });
    }
  }

  if output.is_json() {
    let archive_root = display_path(stores.archive_root());
    print_json(&serde_json::json!({ "archive_root": archive_root, "persistences": entries }))?;
    return Ok(());
  }

  println!("runstore v{}", env!("CARGO_PKG_VERSION"));
  print_field("Archive root", display_path(stores.archive_root()));
  let mut current = None;
  for entry in &entries {
    if current != Some(entry.kind) {
      println!();
      println!("{}:", entry.kind);
      current = Some(entry.kind);
    }
    println!("  {}", persistence_line(&entry.name, &entry.root, &entry.backend));
  }
  Ok(())
}
