use std::path::Path;

use anyhow::Result;

use runstore_lib::persistence::PersistenceKind;

use super::load_stores;
use crate::output::{Outcome, OutputFormat, print_field, print_json, print_outcome};

pub fn cmd_validate(config: Option<&Path>, output: OutputFormat) -> Result<()> {
  let stores = load_stores(config)?;
  stores.validate()?;

  let outputs = stores.registry().catalog(PersistenceKind::Outputs).len();
  let data = stores.registry().catalog(PersistenceKind::Data).len();

  if output.is_json() {
    print_json(&serde_json::json!({ "valid": true, "outputs": outputs, "data": data }))?;
  } else {
    print_outcome(Outcome::Done, "Configuration is valid");
    print_field("Outputs persistences", outputs);
    print_field("Data persistences", data);
  }
  Ok(())
}
