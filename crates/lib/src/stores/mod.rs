//! The stores service.
//!
//! [`Stores`] is the one place that turns "the outputs of experiment
//! `user.project.7` on persistence `s3`" into a concrete location, and the one
//! place that creates, copies or deletes artifacts there. It combines the
//! persistence registry (which root), the naming rules (which relative path)
//! and the store factory (which backend).
//!
//! Path lookups are pure. `create_*`, `delete_*` and `copy_*` perform
//! blocking I/O without retries; overlapping deletes and copies on the same
//! resource are not coordinated.

mod error;

pub use error::{ErrorKind, StoresError};

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::config::StoresConfig;
use crate::naming::{
  CloningStrategy, ResourceName, experiment_group_path, experiment_job_path, experiment_path, flat_path,
  resumable_experiment_path,
};
use crate::persistence::{
  Location, PersistenceKind, PersistenceRegistry, Resolved, store_secret_for_persistence, store_secret_from_definition,
};
use crate::platform::paths::default_archive_root;
use crate::store::{
  ChainedSecretSource, EnvSecretSource, LocalStore, MapSecretSource, ObjectClientFactory, Store, StoreFactory,
  StoreHandle, StoreKind, transfer,
};

type Result<T> = std::result::Result<T, StoresError>;

/// Resolve `subpath` below `root`, refusing anything that could leave it.
fn join_subpath(root: &Path, subpath: &str) -> Result<PathBuf> {
  let unsafe_subpath = |reason| StoresError::UnsafeSubpath {
    subpath: subpath.to_string(),
    reason,
  };

  let mut normal = 0;
  for component in Path::new(subpath).components() {
    match component {
      Component::Normal(_) => normal += 1,
      Component::CurDir => {}
      Component::ParentDir => return Err(unsafe_subpath("must not contain `..`")),
      Component::RootDir | Component::Prefix(_) => return Err(unsafe_subpath("must be relative")),
    }
  }
  if normal == 0 {
    return Err(unsafe_subpath("would address the persistence root itself"));
  }
  Ok(root.join(subpath))
}

fn parse(name: &str) -> Result<ResourceName> {
  Ok(ResourceName::parse(name)?)
}

/// Artifact locations and lifecycle operations over the configured persistences.
#[derive(Debug)]
pub struct Stores {
  registry: PersistenceRegistry,
  archive_root: PathBuf,
  factory: StoreFactory,
}

impl Stores {
  /// Build the service from settings, validating every persistence.
  ///
  /// Secrets are looked up in the settings' `secrets:` block first, then in
  /// `RUNSTORE_SECRET_*` environment variables.
  pub fn new(config: &StoresConfig) -> Result<Self> {
    let secrets = ChainedSecretSource::new()
      .with(MapSecretSource::from_values(&config.secrets))
      .with(EnvSecretSource);
    Self::with_factory(config, StoreFactory::new(secrets))
  }

  pub fn with_factory(config: &StoresConfig, factory: StoreFactory) -> Result<Self> {
    let registry = PersistenceRegistry::new(config)?;
    let archive_root = config.archive_root.clone().unwrap_or_else(default_archive_root);
    info!(
      outputs = registry.catalog(PersistenceKind::Outputs).len(),
      data = registry.catalog(PersistenceKind::Data).len(),
      archive_root = %archive_root.display(),
      "stores ready"
    );
    Ok(Self {
      registry,
      archive_root,
      factory,
    })
  }

  /// Register the object client used for buckets of `kind`.
  pub fn register_client(&mut self, kind: StoreKind, client: impl ObjectClientFactory + 'static) {
    self.factory.register(kind, client);
  }

  pub fn registry(&self) -> &PersistenceRegistry {
    &self.registry
  }

  pub fn archive_root(&self) -> &Path {
    &self.archive_root
  }

  /// Validate logs, outputs and data, in that order.
  pub fn validate(&self) -> Result<()> {
    Ok(self.registry.validate()?)
  }

  fn locate(&self, kind: PersistenceKind, persistence: Option<&str>) -> Result<(Resolved<'_>, Location)> {
    let resolved = self.registry.resolve(kind, persistence)?;
    let location = resolved.location()?;
    debug!(%kind, persistence = resolved.name, root = %location.root().display(), "resolved persistence");
    Ok((resolved, location))
  }

  fn root(&self, kind: PersistenceKind, persistence: Option<&str>) -> Result<Location> {
    self.locate(kind, persistence).map(|(_, location)| location)
  }

  fn logs_root(&self, temp: bool, persistence: Option<&str>) -> Result<Location> {
    if temp {
      return Ok(Location::Mount(self.archive_root.clone()));
    }
    self.root(PersistenceKind::Logs, persistence)
  }

  /// The handle that can operate on a resolved persistence.
  ///
  /// Buckets must name a secret; local access to a bucket URI is never right.
  fn store_for(&self, resolved: &Resolved<'_>, location: &Location) -> Result<StoreHandle> {
    match location {
      Location::Mount(_) => Ok(StoreHandle::Local(LocalStore::new())),
      Location::Bucket { kind, .. } => {
        let secret = store_secret_from_definition(resolved.config);
        let Some(secret_key) = secret.secret_key else {
          return Err(StoresError::MissingCredentials {
            kind: resolved.kind,
            name: resolved.name.to_string(),
          });
        };
        Ok(self.factory.get_store(Some(*kind), Some(secret_key))?)
      }
    }
  }

  // Roots

  /// Roots of several data persistences at once; no names means the default one.
  pub fn get_data_paths(&self, persistences: &[&str]) -> Result<BTreeMap<String, PathBuf>> {
    if persistences.is_empty() {
      let (resolved, location) = self.locate(PersistenceKind::Data, None)?;
      return Ok(BTreeMap::from([(resolved.name.to_string(), location.root())]));
    }

    persistences
      .iter()
      .map(|name| -> Result<(String, PathBuf)> {
        let (resolved, location) = self.locate(PersistenceKind::Data, Some(name))?;
        Ok((resolved.name.to_string(), location.root()))
      })
      .collect()
  }

  pub fn get_data_path(&self, persistence: Option<&str>) -> Result<PathBuf> {
    Ok(self.root(PersistenceKind::Data, persistence)?.root())
  }

  pub fn get_outputs_path(&self, persistence: Option<&str>) -> Result<PathBuf> {
    Ok(self.root(PersistenceKind::Outputs, persistence)?.root())
  }

  /// The logs root; the only accepted name is `default`.
  pub fn get_logs_path(&self, persistence: Option<&str>) -> Result<PathBuf> {
    Ok(self.root(PersistenceKind::Logs, persistence)?.root())
  }

  // Deletion

  fn delete_path(&self, kind: PersistenceKind, subpath: &str, persistence: Option<&str>) -> Result<()> {
    let (resolved, location) = self.locate(kind, persistence)?;
    let path = join_subpath(&location.root(), subpath)?;
    let store = self.store_for(&resolved, &location)?;

    store.delete(&path)?;
    info!(%kind, persistence = resolved.name, path = %path.display(), "deleted path");
    Ok(())
  }

  pub fn delete_data_path(&self, subpath: &str, persistence: Option<&str>) -> Result<()> {
    self.delete_path(PersistenceKind::Data, subpath, persistence)
  }

  pub fn delete_outputs_path(&self, subpath: &str, persistence: Option<&str>) -> Result<()> {
    self.delete_path(PersistenceKind::Outputs, subpath, persistence)
  }

  pub fn delete_logs_path(&self, subpath: &str, persistence: Option<&str>) -> Result<()> {
    self.delete_path(PersistenceKind::Logs, subpath, persistence)
  }

  // Store handles

  pub fn get_outputs_store(&self, persistence: Option<&str>) -> Result<StoreHandle> {
    let resolved = self.registry.resolve(PersistenceKind::Outputs, persistence)?;
    let secret = store_secret_for_persistence(
      PersistenceKind::Outputs,
      resolved.name,
      self.registry.catalog(PersistenceKind::Outputs),
    )?;
    Ok(self.factory.get_store(secret.store, secret.secret_key)?)
  }

  pub fn get_logs_store(&self) -> Result<StoreHandle> {
    let secret = store_secret_from_definition(self.registry.logs().config);
    Ok(self.factory.get_store(secret.store, secret.secret_key)?)
  }

  // Resource paths

  pub fn get_experiment_group_outputs_path(
    &self,
    persistence: Option<&str>,
    experiment_group_name: &str,
  ) -> Result<PathBuf> {
    let relative = experiment_group_path(&parse(experiment_group_name)?)?;
    Ok(self.get_outputs_path(persistence)?.join(relative))
  }

  pub fn get_experiment_group_logs_path(
    &self,
    experiment_group_name: &str,
    persistence: Option<&str>,
  ) -> Result<PathBuf> {
    let relative = experiment_group_path(&parse(experiment_group_name)?)?;
    Ok(self.get_logs_path(persistence)?.join(relative))
  }

  pub fn get_experiment_job_logs_path(
    &self,
    experiment_job_name: &str,
    temp: bool,
    persistence: Option<&str>,
  ) -> Result<PathBuf> {
    let relative = experiment_job_path(&parse(experiment_job_name)?)?;
    Ok(self.logs_root(temp, persistence)?.root().join(relative))
  }

  /// Outputs of an experiment; a resumed experiment reuses its original's path.
  pub fn get_experiment_outputs_path(
    &self,
    persistence: Option<&str>,
    experiment_name: &str,
    original_name: Option<&str>,
    cloning_strategy: Option<CloningStrategy>,
  ) -> Result<PathBuf> {
    let original = original_name.map(parse).transpose()?;
    let relative = resumable_experiment_path(&parse(experiment_name)?, original.as_ref(), cloning_strategy)?;
    Ok(self.get_outputs_path(persistence)?.join(relative))
  }

  pub fn get_experiment_logs_path(
    &self,
    experiment_name: &str,
    temp: bool,
    persistence: Option<&str>,
  ) -> Result<PathBuf> {
    let relative = experiment_path(&parse(experiment_name)?)?;
    Ok(self.logs_root(temp, persistence)?.root().join(relative))
  }

  pub fn get_job_outputs_path(&self, persistence: Option<&str>, job_name: &str) -> Result<PathBuf> {
    let relative = flat_path(&parse(job_name)?);
    Ok(self.get_outputs_path(persistence)?.join(relative))
  }

  pub fn get_job_logs_path(&self, job_name: &str, temp: bool, persistence: Option<&str>) -> Result<PathBuf> {
    let relative = flat_path(&parse(job_name)?);
    Ok(self.logs_root(temp, persistence)?.root().join(relative))
  }

  pub fn get_notebook_job_outputs_path(&self, persistence: Option<&str>, notebook_job_name: &str) -> Result<PathBuf> {
    let relative = flat_path(&parse(notebook_job_name)?);
    Ok(self.get_outputs_path(persistence)?.join(relative))
  }

  pub fn get_project_outputs_path(&self, persistence: Option<&str>, project_name: &str) -> Result<PathBuf> {
    let relative = flat_path(&parse(project_name)?);
    Ok(self.get_outputs_path(persistence)?.join(relative))
  }

  pub fn get_project_logs_path(&self, project_name: &str, persistence: Option<&str>) -> Result<PathBuf> {
    let relative = flat_path(&parse(project_name)?);
    Ok(self.get_logs_path(persistence)?.join(relative))
  }

  // Creation

  fn ensure_archive_root(&self) -> Result<()> {
    if !self.archive_root.is_dir() {
      LocalStore.create_dir(&self.archive_root)?;
      info!(path = %self.archive_root.display(), "created logs archive root");
    }
    Ok(())
  }

  /// Logs are files: make sure the directory holding the file exists.
  fn create_logs_path(&self, relative: &str, temp: bool, persistence: Option<&str>) -> Result<PathBuf> {
    if temp {
      self.ensure_archive_root()?;
    }
    let location = self.logs_root(temp, persistence)?;
    let path = location.root().join(relative);
    if location.is_mount()
      && let Some(parent) = path.parent()
    {
      LocalStore.create_dir(parent)?;
    }
    Ok(path)
  }

  /// Outputs are directories named after the run ordinal below the resource path.
  fn create_outputs_path(&self, persistence: Option<&str>, relative: &str, ordinal: &str) -> Result<PathBuf> {
    let location = self.root(PersistenceKind::Outputs, persistence)?;
    let path = location.root().join(relative).join(ordinal);
    if location.is_mount() {
      LocalStore.create_dir(&path)?;
    }
    Ok(path)
  }

  pub fn create_experiment_logs_path(
    &self,
    experiment_name: &str,
    temp: bool,
    persistence: Option<&str>,
  ) -> Result<PathBuf> {
    let relative = experiment_path(&parse(experiment_name)?)?;
    self.create_logs_path(&relative, temp, persistence)
  }

  pub fn create_experiment_outputs_path(&self, persistence: Option<&str>, experiment_name: &str) -> Result<PathBuf> {
    let name = parse(experiment_name)?;
    let relative = experiment_path(&name)?;
    self.create_outputs_path(persistence, &relative, name.last())
  }

  pub fn create_experiment_job_logs_path(
    &self,
    experiment_job_name: &str,
    temp: bool,
    persistence: Option<&str>,
  ) -> Result<PathBuf> {
    let relative = experiment_job_path(&parse(experiment_job_name)?)?;
    self.create_logs_path(&relative, temp, persistence)
  }

  pub fn create_job_logs_path(&self, job_name: &str, temp: bool, persistence: Option<&str>) -> Result<PathBuf> {
    let relative = flat_path(&parse(job_name)?);
    self.create_logs_path(&relative, temp, persistence)
  }

  pub fn create_job_outputs_path(&self, persistence: Option<&str>, job_name: &str) -> Result<PathBuf> {
    let name = parse(job_name)?;
    let relative = flat_path(&name);
    self.create_outputs_path(persistence, &relative, name.last())
  }

  // Copy

  /// Copy an experiment's outputs, possibly across persistences and backends.
  ///
  /// Both sides are resolved independently. The source must exist and the
  /// destination must not; there is no merging.
  pub fn copy_experiment_outputs(
    &self,
    persistence_outputs_from: Option<&str>,
    persistence_outputs_to: Option<&str>,
    experiment_name_from: &str,
    experiment_name_to: &str,
  ) -> Result<()> {
    let relative_from = experiment_path(&parse(experiment_name_from)?)?;
    let relative_to = experiment_path(&parse(experiment_name_to)?)?;

    let (resolved_from, location_from) = self.locate(PersistenceKind::Outputs, persistence_outputs_from)?;
    let (resolved_to, location_to) = self.locate(PersistenceKind::Outputs, persistence_outputs_to)?;
    let path_from = location_from.root().join(relative_from);
    let path_to = location_to.root().join(relative_to);

    let source = self.store_for(&resolved_from, &location_from)?;
    if resolved_from.name == resolved_to.name || (location_from.is_mount() && location_to.is_mount()) {
      source.copy_tree(&path_from, &path_to)?;
    } else {
      let destination = self.store_for(&resolved_to, &location_to)?;
      transfer(&source, &path_from, &destination, &path_to)?;
    }

    info!(
      from = %path_from.display(),
      to = %path_to.display(),
      "copied experiment outputs"
    );
    Ok(())
  }
}
