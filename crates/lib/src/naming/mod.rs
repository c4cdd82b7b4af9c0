//! Resource naming and relative path rules.
//!
//! Every run artifact is addressed by a dotted name whose shape encodes its
//! ownership chain. The functions here turn such a name into the relative,
//! `/`-joined path under which the resource lives in any persistence:
//!
//! ```text
//! user.project.7                -> user/project/experiments/7
//! user.project.3.12             -> user/project/groups/3/12
//! user.project.3                -> user/project/groups/3          (group)
//! user.project.3.master.0       -> user/project/experiments/3/master.0 (experiment job)
//! user.project.jobs.4           -> user/project/jobs/4            (job, notebook, project)
//! ```
//!
//! Lookups and creations must go through the same functions, otherwise
//! artifacts written at one path are searched for at another.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Literal inserted for experiments owned directly by a project.
pub const EXPERIMENTS_SEGMENT: &str = "experiments";

/// Literal inserted for groups and for experiments owned by a group.
pub const GROUPS_SEGMENT: &str = "groups";

/// Index at which the kind literal is inserted.
const KIND_INDEX: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
  #[error("resource name is empty")]
  Empty,

  #[error("resource name `{0}` contains an empty segment")]
  EmptySegment(String),

  #[error("resource name `{name}` has an invalid segment `{segment}`")]
  InvalidSegment { name: String, segment: String },

  #[error("{kind} name `{name}` has {count} segment(s), expected {expected}")]
  SegmentCount {
    kind: ResourceKind,
    name: String,
    count: usize,
    expected: &'static str,
  },

  #[error("unknown cloning strategy `{0}`")]
  UnknownStrategy(String),
}

/// The kinds of resources that own artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
  Project,
  ExperimentGroup,
  Experiment,
  ExperimentJob,
  Job,
  Notebook,
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ResourceKind::Project => "project",
      ResourceKind::ExperimentGroup => "experiment group",
      ResourceKind::Experiment => "experiment",
      ResourceKind::ExperimentJob => "experiment job",
      ResourceKind::Job => "job",
      ResourceKind::Notebook => "notebook",
    };
    f.write_str(name)
  }
}

/// How an experiment was cloned from its ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloningStrategy {
  Copy,
  Restart,
  Resume,
}

impl FromStr for CloningStrategy {
  type Err = NameError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "copy" => Ok(CloningStrategy::Copy),
      "restart" => Ok(CloningStrategy::Restart),
      "resume" => Ok(CloningStrategy::Resume),
      other => Err(NameError::UnknownStrategy(other.to_string())),
    }
  }
}

/// A validated dotted resource name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {
  raw: String,
}

impl ResourceName {
  pub fn parse(name: &str) -> Result<Self, NameError> {
    if name.is_empty() {
      return Err(NameError::Empty);
    }
    if name.split('.').any(str::is_empty) {
      return Err(NameError::EmptySegment(name.to_string()));
    }
    // Each segment must stay a single path component.
    if let Some(segment) = name.split('.').find(|s| s.contains(['/', '\\', '\0'])) {
      return Err(NameError::InvalidSegment {
        name: name.to_string(),
        segment: segment.to_string(),
      });
    }
    Ok(Self { raw: name.to_string() })
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }

  pub fn segments(&self) -> Vec<&str> {
    self.raw.split('.').collect()
  }

  pub fn len(&self) -> usize {
    self.raw.split('.').count()
  }

  /// Always false: a parsed name has at least one segment.
  pub fn is_empty(&self) -> bool {
    false
  }

  /// The trailing segment, which carries the run ordinal for experiments and jobs.
  pub fn last(&self) -> &str {
    self.raw.rsplit('.').next().unwrap_or(&self.raw)
  }
}

impl FromStr for ResourceName {
  type Err = NameError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl fmt::Display for ResourceName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.raw)
  }
}

fn check_count(
  kind: ResourceKind,
  name: &ResourceName,
  allowed: &[usize],
  expected: &'static str,
) -> Result<(), NameError> {
  let count = name.len();
  if allowed.contains(&count) {
    return Ok(());
  }
  Err(NameError::SegmentCount {
    kind,
    name: name.to_string(),
    count,
    expected,
  })
}

fn insert_kind<'a>(mut segments: Vec<&'a str>, literal: &'a str) -> String {
  segments.insert(KIND_INDEX, literal);
  segments.join("/")
}

/// `user.project.group` -> `user/project/groups/group`
pub fn experiment_group_path(name: &ResourceName) -> Result<String, NameError> {
  check_count(ResourceKind::ExperimentGroup, name, &[3], "3")?;
  Ok(insert_kind(name.segments(), GROUPS_SEGMENT))
}

/// Three segments belong to a project, four to a group.
pub fn experiment_path(name: &ResourceName) -> Result<String, NameError> {
  check_count(ResourceKind::Experiment, name, &[3, 4], "3 or 4")?;
  let segments = name.segments();
  let literal = if segments.len() == 3 {
    EXPERIMENTS_SEGMENT
  } else {
    GROUPS_SEGMENT
  };
  Ok(insert_kind(segments, literal))
}

/// Experiment path that follows the ancestor of a resumed run.
///
/// A resumed experiment keeps writing where its original left off, so the
/// original name is resolved instead of the given one.
pub fn resumable_experiment_path(
  name: &ResourceName,
  original_name: Option<&ResourceName>,
  cloning_strategy: Option<CloningStrategy>,
) -> Result<String, NameError> {
  match (original_name, cloning_strategy) {
    (Some(original), Some(CloningStrategy::Resume)) => experiment_path(original),
    _ => experiment_path(name),
  }
}

/// The job ordinal is folded into the experiment segment before the kind
/// literal is chosen; a collapsed length of four means project ownership.
pub fn experiment_job_path(name: &ResourceName) -> Result<String, NameError> {
  check_count(ResourceKind::ExperimentJob, name, &[5, 6], "5 or 6")?;
  let segments = name.segments();
  let split = segments.len() - 2;
  let collapsed = segments[split..].join(".");
  let mut values: Vec<&str> = segments[..split].to_vec();
  values.push(&collapsed);

  let literal = if values.len() == 4 {
    EXPERIMENTS_SEGMENT
  } else {
    GROUPS_SEGMENT
  };
  Ok(insert_kind(values, literal))
}

/// Jobs, notebooks and projects map their dotted name onto directories.
pub fn flat_path(name: &ResourceName) -> String {
  name.as_str().replace('.', "/")
}

/// Relative path of any resource kind.
pub fn relative_path(kind: ResourceKind, name: &ResourceName) -> Result<String, NameError> {
  match kind {
    ResourceKind::ExperimentGroup => experiment_group_path(name),
    ResourceKind::Experiment => experiment_path(name),
    ResourceKind::ExperimentJob => experiment_job_path(name),
    ResourceKind::Project | ResourceKind::Job | ResourceKind::Notebook => Ok(flat_path(name)),
  }
}
