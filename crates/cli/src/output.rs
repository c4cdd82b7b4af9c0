//! CLI output formatting.
//!
//! Every human-readable line is about a path or a persistence, so the helpers
//! here take paths and render them the same way on every platform. Scripts
//! get pretty JSON instead.

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Outcome of one operation on the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Done,
  Failed,
  Skipped,
}

impl Outcome {
  fn marker(self) -> &'static str {
    match self {
      Outcome::Done => "✓",
      Outcome::Failed => "✗",
      Outcome::Skipped => "⚠",
    }
  }
}

/// Paths print with forward slashes on every platform so output is stable.
pub fn display_path(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}

/// `Created /plx/outputs/user/project/experiments/7`
pub fn path_line(verb: &str, path: &Path) -> String {
  format!("{} {}", verb, display_path(path))
}

/// `Copied /plx/outputs/a → s3://outputs/b`
pub fn transfer_line(verb: &str, from: &Path, to: &Path) -> String {
  format!("{} {} → {}", verb, display_path(from), display_path(to))
}

/// A catalog entry as listed by `info`, with its root already displayed.
pub fn persistence_line(name: &str, root: &str, backend: &str) -> String {
  format!("{name} → {root} ({backend})")
}

/// Successes go to stdout; failures and skips go to stderr in color.
pub fn print_outcome(outcome: Outcome, message: &str) {
  match outcome {
    Outcome::Done => println!(
      "{} {}",
      outcome.marker().if_supports_color(Stream::Stdout, |s| s.green()),
      message
    ),
    Outcome::Failed => eprintln!(
      "{} {}",
      outcome.marker().if_supports_color(Stream::Stderr, |s| s.red()),
      message.if_supports_color(Stream::Stderr, |s| s.red())
    ),
    Outcome::Skipped => eprintln!(
      "{} {}",
      outcome.marker().if_supports_color(Stream::Stderr, |s| s.yellow()),
      message.if_supports_color(Stream::Stderr, |s| s.yellow())
    ),
  }
}

pub fn print_path(verb: &str, path: &Path) {
  print_outcome(Outcome::Done, &path_line(verb, path));
}

pub fn print_failure(message: &str) {
  print_outcome(Outcome::Failed, message);
}

/// An indented `label: value` line under a heading.
pub fn print_field(label: &str, value: impl std::fmt::Display) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to encode output as JSON")?;
  println!("{json}");
  Ok(())
}
