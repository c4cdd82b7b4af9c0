//! runstore-lib: artifact locations for machine-learning runs.
//!
//! Experiments, experiment groups, jobs, notebooks and projects are named with
//! dotted identifiers such as `user.project.7`. This crate maps those names to
//! paths on configured persistences (mounted volumes or object-store buckets)
//! and creates, copies and deletes artifacts there:
//! - `naming`: dotted names to relative paths
//! - `persistence`: named data, outputs and logs roots
//! - `store`: local and object-store backends behind one trait
//! - `stores`: the service combining the three
//! - `tasks`: background deletion
//! - `events`: lifecycle event handlers

pub mod config;
pub mod consts;
pub mod events;
pub mod naming;
pub mod persistence;
pub mod platform;
pub mod store;
pub mod stores;
pub mod tasks;
#[cfg(test)]
mod util;
