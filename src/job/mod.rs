//! Batch jobs: configuration, run session and record orchestration
//!
//! A job names the templates to place on every record's pages. [`Batch`]
//! prepares those templates once and then renders records in order, keeping
//! a failing slot from taking the rest of the run down with it.

pub mod batch;
pub mod config;
pub mod diagnostic;
pub mod session;

pub use batch::{render_failure_page, Batch, RunSummary};
pub use config::{JobConfig, JobInput, LayoutSpec};
pub use session::{CompiledTemplate, Session};
