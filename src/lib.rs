//! Core library for the timesheet-tools command line application.
//!
//! The library exposes high-level orchestration helpers that power the
//! command-line interface as well as the unit tests. The modules are structured
//! to keep responsibilities narrow and composable: IO adapters live under
//! [`io`], data representations inside [`model`], the attendance rules in
//! [`schema`] and [`classify`], whole-workbook orchestration in [`validate`],
//! and the versioned output layout (ledgers, archives, zip bundles, monthly
//! templates) under [`output`].

pub mod classify;
pub mod error;
pub mod io;
pub mod model;
pub mod output;
pub mod schema;
pub mod summary;
pub mod validate;

pub use error::{Result, ToolError};
