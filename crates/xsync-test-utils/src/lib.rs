//! Shared test utilities for the xsync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`project::TestProject`], a project directory with a
//!   descriptor next to a separate "share" directory for external copies

pub mod project;
