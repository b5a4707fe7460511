//! Reconciliation engine for xsync
//!
//! Keeps pairs of files (a project-local copy and an external copy) byte
//! identical. The pairs come from a project descriptor; for each one the
//! engine seeds a missing side, leaves identical files alone, and otherwise
//! lets the newer file overwrite the older one.
//!
//! # Architecture
//!
//! ```text
//!        xsync-cli
//!            |
//!        xsync-core   descriptor -> resolve -> engine -> outcome
//!            |
//!        xsync-fs     paths, byte comparison, atomic copies
//! ```
//!
//! # Example
//!
//! ```no_run
//! use xsync_core::{Descriptor, PathResolver, Reconciler, SyncSettings};
//!
//! fn example() -> xsync_core::Result<()> {
//!     let descriptor = Descriptor::load("manual/Project.flprj")?;
//!     let resolver = PathResolver::for_descriptor(&descriptor);
//!     let reconciler = Reconciler::new(SyncSettings::default());
//!
//!     for report in reconciler.run(&resolver, descriptor.entries) {
//!         println!("{}: {:?}", report.entry.local_spec, report.outcome.kind());
//!     }
//!     Ok(())
//! }
//! ```

pub mod descriptor;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod resolve;
pub mod settings;

pub use descriptor::{Descriptor, MappingEntry, parse_mappings};
pub use engine::{Reconciler, Reconciliation};
pub use error::{Error, Result};
pub use outcome::{
    CopyDirection, CopyTrigger, OutcomeKind, PairRecord, PairReport, RunCounts, RunSummary,
    SyncOutcome,
};
pub use resolve::{PathResolver, ResolvedPair, resolve_external};
pub use settings::{RobustnessSettings, SyncSettings, TieBreak};
