//! Reconciliation engine
//!
//! For each pair, in order, first match wins:
//!
//! 1. External directory missing: abort the whole run
//! 2. Exactly one side exists: seed the missing side from it
//! 3. Both exist and are byte-identical: nothing to do
//! 4. Both exist and differ: the newer file overwrites the older one,
//!    equal timestamps go to the configured [`TieBreak`]
//!
//! Every copy is followed by a fresh comparison before success is reported.

use std::cmp::Ordering;
use std::iter::{Enumerate, FusedIterator};

use chrono::{DateTime, Utc};
use xsync_fs::{NormalizedPath, files_equal, io};

use crate::descriptor::MappingEntry;
use crate::outcome::{CopyDirection, CopyTrigger, PairReport, RunSummary, SyncOutcome};
use crate::resolve::{PathResolver, ResolvedPair};
use crate::settings::{SyncSettings, TieBreak};
use crate::{Error, Result};

/// Applies the newer-wins policy to file pairs.
///
/// Holds only immutable settings; every call takes its inputs explicitly.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    settings: SyncSettings,
}

impl Reconciler {
    pub fn new(settings: SyncSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Reconcile a single resolved pair.
    pub fn reconcile_pair(&self, pair: &ResolvedPair) -> SyncOutcome {
        tracing::debug!(local = %pair.local, external = %pair.external, "Processing pair");

        let external_dir = pair
            .external
            .parent()
            .unwrap_or_else(|| pair.external.clone());
        if !external_dir.is_dir() {
            tracing::error!(directory = %external_dir, "External directory does not exist, aborting run");
            return SyncOutcome::Aborted(Error::MissingExternalDirectory {
                path: external_dir.to_native(),
            });
        }

        match (pair.local.is_file(), pair.external.is_file()) {
            (false, false) => {
                tracing::debug!("Neither file exists, skipping");
                SyncOutcome::BothMissing
            }
            (false, true) => self.copy(pair, CopyDirection::ExternalToLocal, CopyTrigger::Seeded),
            (true, false) => self.copy(pair, CopyDirection::LocalToExternal, CopyTrigger::Seeded),
            (true, true) => match self.compare(pair) {
                Ok(true) => {
                    tracing::debug!("Files are identical");
                    SyncOutcome::AlreadyEqual
                }
                Ok(false) => match self.newer_side(pair) {
                    Ok(direction) => self.copy(pair, direction, CopyTrigger::Newer),
                    Err(e) => {
                        tracing::warn!(error = %e, "Could not read timestamps");
                        SyncOutcome::Failed(e)
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Comparison failed");
                    SyncOutcome::Failed(e)
                }
            },
        }
    }

    /// Resolve and reconcile entries lazily, stopping after a fatal outcome.
    pub fn run<'a, I>(&'a self, resolver: &'a PathResolver, entries: I) -> Reconciliation<'a, I::IntoIter>
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        Reconciliation {
            reconciler: self,
            resolver,
            entries: entries.into_iter().enumerate(),
            halted: false,
        }
    }

    /// Run every entry and collect the reports.
    pub fn run_to_end<I>(&self, resolver: &PathResolver, entries: I) -> RunSummary
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        self.run(resolver, entries).collect()
    }

    /// Which way to copy when both files exist and differ.
    pub fn newer_side(&self, pair: &ResolvedPair) -> Result<CopyDirection> {
        let local = modified_utc(&pair.local)?;
        let external = modified_utc(&pair.external)?;

        let direction = match local.cmp(&external) {
            Ordering::Less => CopyDirection::ExternalToLocal,
            Ordering::Greater => CopyDirection::LocalToExternal,
            Ordering::Equal => match self.settings.tie_break {
                TieBreak::External => CopyDirection::ExternalToLocal,
                TieBreak::Local => CopyDirection::LocalToExternal,
            },
        };

        tracing::debug!(
            local_modified = %local,
            external_modified = %external,
            ?direction,
            "Resolved divergence by timestamp"
        );
        Ok(direction)
    }

    fn compare(&self, pair: &ResolvedPair) -> Result<bool> {
        files_equal(&pair.local, &pair.external, self.settings.chunk_size)
            .map_err(|source| Error::ComparisonIo { source })
    }

    fn copy(&self, pair: &ResolvedPair, direction: CopyDirection, trigger: CopyTrigger) -> SyncOutcome {
        let (from, to) = direction.endpoints(pair);

        if self.settings.dry_run {
            tracing::info!(from = %from, to = %to, ?trigger, "[dry-run] Would copy");
            return SyncOutcome::copied(direction, trigger, true);
        }

        if let Err(source) = io::copy_atomic(
            from,
            to,
            self.settings.robustness.to_config(),
            self.settings.preserve_mtime,
        ) {
            tracing::warn!(from = %from, to = %to, error = %source, "Copy failed");
            return SyncOutcome::CopyFailed(Error::CopyFailed {
                from: from.to_native(),
                to: to.to_native(),
                source,
            });
        }
        tracing::info!(from = %from, to = %to, ?trigger, "Copied");

        match self.compare(pair) {
            Ok(true) => SyncOutcome::copied(direction, trigger, false),
            Ok(false) => {
                tracing::warn!(local = %pair.local, external = %pair.external, "Files still differ after copy");
                SyncOutcome::Failed(Error::PostCopyMismatch {
                    local: pair.local.to_native(),
                    external: pair.external.to_native(),
                })
            }
            Err(e) => SyncOutcome::Failed(e),
        }
    }
}

fn modified_utc(path: &NormalizedPath) -> Result<DateTime<Utc>> {
    io::modified_time(path)
        .map(DateTime::<Utc>::from)
        .map_err(|source| Error::ComparisonIo { source })
}

/// Lazy sequence of pair reports for one run.
///
/// Finite and not restartable. After yielding a fatal report it yields
/// nothing more.
pub struct Reconciliation<'a, I> {
    reconciler: &'a Reconciler,
    resolver: &'a PathResolver,
    entries: Enumerate<I>,
    halted: bool,
}

impl<I> Iterator for Reconciliation<'_, I>
where
    I: Iterator<Item = MappingEntry>,
{
    type Item = PairReport;

    fn next(&mut self) -> Option<PairReport> {
        if self.halted {
            return None;
        }
        let (index, entry) = self.entries.next()?;

        let report = match self.resolver.resolve(&entry) {
            Ok(resolved) => {
                let outcome = self.reconciler.reconcile_pair(&resolved);
                PairReport {
                    index,
                    entry,
                    resolved: Some(resolved),
                    outcome,
                }
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping mapping with invalid path spec");
                PairReport {
                    index,
                    entry,
                    resolved: None,
                    outcome: SyncOutcome::Failed(e),
                }
            }
        };

        if report.outcome.is_fatal() {
            self.halted = true;
        }
        Some(report)
    }
}

impl<I> FusedIterator for Reconciliation<'_, I> where I: Iterator<Item = MappingEntry> {}
