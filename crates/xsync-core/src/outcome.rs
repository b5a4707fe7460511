//! Per-pair outcomes and run summaries

use serde::Serialize;

use crate::Error;
use crate::descriptor::MappingEntry;
use crate::resolve::ResolvedPair;

/// Which way a copy went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyDirection {
    LocalToExternal,
    ExternalToLocal,
}

impl CopyDirection {
    /// `(source, destination)` for this direction.
    pub fn endpoints<'a>(
        &self,
        pair: &'a ResolvedPair,
    ) -> (&'a xsync_fs::NormalizedPath, &'a xsync_fs::NormalizedPath) {
        match self {
            Self::LocalToExternal => (&pair.local, &pair.external),
            Self::ExternalToLocal => (&pair.external, &pair.local),
        }
    }
}

/// Why a copy happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyTrigger {
    /// Only one side existed
    Seeded,
    /// Both existed and differed; the newer one won
    Newer,
}

/// Result of reconciling one pair.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Both files existed with identical content
    AlreadyEqual,
    /// Neither file existed; nothing to seed from
    BothMissing,
    CopiedLocalToExternal { trigger: CopyTrigger, dry_run: bool },
    CopiedExternalToLocal { trigger: CopyTrigger, dry_run: bool },
    /// The run must stop here
    Aborted(Error),
    CopyFailed(Error),
    /// Invalid spec, comparison error, or files still differ after copying
    Failed(Error),
}

impl SyncOutcome {
    pub fn copied(direction: CopyDirection, trigger: CopyTrigger, dry_run: bool) -> Self {
        match direction {
            CopyDirection::LocalToExternal => Self::CopiedLocalToExternal { trigger, dry_run },
            CopyDirection::ExternalToLocal => Self::CopiedExternalToLocal { trigger, dry_run },
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Whether the pair ended in a consistent state (or would have, in a
    /// dry run).
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::AlreadyEqual
                | Self::BothMissing
                | Self::CopiedLocalToExternal { .. }
                | Self::CopiedExternalToLocal { .. }
        )
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Aborted(e) | Self::CopyFailed(e) | Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::AlreadyEqual => OutcomeKind::AlreadyEqual,
            Self::BothMissing => OutcomeKind::BothMissing,
            Self::CopiedLocalToExternal { .. } => OutcomeKind::CopiedLocalToExternal,
            Self::CopiedExternalToLocal { .. } => OutcomeKind::CopiedExternalToLocal,
            Self::Aborted(_) => OutcomeKind::Aborted,
            Self::CopyFailed(_) => OutcomeKind::CopyFailed,
            Self::Failed(_) => OutcomeKind::Failed,
        }
    }
}

/// Tag of a [`SyncOutcome`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    AlreadyEqual,
    BothMissing,
    CopiedLocalToExternal,
    CopiedExternalToLocal,
    Aborted,
    CopyFailed,
    Failed,
}

/// What happened to one mapping entry.
#[derive(Debug)]
pub struct PairReport {
    /// Position in the descriptor, from zero
    pub index: usize,
    pub entry: MappingEntry,
    /// `None` when the specs could not be resolved
    pub resolved: Option<ResolvedPair>,
    pub outcome: SyncOutcome,
}

impl PairReport {
    pub fn record(&self) -> PairRecord<'_> {
        let (trigger, dry_run) = match &self.outcome {
            SyncOutcome::CopiedLocalToExternal { trigger, dry_run }
            | SyncOutcome::CopiedExternalToLocal { trigger, dry_run } => {
                (Some(*trigger), *dry_run)
            }
            _ => (None, false),
        };

        PairRecord {
            index: self.index,
            local_spec: &self.entry.local_spec,
            external_spec: &self.entry.external_spec,
            resolved: self.resolved.as_ref(),
            outcome: self.outcome.kind(),
            trigger,
            dry_run,
            message: self.outcome.error().map(ToString::to_string),
        }
    }
}

/// Serializable view of a [`PairReport`].
#[derive(Debug, Serialize)]
pub struct PairRecord<'a> {
    pub index: usize,
    pub local_spec: &'a str,
    pub external_spec: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<&'a ResolvedPair>,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<CopyTrigger>,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Counters over a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub equal: usize,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// All pair reports of one run, in order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<PairReport>,
}

impl RunSummary {
    /// Whether the run stopped on a fatal outcome.
    pub fn aborted(&self) -> bool {
        self.reports.iter().any(|r| r.outcome.is_fatal())
    }

    pub fn counts(&self) -> RunCounts {
        let mut counts = RunCounts::default();
        for report in &self.reports {
            match report.outcome {
                SyncOutcome::AlreadyEqual => counts.equal += 1,
                SyncOutcome::BothMissing => counts.skipped += 1,
                SyncOutcome::CopiedLocalToExternal { .. }
                | SyncOutcome::CopiedExternalToLocal { .. } => counts.copied += 1,
                SyncOutcome::Aborted(_) | SyncOutcome::CopyFailed(_) | SyncOutcome::Failed(_) => {
                    counts.failed += 1
                }
            }
        }
        counts
    }

    /// Whether every processed pair ended consistent and the run finished.
    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(|r| r.outcome.is_success())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct SummaryRecord<'a> {
            aborted: bool,
            counts: RunCounts,
            pairs: Vec<PairRecord<'a>>,
        }

        serde_json::to_string_pretty(&SummaryRecord {
            aborted: self.aborted(),
            counts: self.counts(),
            pairs: self.reports.iter().map(PairReport::record).collect(),
        })
    }
}

impl FromIterator<PairReport> for RunSummary {
    fn from_iter<T: IntoIterator<Item = PairReport>>(iter: T) -> Self {
        Self {
            reports: iter.into_iter().collect(),
        }
    }
}
