//! Human-readable console lines for pair reports

use colored::Colorize;
use xsync_core::{CopyDirection, CopyTrigger, PairReport, RunSummary, SyncOutcome};

/// Lines describing one processed pair, in the order the steps happened.
pub fn pair_lines(report: &PairReport) -> Vec<String> {
    let mut lines = vec![header(report)];

    match &report.outcome {
        SyncOutcome::AlreadyEqual => {
            lines.push("Files are identical. Moving on...".to_string());
        }
        SyncOutcome::BothMissing => {
            lines.push(format!(
                "{} Neither file exists. Nothing to synchronize.",
                "SKIP".yellow().bold()
            ));
        }
        SyncOutcome::CopiedLocalToExternal { trigger, dry_run } => {
            copy_lines(&mut lines, CopyDirection::LocalToExternal, *trigger, *dry_run);
        }
        SyncOutcome::CopiedExternalToLocal { trigger, dry_run } => {
            copy_lines(&mut lines, CopyDirection::ExternalToLocal, *trigger, *dry_run);
        }
        SyncOutcome::Aborted(e) => {
            lines.push(format!("{} {e}. Aborting...", "FATAL".red().bold()));
        }
        SyncOutcome::CopyFailed(e) | SyncOutcome::Failed(e) => {
            lines.push(format!(
                "{} Could not process files: {e}",
                "FAIL".red().bold()
            ));
        }
    }

    lines
}

/// Closing line with the per-kind counts.
pub fn summary_line(summary: &RunSummary) -> String {
    let counts = summary.counts();
    let tally = format!(
        "{} equal, {} copied, {} skipped, {} failed",
        counts.equal, counts.copied, counts.skipped, counts.failed
    );
    if summary.aborted() {
        format!("{} Stopped early: {tally}", "=>".red().bold())
    } else {
        format!("{} Done: {tally}", "=>".blue().bold())
    }
}

fn header(report: &PairReport) -> String {
    let (local, external) = match &report.resolved {
        Some(pair) => (pair.local.to_string(), pair.external.to_string()),
        None => (
            report.entry.local_spec.clone(),
            report.entry.external_spec.clone(),
        ),
    };
    format!(
        "{} Processing LOCAL: {} and EXTERNAL: {}",
        "=>".blue().bold(),
        local.cyan(),
        external.cyan()
    )
}

fn copy_lines(lines: &mut Vec<String>, direction: CopyDirection, trigger: CopyTrigger, dry_run: bool) {
    let (source, target) = match direction {
        CopyDirection::LocalToExternal => ("LOCAL", "EXTERNAL"),
        CopyDirection::ExternalToLocal => ("EXTERNAL", "LOCAL"),
    };

    let reason = match trigger {
        CopyTrigger::Seeded => format!("{target} file doesn't exist."),
        CopyTrigger::Newer => format!("{source} file is newer."),
    };

    if dry_run {
        lines.push(format!(
            "{reason} {} Would copy {source} to {target}",
            "[dry-run]".yellow()
        ));
    } else {
        lines.push(format!("{reason} Copying {source} to {target}..."));
        lines.push(format!("{} Files synchronized", "OK".green().bold()));
    }
}
