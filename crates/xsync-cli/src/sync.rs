//! The synchronize command: descriptor in, per-pair reports out

use std::io::Write;
use std::path::Path;

use xsync_core::{Descriptor, PathResolver, Reconciler, RunSummary, SyncSettings};
use xsync_fs::NormalizedPath;

use crate::cli::Cli;
use crate::error::Result;
use crate::report;

/// Build the effective settings: the settings file if one is given, then
/// command-line overrides on top.
pub fn effective_settings(cli: &Cli) -> Result<SyncSettings> {
    let mut settings = match &cli.config {
        Some(path) => {
            tracing::debug!(config = %path.display(), "Loading settings");
            SyncSettings::load(&NormalizedPath::new(path))?
        }
        None => SyncSettings::default(),
    };

    settings.dry_run |= cli.dry_run;
    if let Some(tie_break) = cli.tie_break {
        settings.tie_break = tie_break.into();
    }
    Ok(settings)
}

/// Synchronize every mapping of `descriptor`, writing progress to `out`.
///
/// A missing or malformed descriptor and an empty mapping list are
/// reported on `out` and are not errors.
pub fn run_sync(
    descriptor: &Path,
    settings: SyncSettings,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let descriptor = match Descriptor::load(descriptor) {
        Ok(descriptor) => descriptor,
        Err(xsync_core::Error::DescriptorNotFound { path }) => {
            writeln!(out, "File {} doesn't exist.", path.display())?;
            return Ok(());
        }
        Err(xsync_core::Error::DescriptorParse { path, message }) => {
            writeln!(out, "File {} has invalid XML: {message}", path.display())?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if descriptor.is_empty() {
        if json {
            writeln!(out, "{}", RunSummary::default().to_json()?)?;
        } else {
            writeln!(
                out,
                "Project {} doesn't have any external resources to synchronize.",
                descriptor.path
            )?;
        }
        return Ok(());
    }

    let resolver = PathResolver::for_descriptor(&descriptor);
    let reconciler = Reconciler::new(settings);
    tracing::info!(
        descriptor = %descriptor.path,
        base = %resolver.base_dir(),
        mappings = descriptor.entries.len(),
        dry_run = reconciler.settings().dry_run,
        tie_break = %reconciler.settings().tie_break,
        "Synchronizing"
    );

    if json {
        let summary = reconciler.run_to_end(&resolver, descriptor.entries);
        writeln!(out, "{}", summary.to_json()?)?;
        return Ok(());
    }

    let mut summary = RunSummary::default();
    for pair in reconciler.run(&resolver, descriptor.entries) {
        for line in report::pair_lines(&pair) {
            writeln!(out, "{line}")?;
        }
        summary.reports.push(pair);
    }
    writeln!(out, "{}", report::summary_line(&summary))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use xsync_core::TieBreak;
    use xsync_test_utils::project::TestProject;

    fn output(descriptor: &Path, settings: SyncSettings, json: bool) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        run_sync(descriptor, settings, json, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn missing_descriptor_is_reported() {
        let project = TestProject::new();
        let path = project.project_dir().join("Missing.flprj");

        let text = output(&path, SyncSettings::default(), false);

        assert!(text.contains("doesn't exist"));
        assert!(text.contains("Missing.flprj"));
    }

    #[test]
    fn malformed_descriptor_is_reported() {
        let project = TestProject::new();
        let path = project.write_raw_descriptor("<CatapultProject><Synchronize>");

        let text = output(&path, SyncSettings::default(), false);

        assert!(text.contains("has invalid XML"));
    }

    #[test]
    fn empty_descriptor_has_nothing_to_do() {
        let project = TestProject::new();
        let path = project.write_descriptor(&[]);

        let text = output(&path, SyncSettings::default(), false);

        assert!(text.contains("doesn't have any external resources to synchronize"));
    }

    #[test]
    fn pairs_are_reported_then_summarized() {
        let project = TestProject::new();
        project.write_local("a.css", "body {}");
        let path = project.write_descriptor(&[("a.css", &project.external_spec("a.css"))]);

        let text = output(&path, SyncSettings::default(), false);

        assert!(text.contains("=> Processing LOCAL:"));
        assert!(text.contains("Copying LOCAL to EXTERNAL..."));
        assert!(text.contains("=> Done: 0 equal, 1 copied, 0 skipped, 0 failed"));
        project.assert_content(&project.external("a.css"), "body {}");
    }

    #[test]
    fn json_output_is_a_summary() {
        let project = TestProject::new();
        project.write_external("a.css", "body {}");
        let path = project.write_descriptor(&[("a.css", &project.external_spec("a.css"))]);

        let text = output(&path, SyncSettings::default(), true);
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["counts"]["copied"], 1);
        assert_eq!(json["pairs"][0]["outcome"], "copied_external_to_local");
    }

    #[test]
    fn command_line_overrides_settings_file() {
        let project = TestProject::new();
        let config = project.root().join("xsync.toml");
        std::fs::write(&config, "tie_break = \"external\"\ndry_run = false\n").unwrap();

        let cli = Cli::parse_from([
            "xsync",
            "--config",
            config.to_str().unwrap(),
            "--dry-run",
            "--tie-break",
            "local",
            "Project.flprj",
        ]);
        let settings = effective_settings(&cli).unwrap();

        assert!(settings.dry_run);
        assert_eq!(settings.tie_break, TieBreak::Local);
    }

    #[test]
    fn unreadable_settings_file_is_an_error() {
        let project = TestProject::new();
        let config = project.root().join("xsync.ini");
        std::fs::write(&config, "dry_run = true").unwrap();

        let cli = Cli::parse_from(["xsync", "-c", config.to_str().unwrap(), "Project.flprj"]);

        assert!(effective_settings(&cli).is_err());
    }
}
