//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use xsync_core::TieBreak;

/// xsync - Keep project files in step with their external copies
///
/// Reads the `Synchronize` mappings of a project descriptor and makes each
/// local/external pair byte-identical. A missing side is seeded from the
/// other; when both differ, the newer file wins.
#[derive(Parser, Debug)]
#[command(name = "xsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project descriptor listing the file mappings
    pub descriptor: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Report what would be copied without copying
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long, env = "XSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Which side wins when both files differ but share a timestamp
    #[arg(long, value_enum)]
    pub tie_break: Option<TieBreakArg>,
}

/// Command-line spelling of [`TieBreak`]
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreakArg {
    External,
    Local,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::External => TieBreak::External,
            TieBreakArg::Local => TieBreak::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_descriptor_only() {
        let cli = Cli::parse_from(["xsync", "Project.flprj"]);
        assert_eq!(cli.descriptor, PathBuf::from("Project.flprj"));
        assert!(!cli.verbose);
        assert!(!cli.dry_run);
        assert!(!cli.json);
        assert!(cli.tie_break.is_none());
    }

    #[test]
    fn parse_all_flags() {
        let cli = Cli::parse_from([
            "xsync",
            "-v",
            "--dry-run",
            "--json",
            "--config",
            "xsync.toml",
            "--tie-break",
            "local",
            "Project.flprj",
        ]);
        assert!(cli.verbose);
        assert!(cli.dry_run);
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("xsync.toml")));
        assert_eq!(cli.tie_break, Some(TieBreakArg::Local));
    }

    #[test]
    fn descriptor_is_required() {
        assert!(Cli::try_parse_from(["xsync"]).is_err());
    }

    #[test]
    fn second_positional_is_rejected() {
        assert!(Cli::try_parse_from(["xsync", "a.flprj", "b.flprj"]).is_err());
    }

    #[test]
    fn unknown_tie_break_is_rejected() {
        assert!(Cli::try_parse_from(["xsync", "--tie-break", "newest", "a.flprj"]).is_err());
    }

    #[test]
    fn tie_break_arg_maps_to_core() {
        assert_eq!(TieBreak::from(TieBreakArg::Local), TieBreak::Local);
        assert_eq!(TieBreak::from(TieBreakArg::External), TieBreak::External);
    }
}
