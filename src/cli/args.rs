//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// monorel - Release automation for Python workspace monorepos.
#[derive(Debug, Parser)]
#[command(name = "monorel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the workspace or package directory (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Prefix stripped from package names to find their directory under packages/
    #[arg(long, global = true, env = "MONOREL_PREFIX", default_value = "")]
    pub prefix: String,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show how each commit since the last release is classified
    Parse(ParseArgs),

    /// Compute the next version, update files, tag, push and publish
    Version(VersionArgs),

    /// Pin workspace dependencies to their current versions
    SyncDeps(SyncDepsArgs),

    /// Check the hosting token and remote configuration
    Doctor(DoctorArgs),

    /// Show resolved release configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// Package named on the command line, if any.
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::Parse(args) => args.package.as_deref(),
            Self::Version(args) => args.package.as_deref(),
            Self::SyncDeps(args) => Some(&args.package),
            Self::Doctor(args) => args.package.as_deref(),
            Self::Config(args) => args.package.as_deref(),
            Self::Completions(_) => None,
        }
    }
}

/// Arguments for the `parse` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ParseArgs {
    /// Package name, or `root` (default: the package containing the project directory)
    pub package: Option<String>,

    /// Revision range to parse instead of "since the last release"
    #[arg(long)]
    pub range: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `version` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct VersionArgs {
    /// Package name, or `root` (default: the package containing the project directory)
    pub package: Option<String>,

    /// Print the next version and exit
    #[arg(long, conflicts_with = "print_tag")]
    pub print: bool,

    /// Print the next tag and exit
    #[arg(long)]
    pub print_tag: bool,

    /// Release a candidate (`-rc.N`) instead of a final version
    #[arg(long)]
    pub prerelease: bool,

    /// Don't update the changelog
    #[arg(long)]
    pub no_changelog: bool,

    /// Update files but don't commit, tag or push
    #[arg(long)]
    pub no_commit: bool,

    /// Commit and tag locally but don't push or publish
    #[arg(long)]
    pub no_push: bool,

    /// Don't build, upload or create a hosting release
    #[arg(long)]
    pub skip_publish: bool,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `sync-deps` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SyncDepsArgs {
    /// Package whose dependencies are updated, or `root`
    pub package: String,

    /// Commit the updated manifest and push it
    #[arg(long)]
    pub commit: bool,

    /// With --commit, don't push
    #[arg(long, requires = "commit")]
    pub no_push: bool,
}

/// Arguments for the `doctor` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DoctorArgs {
    /// Package whose configuration names the token and remote (default: the current package)
    pub package: Option<String>,

    /// Switch an SSH remote to HTTPS
    #[arg(long)]
    pub fix: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Package name, or `root` (default: the package containing the project directory)
    pub package: Option<String>,

    /// Print the JSON schema of `[tool.semantic_release]`
    #[arg(long)]
    pub schema: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_version_flags() {
        let cli = Cli::try_parse_from([
            "monorel",
            "version",
            "core",
            "--skip-publish",
            "--no-push",
        ])
        .unwrap();
        match cli.command {
            Commands::Version(args) => {
                assert_eq!(args.package.as_deref(), Some("core"));
                assert!(args.skip_publish);
                assert!(args.no_push);
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["monorel", "sync-deps", "svc1", "--prefix", "acme-", "-q"])
            .unwrap();
        assert_eq!(cli.prefix, "acme-");
        assert!(cli.quiet);
    }

    #[test]
    fn sync_deps_requires_package() {
        assert!(Cli::try_parse_from(["monorel", "sync-deps"]).is_err());
    }

    #[test]
    fn no_push_requires_commit() {
        assert!(Cli::try_parse_from(["monorel", "sync-deps", "core", "--no-push"]).is_err());
    }

    #[test]
    fn print_conflicts_with_print_tag() {
        assert!(Cli::try_parse_from(["monorel", "version", "--print", "--print-tag"]).is_err());
    }
}
