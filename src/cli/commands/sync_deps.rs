//! Sync-deps command implementation.
//!
//! The `monorel sync-deps` command pins a package's workspace dependencies
//! to the versions currently in their manifests, and optionally commits
//! and pushes the result from CI.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::args::SyncDepsArgs;
use crate::error::Result;
use crate::git::GitRepo;
use crate::shell::is_ci;
use crate::ui::UserInterface;
use crate::workspace::{sync_dependencies, Workspace};

use super::dispatcher::{Command, CommandResult};

/// Committer identity used for automated commits in CI.
pub const CI_USER_NAME: &str = "github-actions";
pub const CI_USER_EMAIL: &str = "actions@users.noreply.github.com";

/// The sync-deps command implementation.
pub struct SyncDepsCommand {
    project_root: PathBuf,
    prefix: String,
    args: SyncDepsArgs,
}

impl SyncDepsCommand {
    /// Create a new sync-deps command.
    pub fn new(project_root: &Path, prefix: &str, args: SyncDepsArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            prefix: prefix.to_string(),
            args,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the command arguments.
    pub fn args(&self) -> &SyncDepsArgs {
        &self.args
    }

    fn commit(&self, ui: &mut dyn UserInterface, manifest: &Path, remote: &str) -> Result<()> {
        let repo = GitRepo::discover(manifest.parent().unwrap_or(&self.project_root))?;
        if is_ci() {
            repo.configure_identity(CI_USER_NAME, CI_USER_EMAIL)?;
        }

        repo.add(&[manifest])?;
        repo.commit_staged(&format!(
            "chore({}): update workspace dependencies [skip ci]",
            self.args.package
        ))?;
        ui.success("Committed dependency updates");

        if self.args.no_push {
            return Ok(());
        }
        let mut spinner = ui.start_spinner(&format!("Pushing to {}", remote));
        match repo.push(remote) {
            Ok(()) => {
                spinner.finish_success(&format!("Pushed dependency updates to {}", remote));
                Ok(())
            }
            Err(e) => {
                spinner.finish_error("Push failed");
                Err(e)
            }
        }
    }
}

impl Command for SyncDepsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let start = self.project_root.canonicalize().with_context(|| {
            format!("Project directory {} not found", self.project_root.display())
        })?;
        let workspace = Workspace::discover(&start, self.prefix.as_str());
        let report = sync_dependencies(&workspace, &self.args.package)?;

        if !report.has_dependencies {
            ui.message(&format!(
                "No dependencies found in {}",
                report.manifest.display()
            ));
            return Ok(CommandResult::success());
        }

        for dep in &report.skipped {
            ui.warning(&format!(
                "Leaving '{}' alone: only bare names and == pins are synced",
                dep
            ));
        }

        if !report.changed() {
            ui.message("No dependency updates needed.");
            return Ok(CommandResult::success());
        }

        for update in &report.updates {
            ui.message(&format!(
                "Updating {} from {} to {}",
                update.name,
                update.from.as_deref().unwrap_or("None"),
                update.to
            ));
        }
        ui.show_detail("Dependencies", &report.dependencies.join(", "));

        if self.args.commit {
            let config = workspace
                .package(&self.args.package)?
                .manifest
                .release_config()?;
            self.commit(ui, &report.manifest, &config.remote.name)?;
        }

        Ok(CommandResult::success())
    }
}
