//! Doctor command implementation.
//!
//! The `monorel doctor` command checks what a release needs from the
//! environment: a remote the token can push to over HTTPS, and a hosting
//! token with write access to the repository.

use std::path::{Path, PathBuf};

use crate::cli::args::DoctorArgs;
use crate::error::Result;
use crate::git::{GitRepo, RemoteUrl};
use crate::release::{api_base_url, GitHubClient};
use crate::secrets::{OutputMasker, Token};
use crate::ui::UserInterface;

use super::context::PackageContext;
use super::dispatcher::{Command, CommandResult};

const TOKEN_HINT: &str = "Create a fine-grained token with Contents read/write and Metadata read-only access to this repository";

/// The doctor command implementation.
pub struct DoctorCommand {
    project_root: PathBuf,
    prefix: String,
    args: DoctorArgs,
}

impl DoctorCommand {
    /// Create a new doctor command.
    pub fn new(project_root: &Path, prefix: &str, args: DoctorArgs) -> Self {
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
    pub fn args(&self) -> &DoctorArgs {
        &self.args
    }

    /// Check the remote; returns it when it names a hosted repository.
    fn check_remote(
        &self,
        ui: &mut dyn UserInterface,
        repo: &GitRepo,
        name: &str,
        masker: &OutputMasker,
        failures: &mut usize,
    ) -> Result<Option<RemoteUrl>> {
        let Some(url) = repo.remote_url(name)? else {
            ui.error(&format!("Remote '{}' is not configured", name));
            *failures += 1;
            return Ok(None);
        };

        let remote: RemoteUrl = match url.parse() {
            Ok(remote) => remote,
            Err(e) => {
                ui.error(&masker.mask(&e.to_string()));
                *failures += 1;
                return Ok(None);
            }
        };

        if !remote.is_ssh() {
            ui.success(&masker.mask(&format!("Remote '{}' uses HTTPS ({})", name, url)));
            return Ok(Some(remote));
        }

        let https = remote.to_https();
        ui.warning(&format!(
            "Remote '{}' uses SSH ({}); token-authenticated pushes need HTTPS",
            name, url
        ));
        let apply = self.args.fix
            || (ui.is_interactive()
                && ui.confirm(&format!("Switch remote '{}' to HTTPS?", name), false)?);
        if apply {
            repo.set_remote_url(name, &https)?;
            ui.success(&format!("Remote '{}' now points at {}", name, https));
        } else {
            ui.show_hint(&format!("git remote set-url {} {}", name, https));
            *failures += 1;
        }
        Ok(Some(remote))
    }

    fn check_token(
        &self,
        ui: &mut dyn UserInterface,
        ctx: &PackageContext,
        remote: Option<&RemoteUrl>,
        masker: &OutputMasker,
        failures: &mut usize,
    ) -> Result<()> {
        let var = &ctx.config.remote.token_var;
        let Some(token) = Token::from_env(var) else {
            ui.error(&format!("{} is not set", var));
            ui.show_hint(TOKEN_HINT);
            *failures += 1;
            return Ok(());
        };
        ui.success(&format!("{} is set ({})", var, token.hint()));

        let Some(remote) = remote else {
            return Ok(());
        };
        let client = GitHubClient::new(api_base_url(&ctx.config.remote), &token)?;
        match client.repo_access(&remote.slug()) {
            Ok(access) if access.can_release() => {
                ui.success(&format!("Token can push to {}", access.full_name));
            }
            Ok(access) => {
                ui.error(&format!(
                    "Token can read {} but cannot push to it",
                    access.full_name
                ));
                ui.show_hint(TOKEN_HINT);
                *failures += 1;
            }
            Err(e) => {
                ui.error(&masker.mask(&format!("Token check failed: {}", e)));
                *failures += 1;
            }
        }
        Ok(())
    }
}

impl Command for DoctorCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = PackageContext::load(
            &self.project_root,
            &self.prefix,
            self.args.package.as_deref(),
        )?;
        let repo = ctx.repo()?;

        let mut masker = OutputMasker::new();
        if let Some(token) = Token::from_env(&ctx.config.remote.token_var) {
            masker.add_secret(token.expose());
        }

        ui.show_header(&format!("Release checks for {}", ctx.package.display_name()));
        let mut failures = 0;
        let remote =
            self.check_remote(ui, &repo, &ctx.config.remote.name, &masker, &mut failures)?;
        self.check_token(ui, &ctx, remote.as_ref(), &masker, &mut failures)?;

        if failures > 0 {
            ui.error(&format!("{} check(s) failed", failures));
            return Ok(CommandResult::failure(1));
        }
        ui.success("Ready to release");
        Ok(CommandResult::success())
    }
}
