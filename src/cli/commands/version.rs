//! Version command implementation.
//!
//! The `monorel version` command cuts a release of one package:
//!
//! 1. Plan the next version from commits since the last release tag
//! 2. Write the version into `pyproject.toml` and prepend the changelog
//! 3. Commit, tag and push
//! 4. Build and upload distributions, and create a hosting release
//!
//! Each stage can be stopped early with `--print`, `--dry-run`,
//! `--no-commit`, `--no-push` or `--skip-publish`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::args::VersionArgs;
use crate::error::Result;
use crate::git::GitRepo;
use crate::release::{
    api_base_url, build_distributions, plan_release, release_notes, render_section,
    upload_to_index, Changelog, GitHubClient, NewRelease, PlanOptions, ReleasePlan, TagFormat,
    Version,
};
use crate::secrets::{OutputMasker, Token};
use crate::ui::{OutputMode, UserInterface};
use crate::workspace::set_project_version;

use super::context::PackageContext;
use super::dispatcher::{Command, CommandResult};
use super::display::show_result;

/// The version command implementation.
pub struct VersionCommand {
    project_root: PathBuf,
    prefix: String,
    args: VersionArgs,
}

impl VersionCommand {
    /// Create a new version command.
    pub fn new(project_root: &Path, prefix: &str, args: VersionArgs) -> Self {
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
    pub fn args(&self) -> &VersionArgs {
        &self.args
    }

    fn print(&self, ui: &mut dyn UserInterface, plan: &ReleasePlan) -> Result<CommandResult> {
        let version = plan.next_version.unwrap_or(plan.current_version);
        let text = if self.args.print_tag {
            TagFormat::new(&plan.tag_format)?.render(&version)
        } else {
            version.to_string()
        };
        ui.output(&text);
        Ok(CommandResult::success())
    }

    /// Write the new version and changelog; returns the files changed.
    fn apply(
        &self,
        ui: &mut dyn UserInterface,
        ctx: &PackageContext,
        next: &Version,
        section: &str,
    ) -> Result<Vec<PathBuf>> {
        let manifest = ctx.package.manifest.path().to_path_buf();
        let updated = set_project_version(&manifest, ctx.package.manifest.text(), &next.pep440())?;
        fs::write(&manifest, updated)?;
        ui.success(&format!(
            "Set version {} in {}",
            next.pep440(),
            ctx.display_path(&manifest)
        ));

        let mut changed = vec![manifest];
        if !self.args.no_changelog {
            let changelog = Changelog::new(&ctx.package.dir, &ctx.config.changelog_file);
            changelog.prepend(section)?;
            ui.success(&format!("Updated {}", ctx.display_path(changelog.path())));
            changed.push(changelog.path().to_path_buf());
        }
        Ok(changed)
    }

    fn commit_and_tag(
        &self,
        ui: &mut dyn UserInterface,
        ctx: &PackageContext,
        repo: &GitRepo,
        changed: &[PathBuf],
        next: &Version,
        tag: &str,
    ) -> Result<()> {
        let paths: Vec<&Path> = changed.iter().map(PathBuf::as_path).collect();
        repo.add(&paths)?;
        let message =
            ctx.config
                .render_commit_message(ctx.package.display_name(), &next.to_string(), tag);
        if repo.has_staged_changes()? {
            repo.commit_staged(&message)?;
            repo.tag(tag, tag)?;
            ui.success(&format!("Committed and tagged {}", tag));
        } else {
            tracing::debug!("nothing to commit for {}, tagging HEAD", tag);
            repo.tag(tag, tag)?;
            ui.success(&format!("Tagged {}", tag));
        }
        Ok(())
    }

    fn push(
        &self,
        ui: &mut dyn UserInterface,
        ctx: &PackageContext,
        repo: &GitRepo,
        tag: &str,
    ) -> Result<()> {
        let remote = &ctx.config.remote.name;
        let mut spinner = ui.start_spinner(&format!("Pushing to {}", remote));
        let pushed = repo.push(remote).and_then(|_| repo.push_tag(remote, tag));
        match pushed {
            Ok(()) => {
                spinner.finish_success(&format!("Pushed {} to {}", tag, remote));
                Ok(())
            }
            Err(e) => {
                spinner.finish_error(&format!("Push to {} failed", remote));
                Err(e)
            }
        }
    }

    fn publish(
        &self,
        ui: &mut dyn UserInterface,
        ctx: &PackageContext,
        repo: &GitRepo,
        plan: &ReleasePlan,
        next: &Version,
        tag: &str,
    ) -> Result<()> {
        let publish = &ctx.config.publish;
        if !publish.upload_to_pypi && !publish.upload_to_release {
            ui.message("Nothing to publish: upload_to_pypi and upload_to_release are both off");
            return Ok(());
        }

        let mut files = Vec::new();
        if publish.upload_to_pypi {
            let mut spinner = ui.start_spinner("Building distributions");
            files = build_distributions(&ctx.package.dir, publish, next)?;
            spinner.set_message("Uploading to the package index");
            upload_to_index(&ctx.package.dir, publish, &files)?;
            spinner.finish_success(&format!("Uploaded {} file(s)", files.len()));
        }

        if publish.upload_to_release {
            let token = Token::require(&ctx.config.remote.token_var)?;
            let masker = OutputMasker::for_token(&token);
            let remote = ctx.remote(repo).ok_or_else(|| {
                anyhow::anyhow!(
                    "Remote '{}' is missing or not a hosted repository URL",
                    ctx.config.remote.name
                )
            })?;

            let client = GitHubClient::new(api_base_url(&ctx.config.remote), &token)?;
            let body = release_notes(&plan.parsed_commits(), ctx.commit_url(repo).as_deref());
            let release = client.create_release(
                &remote.slug(),
                &NewRelease {
                    tag_name: tag.to_string(),
                    name: tag.to_string(),
                    body,
                    draft: false,
                    prerelease: next.is_prerelease(),
                },
            )?;
            for file in &files {
                client.upload_asset(&release, file)?;
            }
            ui.success(&masker.mask(&format!("Created release {}", release.html_url)));
        }
        Ok(())
    }
}

impl Command for VersionCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = PackageContext::load(
            &self.project_root,
            &self.prefix,
            self.args.package.as_deref(),
        )?;
        let repo = ctx.repo()?;
        let plan = plan_release(
            &repo,
            &ctx.package,
            &ctx.config,
            PlanOptions {
                prerelease: self.args.prerelease,
            },
        )?;

        if self.args.print || self.args.print_tag {
            return self.print(ui, &plan);
        }

        ui.show_header(&format!("Releasing {}", ctx.package.display_name()));
        ui.show_detail("Current", &plan.current_version.to_string());
        ui.show_detail(
            "Previous tag",
            plan.previous_tag.as_deref().unwrap_or("none"),
        );
        ui.show_detail("Bump", plan.bump.as_str());
        if ui.output_mode() == OutputMode::Verbose {
            for result in &plan.results {
                show_result(ui, result);
            }
        }

        let (Some(next), Some(tag)) = (plan.next_version, plan.next_tag.clone()) else {
            ui.message("No release: no commit since the last release asks for one.");
            return Ok(CommandResult::success());
        };
        ui.show_detail("Next", &next.to_string());
        ui.show_detail("Tag", &tag);

        let commits = plan.parsed_commits();
        let section = render_section(
            &tag,
            Local::now().date_naive(),
            &commits,
            ctx.commit_url(&repo).as_deref(),
        );

        if self.args.dry_run {
            if !self.args.no_changelog {
                let changelog = Changelog::new(&ctx.package.dir, &ctx.config.changelog_file);
                ui.message(&format!(
                    "Would prepend to {}:",
                    ctx.display_path(changelog.path())
                ));
                ui.message(&section);
            }
            ui.message("Dry run: nothing was changed.");
            return Ok(CommandResult::success());
        }

        let changed = self.apply(ui, &ctx, &next, &section)?;

        if self.args.no_commit {
            ui.message("Skipping commit, tag and push (--no-commit)");
            return Ok(CommandResult::success());
        }
        self.commit_and_tag(ui, &ctx, &repo, &changed, &next, &tag)?;

        if self.args.no_push {
            ui.message("Skipping push and publish (--no-push)");
            return Ok(CommandResult::success());
        }
        self.push(ui, &ctx, &repo, &tag)?;

        if self.args.skip_publish {
            ui.message("Skipping publish (--skip-publish)");
        } else {
            self.publish(ui, &ctx, &repo, &plan, &next, &tag)?;
        }

        ui.success(&format!("Released {}", tag));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::process::Command as Process;
    use tempfile::TempDir;

    use crate::ui::MockUI;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Process::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {:?} failed", args);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn commit_file(dir: &Path, file: &str, message: &str) {
        let path = dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, message).unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-m", message]);
    }

    /// Workspace with `core` released as 0.1.0 and one feature since.
    fn setup(core_extra: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        git(dir, &["init", "--initial-branch=main"]);
        git(dir, &["config", "user.email", "test@test.com"]);
        git(dir, &["config", "user.name", "Test"]);
        fs::write(
            dir.join("pyproject.toml"),
            "[project]\nname = \"mono\"\nversion = \"1.0.0\"\n\n[tool.uv.workspace]\nmembers = [\"packages/*\"]\n",
        )
        .unwrap();
        fs::create_dir_all(dir.join("packages/core")).unwrap();
        fs::write(
            dir.join("packages/core/pyproject.toml"),
            format!(
                "[project]\nname = \"core\"\nversion = \"0.1.0\"\n\n[tool.semantic_release.publish]\nupload_to_release = false\n{}",
                core_extra
            ),
        )
        .unwrap();
        git(dir, &["add", "."]);
        git(dir, &["commit", "-m", "chore: init workspace"]);
        git(dir, &["tag", "core-v0.1.0"]);
        commit_file(dir, "packages/core/api.py", "feat: add api");
        temp
    }

    fn args(package: &str) -> VersionArgs {
        VersionArgs {
            package: Some(package.into()),
            ..Default::default()
        }
    }

    fn run(temp: &TempDir, args: VersionArgs) -> MockUI {
        let mut ui = MockUI::new();
        let result = VersionCommand::new(temp.path(), "", args)
            .execute(&mut ui)
            .unwrap();
        assert!(result.success);
        ui
    }

    #[test]
    fn print_outputs_next_version() {
        let temp = setup("");
        let ui = run(
            &temp,
            VersionArgs {
                print: true,
                ..args("core")
            },
        );
        assert_eq!(ui.output_text(), "0.2.0");
    }

    #[test]
    fn print_tag_outputs_next_tag() {
        let temp = setup("");
        let ui = run(
            &temp,
            VersionArgs {
                print_tag: true,
                prerelease: true,
                ..args("core")
            },
        );
        assert_eq!(ui.output_text(), "core-v0.2.0-rc.1");
    }

    #[test]
    fn print_without_release_outputs_current_version() {
        let temp = setup("");
        git(temp.path(), &["tag", "core-v0.2.0"]);
        let ui = run(
            &temp,
            VersionArgs {
                print: true,
                ..args("core")
            },
        );
        assert_eq!(ui.output_text(), "0.1.0");
    }

    #[test]
    fn dry_run_changes_nothing() {
        let temp = setup("");
        let before = fs::read_to_string(temp.path().join("packages/core/pyproject.toml")).unwrap();
        let ui = run(
            &temp,
            VersionArgs {
                dry_run: true,
                ..args("core")
            },
        );

        assert_eq!(ui.detail("Next"), Some("0.2.0"));
        assert!(ui.has_message("## core-v0.2.0"));
        assert!(ui.has_message("Dry run"));
        let after = fs::read_to_string(temp.path().join("packages/core/pyproject.toml")).unwrap();
        assert_eq!(before, after);
        assert!(!temp.path().join("packages/core/CHANGELOG.md").exists());
    }

    #[test]
    fn no_commit_updates_files_only() {
        let temp = setup("");
        run(
            &temp,
            VersionArgs {
                no_commit: true,
                ..args("core")
            },
        );

        let manifest = fs::read_to_string(temp.path().join("packages/core/pyproject.toml")).unwrap();
        assert!(manifest.contains("version = \"0.2.0\""));
        let changelog = fs::read_to_string(temp.path().join("packages/core/CHANGELOG.md")).unwrap();
        assert!(changelog.starts_with("# CHANGELOG"));
        assert!(changelog.contains("add api"));
        assert_eq!(git(temp.path(), &["tag", "--list", "core-v0.2.0"]), "");
    }

    #[test]
    fn no_push_commits_and_tags() {
        let temp = setup("");
        let ui = run(
            &temp,
            VersionArgs {
                no_push: true,
                no_changelog: true,
                ..args("core")
            },
        );

        assert!(ui.has_success("Committed and tagged core-v0.2.0"));
        assert_eq!(
            git(temp.path(), &["log", "-1", "--format=%s"]),
            "chore(release): core-v0.2.0 [skip ci]"
        );
        assert_eq!(
            git(temp.path(), &["tag", "--list", "core-v0.2.0"]),
            "core-v0.2.0"
        );
        assert!(!temp.path().join("packages/core/CHANGELOG.md").exists());
    }

    #[test]
    fn first_release_without_changes_tags_head() {
        let temp = setup("");
        git(temp.path(), &["tag", "-d", "core-v0.1.0"]);
        let head = git(temp.path(), &["rev-parse", "HEAD"]);
        let ui = run(
            &temp,
            VersionArgs {
                no_push: true,
                no_changelog: true,
                ..args("core")
            },
        );

        assert!(ui.has_success("Tagged core-v0.1.0"));
        assert_eq!(git(temp.path(), &["rev-parse", "HEAD"]), head);
        assert_eq!(
            git(temp.path(), &["rev-list", "-n", "1", "core-v0.1.0"]),
            head
        );
    }

    #[test]
    fn pushes_branch_and_tag() {
        let temp = setup("");
        let remote = TempDir::new().unwrap();
        git(remote.path(), &["init", "--bare", "--initial-branch=main"]);
        git(
            temp.path(),
            &["remote", "add", "origin", remote.path().to_str().unwrap()],
        );

        let ui = run(
            &temp,
            VersionArgs {
                skip_publish: true,
                ..args("core")
            },
        );

        assert!(ui.has_message("Skipping publish"));
        assert!(ui.has_success("Released core-v0.2.0"));
        assert_eq!(
            git(remote.path(), &["tag", "--list"]),
            "core-v0.2.0"
        );
    }

    #[test]
    fn nothing_to_release() {
        let temp = setup("");
        git(temp.path(), &["tag", "core-v0.2.0"]);
        let ui = run(&temp, args("core"));
        assert!(ui.has_message("No release"));
        assert_eq!(ui.detail("Next"), None);
    }

    #[test]
    fn creates_hosting_release() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/repos/acme/mono/releases")
                .header("Authorization", "Bearer ghp_version_test")
                .body_includes("\"tag_name\":\"core-v0.2.0\"")
                .body_includes("add api");
            then.status(201).json_body(serde_json::json!({
                "id": 1,
                "tag_name": "core-v0.2.0",
                "html_url": "https://github.com/acme/mono/releases/tag/core-v0.2.0",
                "upload_url": ""
            }));
        });

        let extra = format!(
            "\n[tool.semantic_release.remote]\ntoken_var = \"MONOREL_VERSION_TEST_TOKEN\"\napi_url = \"{}\"\n",
            server.base_url()
        );
        let temp = setup(&extra);
        // Re-enable hosting releases for this package.
        let manifest = temp.path().join("packages/core/pyproject.toml");
        let text = fs::read_to_string(&manifest).unwrap();
        fs::write(
            &manifest,
            text.replace("upload_to_release = false", "upload_to_release = true"),
        )
        .unwrap();
        git(temp.path(), &["commit", "-am", "chore: enable releases"]);

        let bare = TempDir::new().unwrap();
        git(bare.path(), &["init", "--bare", "--initial-branch=main"]);
        git(
            temp.path(),
            &["remote", "add", "origin", "https://github.com/acme/mono.git"],
        );
        git(
            temp.path(),
            &[
                "remote",
                "set-url",
                "--push",
                "origin",
                bare.path().to_str().unwrap(),
            ],
        );

        std::env::remove_var("GITHUB_API_URL");
        std::env::set_var("MONOREL_VERSION_TEST_TOKEN", "ghp_version_test");
        let ui = run(&temp, args("core"));
        std::env::remove_var("MONOREL_VERSION_TEST_TOKEN");

        mock.assert();
        assert!(ui.has_success("Created release https://github.com/acme/mono/releases/tag/core-v0.2.0"));
    }

    #[test]
    fn missing_token_fails_release() {
        let temp = setup("\n[tool.semantic_release.remote]\ntoken_var = \"MONOREL_ABSENT_TOKEN\"\n");
        let manifest = temp.path().join("packages/core/pyproject.toml");
        let text = fs::read_to_string(&manifest).unwrap();
        fs::write(
            &manifest,
            text.replace("upload_to_release = false", "upload_to_release = true"),
        )
        .unwrap();
        git(temp.path(), &["commit", "-am", "chore: enable releases"]);
        let bare = TempDir::new().unwrap();
        git(bare.path(), &["init", "--bare", "--initial-branch=main"]);
        git(
            temp.path(),
            &["remote", "add", "origin", bare.path().to_str().unwrap()],
        );

        let mut ui = MockUI::new();
        let err = VersionCommand::new(temp.path(), "", args("core"))
            .execute(&mut ui)
            .unwrap_err();
        assert!(matches!(err, crate::error::MonorelError::TokenMissing { .. }));
    }
}
