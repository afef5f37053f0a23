//! Parse command implementation.
//!
//! The `monorel parse` command shows how each commit since the last release
//! (or in an explicit revision range) is classified for a package.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::ParseArgs;
use crate::commit::{LevelBump, ParseResult};
use crate::error::{MonorelError, Result};
use crate::release::{package_parser, plan_release, PlanOptions};
use crate::ui::UserInterface;

use super::context::PackageContext;
use super::dispatcher::{Command, CommandResult};
use super::display::{overall_bump, show_result};

/// Machine-readable parse output.
#[derive(Debug, Serialize)]
struct ParseReport {
    package: String,
    range: String,
    bump: LevelBump,
    results: Vec<ParseResult>,
}

/// The parse command implementation.
pub struct ParseCommand {
    project_root: PathBuf,
    prefix: String,
    args: ParseArgs,
}

impl ParseCommand {
    /// Create a new parse command.
    pub fn new(project_root: &Path, prefix: &str, args: ParseArgs) -> Self {
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
    pub fn args(&self) -> &ParseArgs {
        &self.args
    }
}

impl Command for ParseCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = PackageContext::load(
            &self.project_root,
            &self.prefix,
            self.args.package.as_deref(),
        )?;
        let repo = ctx.repo()?;

        let (range, results) = match &self.args.range {
            Some(range) => {
                let parser = package_parser(&repo, &ctx.package, &ctx.config)?;
                let commits = repo.commits(range)?;
                let results: Vec<ParseResult> = commits.iter().map(|c| parser.parse(c)).collect();
                (range.clone(), results)
            }
            None => {
                let plan = plan_release(&repo, &ctx.package, &ctx.config, PlanOptions::default())?;
                let range = match &plan.previous_tag {
                    Some(tag) => format!("{}..HEAD", tag),
                    None => "HEAD".to_string(),
                };
                (range, plan.results)
            }
        };

        let report = ParseReport {
            package: ctx.package.name.clone(),
            bump: overall_bump(&results),
            range,
            results,
        };

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&report).map_err(|e| MonorelError::Other(e.into()))?;
            ui.output(&json);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("{} ({})", ctx.package.display_name(), report.range));
        if report.results.is_empty() {
            ui.message("No commits in range.");
        }
        for result in &report.results {
            show_result(ui, result);
        }

        let counted = report.results.iter().filter(|r| r.parsed().is_some()).count();
        ui.message("");
        ui.show_detail("Commits", &report.results.len().to_string());
        ui.show_detail("Counted", &counted.to_string());
        ui.show_detail("Bump", report.bump.as_str());

        Ok(CommandResult::success())
    }
}
