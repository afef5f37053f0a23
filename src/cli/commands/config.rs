//! Config command implementation.
//!
//! The `monorel config` command shows a package's resolved release
//! configuration, with every default filled in.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::ConfigArgs;
use crate::config::ReleaseConfig;
use crate::error::{MonorelError, Result};
use crate::ui::UserInterface;

use super::context::PackageContext;
use super::dispatcher::{Command, CommandResult};

/// `[tool.semantic_release]` nesting, so TOML output can be pasted back.
#[derive(Serialize)]
struct ToolTable<'a> {
    tool: SemanticRelease<'a>,
}

#[derive(Serialize)]
struct SemanticRelease<'a> {
    semantic_release: &'a ReleaseConfig,
}

/// The config command implementation.
pub struct ConfigCommand {
    project_root: PathBuf,
    prefix: String,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(project_root: &Path, prefix: &str, args: ConfigArgs) -> Self {
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
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.schema {
            let schema = schemars::schema_for!(ReleaseConfig);
            let json =
                serde_json::to_string_pretty(&schema).map_err(|e| MonorelError::Other(e.into()))?;
            ui.output(&json);
            return Ok(CommandResult::success());
        }

        let ctx = PackageContext::load(
            &self.project_root,
            &self.prefix,
            self.args.package.as_deref(),
        )?;
        let mut config = ctx.config.clone();
        config.tag_format = Some(ctx.tag_format());

        ui.message(&format!(
            "# {}",
            ctx.display_path(ctx.package.manifest.path())
        ));

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&config).map_err(|e| MonorelError::Other(e.into()))?;
            ui.output(&json);
        } else {
            let table = ToolTable {
                tool: SemanticRelease {
                    semantic_release: &config,
                },
            };
            let text = toml::to_string_pretty(&table).map_err(|e| MonorelError::Other(e.into()))?;
            ui.output(text.trim_end());
        }

        Ok(CommandResult::success())
    }
}
