//! Building and uploading distributions.

use std::path::{Path, PathBuf};

use crate::config::PublishConfig;
use crate::error::Result;
use crate::shell::{self, CommandOptions};

use super::version::Version;

/// Run the build command in `package_dir` and return the distributions it
/// produced for `version`.
pub fn build_distributions(
    package_dir: &Path,
    config: &PublishConfig,
    version: &Version,
) -> Result<Vec<PathBuf>> {
    tracing::info!("Building distributions: {}", config.build_command);
    run(&config.build_command, package_dir)?;
    distributions(&package_dir.join(&config.dist_dir), version)
}

/// Upload built files with the upload command.
pub fn upload_to_index(package_dir: &Path, config: &PublishConfig, files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        tracing::warn!("No distributions to upload");
        return Ok(());
    }

    let mut command = config.upload_command.clone();
    for file in files {
        let shown = file.strip_prefix(package_dir).unwrap_or(file);
        command.push_str(&format!(" \"{}\"", shown.display()));
    }
    tracing::info!("Uploading {} file(s) to the package index", files.len());
    run(&command, package_dir)
}

/// Files in `dist_dir` whose name carries `version`, sorted.
pub fn distributions(dist_dir: &Path, version: &Version) -> Result<Vec<PathBuf>> {
    if !dist_dir.is_dir() {
        return Ok(Vec::new());
    }

    let marker = format!("-{}", version.pep440());
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dist_dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| {
                name.contains(&format!("{}-", marker)) || name.contains(&format!("{}.tar", marker))
            });
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn run(command: &str, cwd: &Path) -> Result<()> {
    let options = CommandOptions {
        cwd: Some(cwd.to_path_buf()),
        ..Default::default()
    };
    shell::execute(command, &options)?.check(command)?;
    Ok(())
}
