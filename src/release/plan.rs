//! Next-version planning.

use serde::Serialize;

use crate::commit::{LevelBump, MonorepoParser, ParseResult, ParsedCommit};
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::git::GitRepo;
use crate::workspace::Package;

use super::tag::TagFormat;
use super::version::Version;

/// Knobs for [`plan_release`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Produce a release candidate (`-rc.N`) instead of a final version.
    pub prerelease: bool,
}

/// Everything needed to cut one package release.
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
    pub package: String,
    pub tag_format: String,
    /// Latest final release tag reachable from HEAD.
    pub previous_tag: Option<String>,
    pub previous_version: Option<Version>,
    /// Version currently in `pyproject.toml`.
    pub current_version: Version,
    pub bump: LevelBump,
    pub next_version: Option<Version>,
    pub next_tag: Option<String>,
    /// Every commit since the previous tag, newest first.
    pub results: Vec<ParseResult>,
}

impl ReleasePlan {
    /// Whether a release is due.
    pub fn has_release(&self) -> bool {
        self.next_version.is_some()
    }

    /// Commits that contributed to the release.
    pub fn parsed_commits(&self) -> Vec<&ParsedCommit> {
        self.results.iter().filter_map(ParseResult::parsed).collect()
    }
}

/// Build the commit parser for a package.
pub fn package_parser(
    repo: &GitRepo,
    package: &Package,
    config: &ReleaseConfig,
) -> Result<MonorepoParser> {
    MonorepoParser::new(
        config.commit_parser_options.clone(),
        &package.dir,
        repo.root(),
    )
}

/// Compute the next release of `package`.
///
/// Commits are collected since the latest final release tag. Without any
/// tag, the version in the manifest is released as-is once a commit asks
/// for a bump.
pub fn plan_release(
    repo: &GitRepo,
    package: &Package,
    config: &ReleaseConfig,
    options: PlanOptions,
) -> Result<ReleasePlan> {
    let template = config.tag_format_for(package.display_name(), package.is_root());
    let format = TagFormat::new(&template)?;
    let current_version: Version = package.manifest.version()?.parse()?;

    let mut tagged: Vec<(Version, String)> = repo
        .merged_tags(&format.glob())?
        .into_iter()
        .filter_map(|tag| format.parse(&tag).map(|v| (v, tag)))
        .collect();
    tagged.sort();

    let latest_final = tagged.iter().rev().find(|(v, _)| !v.is_prerelease()).cloned();
    let latest_any = tagged.last().cloned();
    tracing::debug!(
        "latest release tag for {}: {}",
        package.name,
        latest_final.as_ref().map_or("none", |(_, t)| t.as_str())
    );

    let parser = package_parser(repo, package, config)?;
    let commits = repo.commits_since(latest_final.as_ref().map(|(_, t)| t.as_str()))?;
    let results: Vec<ParseResult> = commits.iter().map(|c| parser.parse(c)).collect();

    let bump = results
        .iter()
        .filter_map(ParseResult::parsed)
        .map(|c| c.message.bump)
        .max()
        .unwrap_or_default();

    let mut next_version = match &latest_final {
        Some((previous, _)) => previous.bump(bump, config.major_on_zero),
        None if bump > LevelBump::NoRelease => Some(current_version),
        None => None,
    };

    if options.prerelease {
        // Nothing new since the last candidate means nothing to release.
        if let Some((_, tag)) = latest_any.as_ref().filter(|(v, _)| v.is_prerelease()) {
            let since_candidate = repo.commits_since(Some(tag))?;
            let has_new = results
                .iter()
                .filter_map(ParseResult::parsed)
                .any(|c| since_candidate.iter().any(|n| n.sha == c.sha));
            if !has_new {
                next_version = None;
            }
        }
        next_version = next_version
            .map(|v| v.finalized().as_release_candidate(latest_any.as_ref().map(|(v, _)| v)));
    }

    Ok(ReleasePlan {
        package: package.name.clone(),
        tag_format: template,
        next_tag: next_version.as_ref().map(|v| format.render(v)),
        previous_tag: latest_final.as_ref().map(|(_, t)| t.clone()),
        previous_version: latest_final.map(|(v, _)| v),
        current_version,
        bump,
        next_version,
        results,
    })
}
