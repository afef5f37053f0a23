//! Release computation and publishing.
//!
//! - [`plan_release`] finds the package's last tag, parses the commits since
//!   then and decides the next version
//! - [`changelog`] renders release notes and updates the changelog file
//! - [`GitHubClient`] talks to the hosting API
//! - [`publish`] builds and uploads distributions

pub mod changelog;
pub mod github;
pub mod plan;
pub mod publish;
pub mod tag;
pub mod version;

pub use changelog::{prepend_section, release_notes, render_section, Changelog};
pub use github::{api_base_url, GitHubClient, NewRelease, Release, RepoAccess, DEFAULT_API_URL};
pub use plan::{package_parser, plan_release, PlanOptions, ReleasePlan};
pub use publish::{build_distributions, distributions, upload_to_index};
pub use tag::TagFormat;
pub use version::Version;
