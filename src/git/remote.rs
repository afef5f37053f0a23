//! Remote URL parsing.
//!
//! Release tooling authenticates over HTTPS with a token, so an SSH remote
//! (`git@host:owner/repo.git`) has to be rewritten before pushing tags.

use std::fmt;
use std::str::FromStr;

use crate::error::MonorelError;

/// Transport of a remote URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteProtocol {
    Https,
    Ssh,
}

impl fmt::Display for RemoteProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Https => f.write_str("https"),
            Self::Ssh => f.write_str("ssh"),
        }
    }
}

/// A parsed remote pointing at a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    pub protocol: RemoteProtocol,
    pub host: String,
    /// Owner, possibly with nested groups (`group/subgroup`).
    pub owner: String,
    pub repo: String,
}

impl RemoteUrl {
    /// Whether the remote uses SSH.
    pub fn is_ssh(&self) -> bool {
        self.protocol == RemoteProtocol::Ssh
    }

    /// HTTPS form of this remote, without credentials.
    pub fn to_https(&self) -> String {
        format!("https://{}/{}/{}.git", self.host, self.owner, self.repo)
    }

    /// `owner/repo` slug used by hosting APIs.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RemoteUrl {
    type Err = MonorelError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let invalid = || MonorelError::InvalidRemoteUrl {
            url: url.to_string(),
        };
        let trimmed = url.trim();

        let (protocol, host, path) = if let Some(rest) = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
        {
            let (authority, path) = rest.split_once('/').ok_or_else(invalid)?;
            (RemoteProtocol::Https, strip_userinfo(authority), path)
        } else if let Some(rest) = trimmed.strip_prefix("ssh://") {
            let (authority, path) = rest.split_once('/').ok_or_else(invalid)?;
            let host = strip_userinfo(authority);
            let host = host.split_once(':').map(|(h, _)| h).unwrap_or(host);
            (RemoteProtocol::Ssh, host, path)
        } else if let Some((authority, path)) = trimmed.split_once(':') {
            // scp-like syntax: user@host:owner/repo.git
            if authority.contains('/') || path.starts_with("//") {
                return Err(invalid());
            }
            (RemoteProtocol::Ssh, strip_userinfo(authority), path)
        } else {
            return Err(invalid());
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, repo) = path.rsplit_once('/').ok_or_else(invalid)?;

        if host.is_empty() || owner.is_empty() || repo.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            protocol,
            host: host.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

fn strip_userinfo(authority: &str) -> &str {
    authority
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(authority)
}
