use std::fmt;
use std::str::FromStr;
use tether_core::TetherError;

/// Owning repository on the remote service, rendered as `org/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    pub org: String,
    pub name: String,
}

impl RepoIdentity {
    /// Parse a git remote URL.
    ///
    /// Handles `https://host/org/repo(.git)`, `ssh://git@host[:port]/org/repo.git`
    /// and scp-style `git@host:org/repo.git`. Nested groups keep everything but
    /// the last segment as the org (`group/sub/repo` → `group/sub`, `repo`).
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let url = url.trim().trim_end_matches('/');
        let url = url.strip_suffix(".git").unwrap_or(url);

        let path = if let Some((_, rest)) = url.split_once("://") {
            let (_, path) = rest.split_once('/')?;
            path
        } else if let Some((host, path)) = url.split_once(':') {
            if host.contains('/') {
                return None;
            }
            path
        } else {
            return None;
        };

        let (org, name) = path.trim_start_matches('/').rsplit_once('/')?;
        if org.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            org: org.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.name)
    }
}

/// Parses an explicit `org/name` override.
impl FromStr for RepoIdentity {
    type Err = TetherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.rsplit_once('/') {
            Some((org, name)) if !org.is_empty() && !name.is_empty() && !name.contains(' ') => {
                Ok(Self {
                    org: org.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(TetherError::ConfigMissing(format!(
                "repository override '{s}' is not in org/name form"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(url: &str) -> Option<String> {
        RepoIdentity::from_remote_url(url).map(|r| r.to_string())
    }

    #[test]
    fn https_remotes() {
        assert_eq!(parsed("https://github.com/acme/widgets.git").as_deref(), Some("acme/widgets"));
        assert_eq!(parsed("https://github.com/acme/widgets").as_deref(), Some("acme/widgets"));
        assert_eq!(parsed("https://github.com/acme/widgets/").as_deref(), Some("acme/widgets"));
    }

    #[test]
    fn ssh_remotes() {
        assert_eq!(parsed("git@github.com:acme/widgets.git").as_deref(), Some("acme/widgets"));
        assert_eq!(
            parsed("ssh://git@gitlab.example.com:2222/acme/widgets.git").as_deref(),
            Some("acme/widgets")
        );
    }

    #[test]
    fn nested_groups_keep_prefix_as_org() {
        assert_eq!(
            parsed("https://gitlab.com/acme/platform/widgets.git").as_deref(),
            Some("acme/platform/widgets")
        );
        let id = RepoIdentity::from_remote_url("https://gitlab.com/acme/platform/widgets").unwrap();
        assert_eq!(id.org, "acme/platform");
        assert_eq!(id.name, "widgets");
    }

    #[test]
    fn unusable_remotes() {
        assert_eq!(parsed(""), None);
        assert_eq!(parsed("/srv/git/widgets"), None);
        assert_eq!(parsed("https://github.com/widgets"), None);
    }

    #[test]
    fn override_parsing() {
        let id: RepoIdentity = "acme/widgets".parse().unwrap();
        assert_eq!(id.org, "acme");
        assert_eq!(id.name, "widgets");
        assert!("widgets".parse::<RepoIdentity>().is_err());
        assert!("acme/".parse::<RepoIdentity>().is_err());
    }
}
