use std::path::{Path, PathBuf};
use std::process::Command;

use tether_core::{CommitMeta, CommitRef, Result, TetherError};

use crate::identity::RepoIdentity;

/// Git operations the sync engine depends on.
pub trait GitCollaborator {
    /// Message, author and timestamp for one commit. `files` is left empty.
    fn commit_meta(&self, commit: &CommitRef) -> Result<CommitMeta>;

    /// Paths touched by one commit.
    fn changed_files(&self, sha: &str) -> Result<Vec<String>>;

    /// `org/name` of the repository on the remote service.
    fn repo_identity(&self) -> Result<RepoIdentity>;
}

/// Run git in `cwd` and return stdout. Non-zero exit is an `Io` error
/// carrying git's stderr.
fn git(cwd: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| TetherError::io("git not available", e))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TetherError::io(
            format!("git {}", args.join(" ")),
            std::io::Error::new(std::io::ErrorKind::Other, stderr.trim().to_string()),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Working-tree root of the repository containing `cwd`.
pub fn repo_root(cwd: &Path) -> Result<PathBuf> {
    let out = git(cwd, &["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(out.trim()))
}

#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    pub fn discover(cwd: &Path) -> Result<Self> {
        Ok(Self {
            root: repo_root(cwd)?,
        })
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn head_sha(&self) -> Result<String> {
        Ok(git(&self.root, &["rev-parse", "HEAD"])?.trim().to_string())
    }

    /// Current branch name, or `HEAD` when detached.
    pub fn current_branch(&self) -> Result<String> {
        Ok(git(&self.root, &["rev-parse", "--abbrev-ref", "HEAD"])?
            .trim()
            .to_string())
    }

    /// HEAD as a commit reference for linking into open sessions.
    pub fn head_commit(&self) -> Result<CommitRef> {
        Ok(CommitRef {
            sha: self.head_sha()?,
            branch: self.current_branch()?,
        })
    }

    pub fn remote_url(&self, remote: &str) -> Result<String> {
        Ok(git(&self.root, &["remote", "get-url", remote])?
            .trim()
            .to_string())
    }

    /// Hooks directory, honouring `core.hooksPath` and worktrees.
    pub fn hooks_dir(&self) -> Result<PathBuf> {
        let out = git(&self.root, &["rev-parse", "--git-path", "hooks"])?;
        let dir = PathBuf::from(out.trim());
        Ok(if dir.is_absolute() {
            dir
        } else {
            self.root.join(dir)
        })
    }
}

impl GitCollaborator for GitRepo {
    fn commit_meta(&self, commit: &CommitRef) -> Result<CommitMeta> {
        let out = git(
            &self.root,
            &[
                "show",
                "-s",
                "--format=%H%x00%an%x00%ae%x00%cI%x00%B",
                &commit.sha,
            ],
        )?;
        parse_commit_meta(&out, &commit.branch)
            .ok_or_else(|| TetherError::Parse(format!("unexpected git show output for {}", commit.sha)))
    }

    fn changed_files(&self, sha: &str) -> Result<Vec<String>> {
        let out = git(
            &self.root,
            &["diff-tree", "--no-commit-id", "--name-only", "-r", "--root", sha],
        )?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn repo_identity(&self) -> Result<RepoIdentity> {
        let url = self.remote_url("origin")?;
        RepoIdentity::from_remote_url(&url).ok_or_else(|| {
            TetherError::ConfigMissing(format!("cannot derive org/repo from remote '{url}'"))
        })
    }
}

/// Parse `%H%x00%an%x00%ae%x00%cI%x00%B`.
fn parse_commit_meta(out: &str, branch: &str) -> Option<CommitMeta> {
    let mut parts = out.splitn(5, '\0');
    let sha = parts.next()?.trim();
    let author_name = parts.next()?;
    let author_email = parts.next()?;
    let timestamp = parts.next()?;
    let message = parts.next()?;
    if sha.is_empty() {
        return None;
    }
    Some(CommitMeta {
        sha: sha.to_string(),
        branch: branch.to_string(),
        message: message.trim_end().to_string(),
        author_name: author_name.to_string(),
        author_email: author_email.to_string(),
        timestamp: timestamp.to_string(),
        files: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn run(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_NAME", "Test")
            .env("GIT_AUTHOR_EMAIL", "test@test.com")
            .env("GIT_COMMITTER_NAME", "Test")
            .env("GIT_COMMITTER_EMAIL", "test@test.com")
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    fn init_repo(dir: &Path) {
        run(dir, &["init", "-q", "-b", "main"]);
        std::fs::write(dir.join("a.txt"), "a").unwrap();
        std::fs::create_dir_all(dir.join("src")).unwrap();
        std::fs::write(dir.join("src/lib.rs"), "// lib").unwrap();
        run(dir, &["add", "."]);
        run(dir, &["commit", "-q", "-m", "first commit\n\nbody line"]);
    }

    #[test]
    fn parse_commit_meta_splits_fields() {
        let out = "abc123\0Ada\0ada@x.io\02026-01-02T03:04:05+00:00\0fix: thing\n\nbody\n\n";
        let meta = parse_commit_meta(out, "main").unwrap();
        assert_eq!(meta.sha, "abc123");
        assert_eq!(meta.author_name, "Ada");
        assert_eq!(meta.author_email, "ada@x.io");
        assert_eq!(meta.timestamp, "2026-01-02T03:04:05+00:00");
        assert_eq!(meta.message, "fix: thing\n\nbody");
        assert_eq!(meta.branch, "main");
        assert!(meta.files.is_empty());
    }

    #[test]
    fn parse_commit_meta_rejects_short_output() {
        assert!(parse_commit_meta("abc\0Ada", "main").is_none());
    }

    #[test]
    fn real_repo_metadata_and_files() {
        if !git_available() {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path());

        let repo = GitRepo::discover(tmp.path()).unwrap();
        let head = repo.head_commit().unwrap();
        assert_eq!(head.branch, "main");
        assert_eq!(head.sha.len(), 40);

        let meta = repo.commit_meta(&head).unwrap();
        assert_eq!(meta.sha, head.sha);
        assert_eq!(meta.author_email, "test@test.com");
        assert!(meta.message.starts_with("first commit"));

        let mut files = repo.changed_files(&head.sha).unwrap();
        files.sort();
        assert_eq!(files, ["a.txt", "src/lib.rs"]);
    }

    #[test]
    fn identity_from_origin() {
        if !git_available() {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path());
        let repo = GitRepo::discover(tmp.path()).unwrap();
        assert!(repo.repo_identity().is_err());

        run(
            tmp.path(),
            &["remote", "add", "origin", "git@github.com:acme/widgets.git"],
        );
        assert_eq!(repo.repo_identity().unwrap().to_string(), "acme/widgets");
    }

    #[test]
    fn unknown_commit_is_error() {
        if !git_available() {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path());
        let repo = GitRepo::discover(tmp.path()).unwrap();
        let missing = CommitRef {
            sha: "0000000000000000000000000000000000000000".into(),
            branch: "main".into(),
        };
        assert!(repo.commit_meta(&missing).is_err());
    }
}
