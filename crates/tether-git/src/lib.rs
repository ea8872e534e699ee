mod hooks;
mod identity;
mod repo;

pub use hooks::{install_post_commit_hook, uninstall_post_commit_hook};
pub use identity::RepoIdentity;
pub use repo::{repo_root, GitCollaborator, GitRepo};
