mod admin;
mod dispatch;
mod lifecycle;
mod parse;
mod version;

pub use admin::{install, is_installed, uninstall};
pub use dispatch::{hook_entrypoint_from_stdin, HookResult, ProbeRequest};
pub use lifecycle::{EndOutcome, LifecycleAdapter, StartEvent, StartOutcome, StartReason};
pub use version::{detect_version, parse_version_output, probe_program, record_agent_version};
