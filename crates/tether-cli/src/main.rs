mod cmd_bridge;
mod cmd_config;
mod cmd_hook;
mod cmd_link;
mod cmd_session;
mod cmd_status;
mod cmd_sync;

use clap::{ArgAction, Parser, Subcommand};
use tether_store::StorePaths;

use cmd_config::ConfigCmd;
use cmd_session::SessionCmd;

#[derive(Parser)]
#[command(
    name = "tether",
    version,
    about = "Link AI coding-agent sessions to the commits they produced"
)]
struct Cli {
    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Track sessions explicitly (for agents without hook support)
    Session {
        #[command(subcommand)]
        cmd: SessionCmd,
    },
    /// Relay queued sessions that have commits to the remote service
    Sync {
        /// Repository identity as org/name (defaults to the origin remote)
        #[arg(long)]
        repo: Option<String>,
    },
    /// Show the session queue for this repository
    Status,
    /// Append HEAD to every open session (called by the post-commit hook)
    Link,
    /// Hook entrypoint (called by agent hooks)
    Hook {
        #[command(subcommand)]
        cmd: HookCmd,
    },
    /// Manage user configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
    /// Install or remove agent and git hooks
    Bridge {
        #[command(subcommand)]
        cmd: BridgeCmd,
    },
}

#[derive(Subcommand)]
enum HookCmd {
    /// Claude Code hook entrypoint (reads stdin JSON)
    Claude,
}

#[derive(Subcommand)]
enum BridgeCmd {
    /// Claude Code session hooks in .claude/settings.local.json
    Claude {
        #[command(subcommand)]
        cmd: InstallCmd,
    },
    /// post-commit hook that runs `tether link`
    Git {
        #[command(subcommand)]
        cmd: InstallCmd,
    },
}

#[derive(Subcommand)]
enum InstallCmd {
    Install,
    Uninstall,
}

/// `TETHER_LOG` wins; otherwise `-v` flags pick the level, default `warn`.
fn log_filter(verbose: u8) -> tracing_subscriber::EnvFilter {
    let level = match std::env::var("TETHER_LOG") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => match verbose {
            0 => "warn".to_string(),
            1 => "info".to_string(),
            _ => "debug".to_string(),
        },
    };
    tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
}

fn init_tracing(verbose: u8) {
    // stdout carries machine-readable output only.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir()?;
    let store = StorePaths::discover();

    match cli.cmd {
        Command::Session { cmd } => cmd_session::run(cmd, &store, &cwd),
        Command::Sync { repo } => cmd_sync::execute(&store, &cwd, repo),
        Command::Status => cmd_status::execute(&store, &cwd),
        Command::Link => cmd_link::execute(&store, &cwd),
        Command::Hook { cmd } => match cmd {
            HookCmd::Claude => cmd_hook::hook_claude(&store),
        },
        Command::Config { cmd } => cmd_config::run(cmd, &store),
        Command::Bridge { cmd } => match cmd {
            BridgeCmd::Claude { cmd } => match cmd {
                InstallCmd::Install => cmd_bridge::install_claude(&cwd),
                InstallCmd::Uninstall => cmd_bridge::uninstall_claude(&cwd),
            },
            BridgeCmd::Git { cmd } => match cmd {
                InstallCmd::Install => cmd_bridge::install_git(&cwd),
                InstallCmd::Uninstall => cmd_bridge::uninstall_git(&cwd),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::try_parse_from(["tether", "-vv", "sync", "--repo", "acme/widgets"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.cmd, Command::Sync { repo: Some(ref r) } if r == "acme/widgets"));

        let cli = Cli::try_parse_from(["tether", "bridge", "git", "install"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Command::Bridge {
                cmd: BridgeCmd::Git {
                    cmd: InstallCmd::Install
                }
            }
        ));
    }
}
