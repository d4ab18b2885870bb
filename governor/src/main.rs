//! Governance runtime CLI.
//!
//! Drives the governance machine and the state store from the shell so that
//! orchestration scripts can checkpoint documents, compare snapshots across
//! runs, and dry-run a lifecycle path.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::Value;

use governor::core::canonical::{parse_hash, prefixed_hash};
use governor::core::state::RuntimeState;
use governor::core::transitions::successors;
use governor::error::{GovernanceError, StoreError};
use governor::exit_codes;
use governor::io::config::{DEFAULT_CONFIG_PATH, GovernorConfig, write_config};
use governor::session::GovernanceContext;

#[derive(Parser)]
#[command(
    name = "governor",
    version,
    about = "Fail-closed governance state machine and deterministic state store"
)]
struct Cli {
    /// Path to the governor config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file and create the state directory.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the transition table.
    States,
    /// Run a fresh session through the given states and print its history.
    Replay {
        /// Target states in order (e.g. AMENDMENT_PREP AMENDMENT_EXEC).
        #[arg(required = true)]
        states: Vec<RuntimeState>,
    },
    /// Store a JSON object under KEY (reads stdin when FILE is omitted).
    Write { key: String, file: Option<PathBuf> },
    /// Print the document stored under KEY.
    Read { key: String },
    /// Print the SHA-256 snapshot of the document stored under KEY.
    Snapshot {
        key: String,
        /// Print in `sha256:<hex>` form.
        #[arg(long)]
        prefixed: bool,
    },
    /// Compare the snapshot of KEY against an expected hash (bare or `sha256:` form).
    Verify { key: String, expected: String },
    /// List stored keys.
    Keys,
}

fn main() {
    governor::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_code_for(&err));
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::States => cmd_states(),
        Command::Replay { states } => cmd_replay(&cli.config, &states),
        Command::Write { key, file } => cmd_write(&cli.config, &key, file.as_deref()),
        Command::Read { key } => cmd_read(&cli.config, &key),
        Command::Snapshot { key, prefixed } => cmd_snapshot(&cli.config, &key, prefixed),
        Command::Verify { key, expected } => cmd_verify(&cli.config, &key, &expected),
        Command::Keys => cmd_keys(&cli.config),
    }
}

/// Map library errors anywhere in the chain to stable exit codes.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if matches!(cause.downcast_ref::<StoreError>(), Some(e) if e.is_not_found()) {
            return exit_codes::NOT_FOUND;
        }
        if cause.downcast_ref::<GovernanceError>().is_some() {
            return exit_codes::VIOLATION;
        }
    }
    exit_codes::INVALID
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if force || !config_path.exists() {
        write_config(config_path, &GovernorConfig::default())
            .with_context(|| format!("write {}", config_path.display()))?;
    }
    let ctx = GovernanceContext::from_config_path(config_path)?;
    println!("{}", ctx.store().root().display());
    Ok(exit_codes::OK)
}

fn cmd_states() -> Result<i32> {
    for state in RuntimeState::ALL {
        let next: Vec<&str> = successors(state).iter().map(|s| s.as_str()).collect();
        if next.is_empty() {
            println!("{state} (terminal)");
        } else {
            println!("{state} -> {}", next.join(", "));
        }
    }
    Ok(exit_codes::OK)
}

fn cmd_replay(config_path: &Path, states: &[RuntimeState]) -> Result<i32> {
    let ctx = GovernanceContext::from_config_path(config_path)?;
    let mut fsm = ctx.start_session();
    let mut violation = None;
    for &target in states {
        if let Err(err) = fsm.transition_to(target) {
            violation = Some(err);
            break;
        }
    }
    let history = serde_json::to_string(fsm.history()).context("serialize history")?;
    println!("{history}");
    match violation {
        Some(err) => {
            eprintln!("{err}");
            Ok(exit_codes::VIOLATION)
        }
        None => Ok(exit_codes::OK),
    }
}

fn cmd_write(config_path: &Path, key: &str, file: Option<&Path>) -> Result<i32> {
    let raw = match file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            buf
        }
    };
    let value: Value = serde_json::from_str(&raw).context("parse input json")?;
    let Value::Object(document) = value else {
        return Err(anyhow!("input must be a JSON object"));
    };

    let ctx = GovernanceContext::from_config_path(config_path)?;
    ctx.store().write_state(key, &document)?;
    println!("{}", ctx.store().create_snapshot(key)?);
    Ok(exit_codes::OK)
}

fn cmd_read(config_path: &Path, key: &str) -> Result<i32> {
    let ctx = GovernanceContext::from_config_path(config_path)?;
    let document = ctx.store().read_state(key)?;
    let pretty =
        serde_json::to_string_pretty(&Value::Object(document)).context("serialize document")?;
    println!("{pretty}");
    Ok(exit_codes::OK)
}

fn cmd_snapshot(config_path: &Path, key: &str, prefixed: bool) -> Result<i32> {
    let ctx = GovernanceContext::from_config_path(config_path)?;
    let hash = ctx.store().create_snapshot(key)?;
    if prefixed {
        println!("{}", prefixed_hash(&hash));
    } else {
        println!("{hash}");
    }
    Ok(exit_codes::OK)
}

fn cmd_verify(config_path: &Path, key: &str, expected: &str) -> Result<i32> {
    let expected = parse_hash(expected).with_context(|| {
        format!("expected hash must be 64 lowercase hex characters (got '{expected}')")
    })?;
    let ctx = GovernanceContext::from_config_path(config_path)?;
    let actual = ctx.store().create_snapshot(key)?;
    if actual == expected {
        println!("ok {actual}");
        Ok(exit_codes::OK)
    } else {
        println!("mismatch expected={expected} actual={actual}");
        Ok(exit_codes::MISMATCH)
    }
}

fn cmd_keys(config_path: &Path) -> Result<i32> {
    let ctx = GovernanceContext::from_config_path(config_path)?;
    for key in ctx.store().keys()? {
        println!("{key}");
    }
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_replay_states() {
        let cli = Cli::parse_from(["governor", "replay", "AMENDMENT_PREP", "AMENDMENT_EXEC"]);
        match cli.command {
            Command::Replay { states } => assert_eq!(
                states,
                vec![RuntimeState::AmendmentPrep, RuntimeState::AmendmentExec]
            ),
            _ => panic!("expected replay"),
        }
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn parse_rejects_unknown_state() {
        assert!(Cli::try_parse_from(["governor", "replay", "REPLAY"]).is_err());
    }

    #[test]
    fn parse_global_config_after_subcommand() {
        let cli = Cli::parse_from(["governor", "keys", "--config", "/tmp/g.toml"]);
        assert!(matches!(cli.command, Command::Keys));
        assert_eq!(cli.config, PathBuf::from("/tmp/g.toml"));
    }

    #[test]
    fn parse_snapshot_prefixed_flag() {
        let cli = Cli::parse_from(["governor", "snapshot", "k", "--prefixed"]);
        assert!(matches!(cli.command, Command::Snapshot { prefixed: true, .. }));
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let missing = anyhow::Error::new(StoreError::NotFound {
            key: "k".to_string(),
            path: PathBuf::from("k.json"),
        })
        .context("snapshot k");
        assert_eq!(exit_code_for(&missing), exit_codes::NOT_FOUND);

        let violation = anyhow::Error::new(GovernanceError::IllegalTransition {
            from: RuntimeState::Init,
            to: RuntimeState::Complete,
        });
        assert_eq!(exit_code_for(&violation), exit_codes::VIOLATION);

        assert_eq!(exit_code_for(&anyhow!("bad input")), exit_codes::INVALID);
    }
}
