// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! appstate Control CLI
//!
//! Minimal host for the appstate controller: persists resource state as a
//! JSON file and runs one lifecycle operation per invocation.
//!
//! Usage:
//!   appstate-ctl <command> [options]
//!
//! Commands:
//!   create --plan <file> --state <file> [--trigger-file <key>=<path>]...
//!   read --state <file>
//!   update --plan <file> --state <file> [--trigger-file <key>=<path>]...
//!   delete --state <file>
//!   import <name> --state <file>

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use appstate_client::MidcltClient;
use appstate_controller::host::{
    fingerprint_file, load_plan, load_state, remove_state, save_state,
};
use appstate_controller::{AppConfig, AppController, Config, Diagnostic, Diagnostics, ReadOutcome};
use tracing::warn;

fn print_usage() {
    eprintln!(
        r#"Usage: appstate-ctl <command> [options]

Manage the desired run-state of a remote application.

COMMANDS:
    create                          Create the app described by a plan
    read                            Refresh state from the remote host
    update                          Apply a plan to an existing app
    delete                          Delete the app
    import <name>                   Adopt an existing app by name

OPTIONS:
    --plan <file>                   Plan JSON (create, update)
    --state <file>                  State JSON (all commands)
    --trigger-file <key>=<path>     Add a restart trigger whose value is the
                                    SHA-256 of the file (create, update)

ENVIRONMENT:
    APPSTATE_MIDCLT_PATH            Remote control CLI (default: midclt)
    APPSTATE_REMOTE_URL             Remote endpoint (default: local socket)
    APPSTATE_REMOTE_USER            Remote username
    APPSTATE_REMOTE_PASSWORD        Remote password
    APPSTATE_CALL_TIMEOUT_MS        Query timeout (default: 30000)
    APPSTATE_JOB_TIMEOUT_MS         Create/update/delete timeout (default: 600000)
    RUST_LOG                        Log filter (default: info)

EXAMPLES:
    # Create an app that should stay stopped
    echo '{{"name": "web", "desired_state": "stopped"}}' > plan.json
    appstate-ctl create --plan plan.json --state web.state.json

    # Restart when the compose file changes
    appstate-ctl update --plan plan.json --state web.state.json \
        --trigger-file compose=./compose.yaml
"#
    );
}

#[derive(Debug)]
enum Command {
    Create {
        plan: PathBuf,
        state: PathBuf,
        trigger_files: Vec<(String, PathBuf)>,
    },
    Read {
        state: PathBuf,
    },
    Update {
        plan: PathBuf,
        state: PathBuf,
        trigger_files: Vec<(String, PathBuf)>,
    },
    Delete {
        state: PathBuf,
    },
    Import {
        name: String,
        state: PathBuf,
    },
}

#[derive(Debug, Default)]
struct Options {
    plan: Option<PathBuf>,
    state: Option<PathBuf>,
    trigger_files: Vec<(String, PathBuf)>,
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from_vec(&args)
}

fn parse_options(args: &[String], start: usize, allow_plan: bool) -> Result<Options, String> {
    let mut options = Options::default();

    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--plan" if allow_plan => {
                i += 1;
                options.plan = Some(PathBuf::from(
                    args.get(i).ok_or("--plan requires a path")?,
                ));
            }
            "--state" => {
                i += 1;
                options.state = Some(PathBuf::from(
                    args.get(i).ok_or("--state requires a path")?,
                ));
            }
            "--trigger-file" if allow_plan => {
                i += 1;
                let value = args.get(i).ok_or("--trigger-file requires <key>=<path>")?;
                let (key, path) = value
                    .split_once('=')
                    .filter(|(key, path)| !key.is_empty() && !path.is_empty())
                    .ok_or_else(|| format!("Invalid trigger file: {}", value))?;
                options
                    .trigger_files
                    .push((key.to_string(), PathBuf::from(path)));
            }
            arg => return Err(format!("Unknown argument: {}", arg)),
        }
        i += 1;
    }

    Ok(options)
}

fn parse_args_from_vec(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    match args[1].as_str() {
        "help" | "--help" | "-h" => {
            print_usage();
            std::process::exit(0);
        }
        "create" | "update" => {
            let options = parse_options(args, 2, true)?;
            let plan = options.plan.ok_or("--plan is required")?;
            let state = options.state.ok_or("--state is required")?;
            let trigger_files = options.trigger_files;
            if args[1] == "create" {
                Ok(Command::Create {
                    plan,
                    state,
                    trigger_files,
                })
            } else {
                Ok(Command::Update {
                    plan,
                    state,
                    trigger_files,
                })
            }
        }
        "read" => {
            let options = parse_options(args, 2, false)?;
            Ok(Command::Read {
                state: options.state.ok_or("--state is required")?,
            })
        }
        "delete" => {
            let options = parse_options(args, 2, false)?;
            Ok(Command::Delete {
                state: options.state.ok_or("--state is required")?,
            })
        }
        "import" => {
            let name = args
                .get(2)
                .filter(|name| !name.starts_with("--"))
                .ok_or("App name required")?
                .clone();
            let options = parse_options(args, 3, false)?;
            Ok(Command::Import {
                name,
                state: options.state.ok_or("--state is required")?,
            })
        }
        cmd => Err(format!("Unknown command: {}", cmd)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appstate_controller=info,appstate_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    let cmd = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let client = match MidcltClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let controller = AppController::new(Arc::new(client), config);
    let mut diags = Diagnostics::new();

    let result = execute_command(&controller, cmd, &mut diags).await;

    for diag in diags.iter() {
        eprintln!("{}", diag);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", Diagnostic::from(&e));
            ExitCode::FAILURE
        }
    }
}

async fn plan_with_triggers(
    path: &Path,
    trigger_files: &[(String, PathBuf)],
) -> appstate_controller::Result<AppConfig> {
    let mut plan = load_plan(path).await?;
    for (key, file) in trigger_files {
        let digest = fingerprint_file(file).await?;
        plan.restart_triggers
            .get_or_insert_with(Default::default)
            .insert(key.clone(), digest);
    }
    Ok(plan)
}

async fn execute_command(
    controller: &AppController,
    cmd: Command,
    diags: &mut Diagnostics,
) -> appstate_controller::Result<()> {
    match cmd {
        Command::Create {
            plan,
            state,
            trigger_files,
        } => {
            let plan = plan_with_triggers(&plan, &trigger_files).await?;
            let created = controller.create(&plan, diags).await?;
            save_state(&state, &created).await?;
            println!(
                "Created: {} ({})",
                created.name,
                created.actual_state.as_deref().unwrap_or("unknown")
            );
        }

        Command::Read { state } => {
            let current = load_state(&state).await?;
            match controller.read(&current, diags).await? {
                ReadOutcome::Present(next) => {
                    save_state(&state, &next).await?;
                    println!(
                        "{}: {}",
                        next.name,
                        next.actual_state.as_deref().unwrap_or("unknown")
                    );
                }
                ReadOutcome::Removed => {
                    remove_state(&state).await?;
                    println!("Removed: {} no longer exists", current.name);
                }
            }
        }

        Command::Update {
            plan,
            state,
            trigger_files,
        } => {
            let plan = plan_with_triggers(&plan, &trigger_files).await?;
            let current = load_state(&state).await?;
            let updated = controller.update(&current, &plan, diags).await?;
            save_state(&state, &updated).await?;
            println!(
                "Updated: {} ({})",
                updated.name,
                updated.actual_state.as_deref().unwrap_or("unknown")
            );
        }

        Command::Delete { state } => {
            let current = load_state(&state).await?;
            controller.delete(&current).await?;
            remove_state(&state).await?;
            println!("Deleted: {}", current.name);
        }

        Command::Import { name, state } => {
            let seed = controller.import(&name)?;
            match controller.read(&seed, diags).await? {
                ReadOutcome::Present(imported) => {
                    save_state(&state, &imported).await?;
                    println!(
                        "Imported: {} ({})",
                        imported.name,
                        imported.actual_state.as_deref().unwrap_or("unknown")
                    );
                }
                ReadOutcome::Removed => {
                    warn!(app = %name, "Nothing to import");
                    return Err(appstate_controller::Error::NotFound { name });
                }
            }
        }
    }

    Ok(())
}
