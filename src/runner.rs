//! Sequential command execution for a project deployment.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tokio::process::Command;
use tracing::{error, info};

/// Terminal status of a webhook run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Success,
    Failed,
    Ignored,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "Success"),
            RunStatus::Failed => write!(f, "Failed"),
            RunStatus::Ignored => write!(f, "Ignored"),
        }
    }
}

/// Outcome of one command in the deployment sequence.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub tokens: Vec<String>,
    /// Merged stdout and stderr, or the spawn error text.
    pub output: String,
    pub succeeded: bool,
}

impl CommandOutcome {
    fn label(&self) -> String {
        self.tokens.join(" ")
    }
}

/// The ordered outcomes of a command sequence plus the aggregate details
/// reported to the caller and to notification channels.
#[derive(Debug)]
pub struct ExecutionResult {
    pub outcomes: Vec<CommandOutcome>,
    pub status: RunStatus,
    pub details: String,
}

/// Runs each command in order inside `directory`, stopping at the first
/// non-zero exit or spawn error. Later commands are never started.
///
/// No retries and no timeout: a hung command blocks its request, and the
/// caller's HTTP timeout is the only upper bound.
pub async fn run_commands(commands: &[Vec<String>], directory: &Path) -> ExecutionResult {
    let mut outcomes: Vec<CommandOutcome> = Vec::with_capacity(commands.len());

    for tokens in commands {
        let label = tokens.join(" ");
        info!("Executing (cwd = {}): {}", directory.display(), label);

        let Some((program, args)) = tokens.split_first() else {
            error!("Skipping command with no executable");
            outcomes.push(CommandOutcome {
                tokens: tokens.clone(),
                output: "command has no executable".to_string(),
                succeeded: false,
            });
            break;
        };

        match Command::new(program)
            .args(args)
            .current_dir(directory)
            .output()
            .await
        {
            Ok(output) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                let succeeded = output.status.success();
                outcomes.push(CommandOutcome {
                    tokens: tokens.clone(),
                    output: combined,
                    succeeded,
                });
                if !succeeded {
                    error!("Command failed ({}): {}", output.status, label);
                    break;
                }
            }
            Err(e) => {
                error!("Command failed to start: {}: {}", label, e);
                outcomes.push(CommandOutcome {
                    tokens: tokens.clone(),
                    output: format!("failed to start: {}", e),
                    succeeded: false,
                });
                break;
            }
        }
    }

    let failed = outcomes.last().is_some_and(|o| !o.succeeded);
    let details = if failed {
        // Only the failing command's output; later commands never ran.
        let last = outcomes.last().expect("at least one outcome when failed");
        format!("Command {} failed:\n{}", last.label(), last.output)
    } else {
        outcomes
            .iter()
            .map(|o| format!("Command {}: {}", o.label(), o.output))
            .collect::<Vec<_>>()
            .join("\n")
    };

    ExecutionResult {
        outcomes,
        status: if failed {
            RunStatus::Failed
        } else {
            RunStatus::Success
        },
        details,
    }
}
