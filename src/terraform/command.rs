// Runs `terraform output -json` to acquire a snapshot

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::Snapshot;
use crate::output::errors::InventoryError;

/// Working directory used when `TERRAFORM_DIR` is not set
pub const DEFAULT_TERRAFORM_DIR: &str = "./terraform";

/// Provisioning binary used when `TERRAFORM_BIN` is not set
pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";

const OUTPUT_ARGS: [&str; 2] = ["output", "-json"];

/// A `terraform output -json` invocation bound to a working directory
#[derive(Debug, Clone)]
pub struct TerraformCommand {
    program: String,
    working_dir: PathBuf,
}

impl Default for TerraformCommand {
    fn default() -> Self {
        TerraformCommand::new(DEFAULT_TERRAFORM_DIR)
    }
}

impl TerraformCommand {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        TerraformCommand {
            program: DEFAULT_TERRAFORM_BIN.to_string(),
            working_dir: working_dir.into(),
        }
    }

    /// Use another Terraform-compatible binary (e.g. `tofu`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The command line as a user would type it
    pub fn command_line(&self) -> String {
        format!("{} {}", self.program, OUTPUT_ARGS.join(" "))
    }

    /// Run the command once and parse its stdout.
    ///
    /// Blocks until the child exits; there is no retry or timeout.
    pub async fn snapshot(&self) -> Result<Snapshot, InventoryError> {
        debug!(
            command = %self.command_line(),
            dir = %self.working_dir.display(),
            "reading terraform outputs"
        );

        let output = Command::new(&self.program)
            .args(OUTPUT_ARGS)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| InventoryError::Spawn {
                command: self.command_line(),
                dir: self.working_dir.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(InventoryError::CommandFailed {
                command: self.command_line(),
                dir: self.working_dir.clone(),
                status: output
                    .status
                    .code()
                    .map(|code| format!("exit code {}", code))
                    .unwrap_or_else(|| "a signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout)?;
        let snapshot = Snapshot::parse(&stdout)?;

        debug!(
            outputs = ?snapshot.output_names().collect::<Vec<_>>(),
            "terraform outputs loaded"
        );

        Ok(snapshot)
    }
}
