// Error types and human-readable rendering

use std::io::IsTerminal;
use std::path::PathBuf;

use colored::*;
use thiserror::Error;

/// Initialize color output based on TTY detection and NO_COLOR environment variable
pub(crate) fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    std::io::stderr().is_terminal()
}

/// Ways acquiring the Terraform snapshot can fail
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Failed to execute '{command}' in '{}': {source}", .dir.display())]
    Spawn {
        command: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' in '{}' failed with {status}", .dir.display())]
    CommandFailed {
        command: String,
        dir: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Terraform output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid JSON from terraform output: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Terraform output must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl InventoryError {
    /// A hint for fixing the problem, when one is known
    pub fn suggestion(&self) -> Option<String> {
        match self {
            InventoryError::Spawn { source, .. } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    Some(
                        "Check that terraform is installed and TERRAFORM_DIR points to an existing directory"
                            .to_string(),
                    )
                } else {
                    Some("Check permissions on the terraform binary and directory".to_string())
                }
            }
            InventoryError::CommandFailed { stderr, .. } => {
                if stderr.is_empty() {
                    Some("Run 'terraform init' and 'terraform apply' first".to_string())
                } else {
                    Some(format!("Terraform error: {}", stderr))
                }
            }
            InventoryError::InvalidJson(e) => Some(format!(
                "JSON parse error at line {}, column {}",
                e.line(),
                e.column()
            )),
            InventoryError::InvalidUtf8(_) | InventoryError::NotAnObject(_) => None,
        }
    }

    /// Render for a terminal: `ERROR:` line plus an optional `Hint:`
    pub fn render(&self) -> String {
        if !should_use_colors() {
            colored::control::set_override(false);
        }

        let mut out = format!("{}: {}\n", "INVENTORY ERROR".red().bold(), self);

        if let Some(suggestion) = self.suggestion() {
            out.push('\n');
            out.push_str(&format!("{}: {}\n", "Hint".yellow().bold(), suggestion));
        }

        out
    }
}
