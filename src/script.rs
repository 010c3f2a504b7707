// `--list` / `--host` dispatch
//
// Each query runs terraform and rebuilds the inventory from scratch.
// Acquisition failures degrade to an empty snapshot unless strict mode
// asks for them to be surfaced.

use tracing::warn;

use crate::inventory::{HostVars, Inventory};
use crate::output::errors::InventoryError;
use crate::terraform::{Snapshot, TerraformCommand};

/// The dynamic inventory script behind the CLI
#[derive(Debug, Clone, Default)]
pub struct InventoryScript {
    command: TerraformCommand,
    strict: bool,
}

impl InventoryScript {
    pub fn new(command: TerraformCommand) -> Self {
        InventoryScript {
            command,
            strict: false,
        }
    }

    /// Return acquisition errors instead of serving an empty inventory
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Fetch a fresh snapshot, applying the degradation policy
    pub async fn snapshot(&self) -> Result<Snapshot, InventoryError> {
        match self.command.snapshot().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if self.strict => Err(e),
            Err(e) => {
                match e.suggestion() {
                    Some(hint) => warn!("Error getting Terraform outputs: {} ({})", e, hint),
                    None => warn!("Error getting Terraform outputs: {}", e),
                }
                Ok(Snapshot::default())
            }
        }
    }

    /// The complete inventory (`--list`)
    pub async fn list(&self) -> Result<Inventory, InventoryError> {
        let snapshot = self.snapshot().await?;
        Ok(Inventory::from_snapshot(&snapshot))
    }

    /// Variables of one host (`--host`); unknown hosts give `{}`
    pub async fn host(&self, name: &str) -> Result<HostVars, InventoryError> {
        Ok(self.list().await?.host(name))
    }
}
