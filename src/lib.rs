// terraform-inventory - Ansible dynamic inventory from Terraform outputs
//
// Invoked by Ansible as `--list` or `--host <name>`; runs
// `terraform output -json` and reshapes the result into inventory JSON.

pub mod inventory;
pub mod output;
pub mod script;
pub mod terraform;

pub use inventory::{GroupKind, HostGroup, HostVars, Inventory};
pub use output::InventoryError;
pub use script::InventoryScript;
pub use terraform::{Snapshot, TerraformCommand};

/// Version of the terraform-inventory tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
