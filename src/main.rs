// terraform-inventory CLI - Ansible dynamic inventory script

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{CommandFactory, Parser};
use tracing::error;

use terraform_inventory::output::{init_tracing, print_json};
use terraform_inventory::terraform::{DEFAULT_TERRAFORM_BIN, DEFAULT_TERRAFORM_DIR};
use terraform_inventory::{InventoryError, InventoryScript, TerraformCommand};

#[derive(Parser)]
#[command(
    name = "terraform-inventory",
    about = "Dynamic inventory for Terraform-managed infrastructure",
    version,
    disable_colored_help = true,
    term_width = 0,
)]
struct Cli {
    /// List all hosts
    #[arg(long)]
    list: bool,

    /// Get variables for specific host
    #[arg(long, value_name = "HOSTNAME")]
    host: Option<String>,

    /// Directory to run `terraform output -json` in
    #[arg(long, env = "TERRAFORM_DIR", default_value = DEFAULT_TERRAFORM_DIR)]
    terraform_dir: PathBuf,

    /// Terraform-compatible binary to run
    #[arg(long, env = "TERRAFORM_BIN", default_value = DEFAULT_TERRAFORM_BIN)]
    terraform_bin: String,

    /// Exit non-zero instead of printing an empty inventory when terraform fails
    #[arg(long, env = "TF_INVENTORY_STRICT", value_parser = BoolishValueParser::new())]
    strict: bool,

    /// Enable debug output on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// What a single invocation prints
#[derive(Debug, PartialEq, Eq)]
enum Query {
    List,
    Host(String),
    Usage,
}

impl Cli {
    /// `--list` wins over `--host`; an empty host name counts as absent
    fn query(&self) -> Query {
        if self.list {
            Query::List
        } else {
            match self.host.as_deref() {
                Some(host) if !host.is_empty() => Query::Host(host.to_string()),
                _ => Query::Usage,
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprint!("{}", e.render());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), InventoryError> {
    let query = cli.query();
    let command = TerraformCommand::new(cli.terraform_dir).with_program(cli.terraform_bin);
    let script = InventoryScript::new(command).strict(cli.strict);

    let printed = match query {
        Query::List => print_json(&script.list().await?),
        Query::Host(host) => print_json(&script.host(&host).await?),
        Query::Usage => Cli::command().print_help(),
    };

    if let Err(e) = printed {
        error!("Failed to write to stdout: {}", e);
    }

    Ok(())
}
